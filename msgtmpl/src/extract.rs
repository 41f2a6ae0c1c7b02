//! Finding placeholders in a JSON template.
//!
//! A placeholder is a string value that is *entirely* a `{{name}}`
//! expression. Extraction records where each placeholder sits and returns a
//! copy of the tree with those leaves removed, so the rest can be decoded as
//! ordinary JSON for the target message type.
//!
//! ```
//! use msgtmpl::extract::PlaceholderExtractor;
//!
//! let extraction = PlaceholderExtractor::new()
//!     .extract_str(r#"{"greeting": "{{who}}", "count": 2, "tags": ["a", "{{tag}}"]}"#)
//!     .unwrap();
//!
//! assert_eq!(extraction.locations["who"].to_string(), "greeting");
//! assert_eq!(extraction.locations["tag"].to_string(), "tags[1]");
//! assert_eq!(extraction.pruned.to_string(), r#"{"count":2,"tags":["a"]}"#);
//! ```
//!
//! Removing an array element shifts the ones after it, but recorded
//! locations keep the index the placeholder had in the original template.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use msgtmpl_schema::json::json_type_name;
use regex::Regex;
use serde_json::{Map, Value as Json};

use crate::{ParseError, PatternError, warn};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{(.+)\}\}$").expect("placeholder pattern is a valid regex"));

/// One step of a location in a JSON tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// An object key.
    Key(String),
    /// An array index.
    Index(usize),
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.into())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// A location in a JSON tree, root first.
///
/// Renders as `foo.bar[2].baz`, or `<root>` when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The empty path, addressing the root.
    pub const fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Append a segment.
    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.segments.push(segment.into());
    }

    /// Remove the last segment.
    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> JsonPath {
        self.segments.iter().take(len).cloned().collect()
    }
}

impl<S: Into<Segment>> FromIterator<S> for JsonPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, Segment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Placeholder names mapped to their locations, in the order they were
/// first found.
pub type Locations = IndexMap<String, JsonPath>;

/// The result of extracting placeholders from a template.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Where each placeholder was found.
    pub locations: Locations,
    /// The template with every placeholder leaf removed.
    pub pruned: Json,
}

/// Finds placeholder leaves in JSON templates.
///
/// The default pattern is `^\{\{(.+)\}\}$`: the whole string must be the
/// expression, and everything between the braces (whitespace included) is
/// the name. A string that merely contains a placeholder is a literal.
#[derive(Debug, Clone)]
pub struct PlaceholderExtractor {
    pattern: Regex,
}

impl Default for PlaceholderExtractor {
    fn default() -> Self {
        Self {
            pattern: PLACEHOLDER.clone(),
        }
    }
}

impl PlaceholderExtractor {
    /// An extractor using the `{{name}}` syntax.
    pub fn new() -> Self {
        Self::default()
    }

    /// An extractor using a custom pattern. Capture group 1 is the name, and
    /// the pattern has to match an entire string value to count.
    pub fn with_pattern(pattern: Regex) -> Result<Self, PatternError> {
        if pattern.captures_len() < 2 {
            return Err(PatternError {
                pattern: pattern.as_str().into(),
            });
        }
        Ok(Self { pattern })
    }

    /// The placeholder name if `text` is exactly one placeholder expression.
    pub fn placeholder_name<'t>(&self, text: &'t str) -> Option<&'t str> {
        let captures = self.pattern.captures(text)?;
        let whole = captures.get(0)?;
        if whole.start() != 0 || whole.end() != text.len() {
            return None;
        }
        captures.get(1).map(|name| name.as_str())
    }

    /// Parse `text` and extract its placeholders.
    pub fn extract_str(&self, text: &str) -> Result<Extraction, ParseError> {
        let tree: Json = serde_json::from_str(text).map_err(ParseError::Syntax)?;
        self.extract(tree)
    }

    /// Extract the placeholders of a parsed template, whose root must be an
    /// object.
    pub fn extract(&self, tree: Json) -> Result<Extraction, ParseError> {
        let root = match tree {
            Json::Object(root) => root,
            other => {
                return Err(ParseError::NotAnObject {
                    found: json_type_name(&other),
                });
            }
        };

        let mut pruner = Pruner {
            extractor: self,
            locations: Locations::new(),
            path: JsonPath::new(),
        };
        let pruned = Json::Object(pruner.object(root));
        Ok(Extraction {
            locations: pruner.locations,
            pruned,
        })
    }
}

/// Extract placeholders with the default `{{name}}` syntax.
pub fn extract(tree: Json) -> Result<Extraction, ParseError> {
    PlaceholderExtractor::default().extract(tree)
}

struct Pruner<'a> {
    extractor: &'a PlaceholderExtractor,
    locations: Locations,
    path: JsonPath,
}

impl Pruner<'_> {
    /// `None` means the value was a placeholder and is dropped.
    fn value(&mut self, value: Json) -> Option<Json> {
        match value {
            Json::Object(map) => Some(Json::Object(self.object(map))),
            Json::Array(items) => Some(Json::Array(self.array(items))),
            Json::String(text) => {
                let name = self.extractor.placeholder_name(&text).map(String::from);
                match name {
                    Some(name) => {
                        self.record(name);
                        None
                    }
                    None => Some(Json::String(text)),
                }
            }
            other => Some(other),
        }
    }

    fn object(&mut self, map: Map<String, Json>) -> Map<String, Json> {
        let mut pruned = Map::with_capacity(map.len());
        for (key, value) in map {
            self.path.push(key.as_str());
            if let Some(value) = self.value(value) {
                pruned.insert(key, value);
            }
            self.path.pop();
        }
        pruned
    }

    fn array(&mut self, items: Vec<Json>) -> Vec<Json> {
        let mut pruned = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            self.path.push(index);
            pruned.extend(self.value(item));
            self.path.pop();
        }
        pruned
    }

    fn record(&mut self, name: String) {
        let location = self.path.clone();
        if let Some(previous) = self.locations.insert(name.clone(), location) {
            warn!(
                placeholder = %name,
                replaced = %previous,
                "placeholder appears more than once; keeping the last location"
            );
        }
    }
}

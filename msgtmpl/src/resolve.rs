//! Checking placeholder locations against a message type.
//!
//! Each location found by the extractor is walked through the schema, one
//! segment at a time, and turned into a [`ResolvedPath`]. Object keys are
//! matched against field JSON names exactly; indices are only allowed right
//! after a repeated field. The walk must end on a scalar or enum value.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use indexmap::IndexMap;
use msgtmpl_schema::{FieldDescriptor, Kind, MessageDescriptor};

use crate::extract::{JsonPath, Locations, Segment};
use crate::{CompileError, PathStep, ResolvedPath, TraversalReason, trace};

/// A compiled placeholder: where to write, and what kind of value goes there.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Path from the root message to the value.
    pub path: ResolvedPath,
    /// Kind of the field named by the last field step. For an element of a
    /// repeated field this is the element kind.
    pub leaf_kind: Kind,
}

/// Resolve every location against `root`, keeping the order of `locations`.
pub fn resolve(
    locations: &Locations,
    root: &MessageDescriptor,
) -> Result<IndexMap<String, Substitution>, CompileError> {
    locations
        .iter()
        .map(|(name, location)| {
            let substitution = resolve_location(name, location, root)?;
            trace!(placeholder = %name, path = %substitution.path, kind = %substitution.leaf_kind, "resolved placeholder");
            Ok((name.clone(), substitution))
        })
        .collect()
}

/// Where the walk stands after the segments consumed so far.
enum Cursor {
    /// At a message; keys select its fields.
    Message(MessageDescriptor),
    /// At a repeated field; an index must come next.
    List(FieldDescriptor),
    /// At a scalar or enum value; the walk must end here.
    Value(FieldDescriptor),
}

impl Cursor {
    fn after_field(field: &FieldDescriptor) -> Cursor {
        if field.is_list() {
            return Cursor::List(field.clone());
        }
        match field.kind() {
            Kind::Message(message) => Cursor::Message(message),
            _ => Cursor::Value(field.clone()),
        }
    }

    fn after_index(field: &FieldDescriptor) -> Cursor {
        match field.kind() {
            Kind::Message(message) => Cursor::Message(message),
            _ => Cursor::Value(field.clone()),
        }
    }
}

fn resolve_location(
    placeholder: &str,
    location: &JsonPath,
    root: &MessageDescriptor,
) -> Result<Substitution, CompileError> {
    let traversal = |depth: usize, reason| CompileError::PathTraversal {
        placeholder: placeholder.to_owned(),
        segment: location
            .segments()
            .get(depth)
            .map(ToString::to_string)
            .unwrap_or_default(),
        path: location.prefix(depth).to_string(),
        reason,
    };

    let mut steps = Vec::with_capacity(location.len());
    let mut cursor = Cursor::Message(root.clone());

    for (depth, segment) in location.segments().iter().enumerate() {
        cursor = match (cursor, segment) {
            (Cursor::Message(message), Segment::Key(key)) => {
                let Some(field) = message.field_by_json_name(key) else {
                    return Err(CompileError::UnknownField {
                        placeholder: placeholder.to_owned(),
                        segment: key.clone(),
                        path: location.prefix(depth).to_string(),
                        message: message.full_name().to_owned(),
                        suggestion: suggest(key, &message),
                    });
                };
                let next = Cursor::after_field(&field);
                steps.push(PathStep::Field(field));
                next
            }
            (Cursor::List(field), Segment::Index(index)) => {
                steps.push(PathStep::Index(*index));
                Cursor::after_index(&field)
            }
            (Cursor::List(_), Segment::Key(_)) => {
                return Err(traversal(depth, TraversalReason::MissingIndex));
            }
            (Cursor::Value(_), Segment::Key(_)) => {
                return Err(traversal(depth, TraversalReason::ScalarDescent));
            }
            (Cursor::Message(_) | Cursor::Value(_), Segment::Index(_)) => {
                return Err(traversal(depth, TraversalReason::IndexIntoSingular));
            }
        };
    }

    let last = location.len().saturating_sub(1);
    match cursor {
        Cursor::Value(field) => Ok(Substitution {
            path: ResolvedPath::new(steps),
            leaf_kind: field.kind(),
        }),
        Cursor::Message(_) => Err(traversal(last, TraversalReason::NonScalarLeaf)),
        Cursor::List(_) => Err(traversal(last, TraversalReason::RepeatedLeaf)),
    }
}

#[cfg(feature = "suggestions")]
fn suggest(unknown: &str, message: &MessageDescriptor) -> Option<String> {
    const SIMILARITY_THRESHOLD: f64 = 0.6;

    let mut best: Option<(String, f64)> = None;
    for field in message.fields() {
        let similarity = strsim::jaro_winkler(unknown, field.json_name());
        if similarity >= SIMILARITY_THRESHOLD
            && best.as_ref().is_none_or(|(_, best_sim)| similarity > *best_sim)
        {
            best = Some((field.json_name().to_owned(), similarity));
        }
    }
    best.map(|(name, _)| name)
}

#[cfg(not(feature = "suggestions"))]
fn suggest(_unknown: &str, _message: &MessageDescriptor) -> Option<String> {
    None
}

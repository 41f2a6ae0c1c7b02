//! Error types for schema construction, JSON decoding, and field access.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Errors raised while building a [`SchemaRegistry`](crate::SchemaRegistry).
#[derive(Debug)]
#[non_exhaustive]
pub enum SchemaError {
    /// The schema document is not valid JSON or does not have the expected shape.
    Document(serde_json::Error),

    /// Two types share a fully qualified name.
    DuplicateType {
        /// The repeated name.
        name: String,
    },

    /// An enum declares no values.
    EmptyEnum {
        /// The enum's name.
        name: String,
    },

    /// An enum declares the same value name twice.
    DuplicateEnumValue {
        /// The enum's name.
        enumeration: String,
        /// The repeated value name.
        value: String,
    },

    /// A field uses number 0, which is reserved.
    InvalidFieldNumber {
        /// The message declaring the field.
        message: String,
        /// The field's name.
        field: String,
    },

    /// Two fields of one message collide on name, number, or JSON name.
    DuplicateField {
        /// The message declaring the fields.
        message: String,
        /// The name of the second field.
        field: String,
        /// Which attribute collides.
        what: &'static str,
    },

    /// A field's type is neither a scalar keyword nor a declared type.
    UnresolvedType {
        /// The message declaring the field.
        message: String,
        /// The field's name.
        field: String,
        /// The type name that could not be found.
        type_name: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Document(err) => write!(f, "invalid schema document: {err}"),
            SchemaError::DuplicateType { name } => write!(f, "type `{name}` is declared twice"),
            SchemaError::EmptyEnum { name } => write!(f, "enum `{name}` declares no values"),
            SchemaError::DuplicateEnumValue { enumeration, value } => {
                write!(f, "enum `{enumeration}` declares value `{value}` twice")
            }
            SchemaError::InvalidFieldNumber { message, field } => {
                write!(f, "field `{message}.{field}` uses reserved number 0")
            }
            SchemaError::DuplicateField {
                message,
                field,
                what,
            } => write!(f, "field `{message}.{field}` reuses an existing {what}"),
            SchemaError::UnresolvedType {
                message,
                field,
                type_name,
            } => write!(
                f,
                "field `{message}.{field}` has unknown type `{type_name}`"
            ),
        }
    }
}

impl core::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            SchemaError::Document(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors raised when reading or writing fields of a
/// [`DynamicMessage`](crate::DynamicMessage).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    /// The field belongs to a different message type.
    ForeignField {
        /// The field, as `Type.field`.
        field: String,
        /// The message type it was used on.
        message: String,
    },

    /// The value's shape does not match the field's kind.
    KindMismatch {
        /// The field, as `Type.field`.
        field: String,
        /// The field's kind.
        expected: String,
        /// The shape of the rejected value.
        received: &'static str,
    },

    /// No field has the given name.
    UnknownField {
        /// The message type.
        message: String,
        /// The name that was looked up.
        name: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::ForeignField { field, message } => {
                write!(f, "field `{field}` does not belong to {message}")
            }
            FieldError::KindMismatch {
                field,
                expected,
                received,
            } => write!(f, "field `{field}` expects {expected}, got {received}"),
            FieldError::UnknownField { message, name } => {
                write!(f, "{message} has no field named `{name}`")
            }
        }
    }
}

impl core::error::Error for FieldError {}

/// A segment in a decoding path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// An object key.
    Field(String),
    /// An array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Error raised when JSON cannot be decoded into a message type.
#[derive(Debug)]
pub struct DecodeError {
    /// What went wrong.
    pub kind: DecodeErrorKind,
    /// Where in the JSON document it went wrong, outermost first.
    pub path: Vec<PathSegment>,
    /// The message type being decoded at that point.
    pub message: String,
}

impl DecodeError {
    /// Create an error at the current position, with an empty path.
    pub fn new(kind: DecodeErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Prepend a path segment (errors are built innermost first).
    pub fn with_path(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// Render the path as `foo.bar[2]`, or `<root>` when empty.
    pub fn path_string(&self) -> String {
        use core::fmt::Write;

        if self.path.is_empty() {
            return "<root>".into();
        }
        let mut s = String::new();
        for (i, segment) in self.path.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => s.push_str(name),
                segment => {
                    let _ = write!(s, "{segment}");
                }
            }
        }
        s
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} (in {})", self.kind, self.message)
        } else {
            write!(
                f,
                "at {}: {} (in {})",
                self.path_string(),
                self.kind,
                self.message
            )
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            DecodeErrorKind::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

/// Specific decoding failures.
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// The input text is not JSON.
    Syntax(serde_json::Error),
    /// The JSON value has the wrong type.
    TypeMismatch {
        /// What the schema expects.
        expected: &'static str,
        /// What the JSON contains.
        got: &'static str,
    },
    /// An object key names no field of the message.
    UnknownField {
        /// The unknown key.
        field: String,
        /// JSON names of the message's fields.
        expected: Vec<String>,
    },
    /// Two keys (JSON name and declared name) populate the same field.
    DuplicateField {
        /// The second key.
        field: String,
    },
    /// An enum literal names no value of the enum.
    UnknownEnumValue {
        /// The enum type.
        enumeration: String,
        /// The rejected literal.
        value: String,
    },
    /// A number does not fit the field's type.
    NumberOutOfRange {
        /// The rejected literal.
        value: String,
        /// The field's scalar type.
        target: &'static str,
    },
    /// A literal has the right JSON type but is not a valid value.
    InvalidValue {
        /// Why it was rejected.
        message: String,
    },
    /// A repeated field contains `null`.
    NullElement,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Syntax(err) => write!(f, "invalid JSON: {err}"),
            DecodeErrorKind::TypeMismatch { expected, got } => {
                write!(f, "expected {expected}, got {got}")
            }
            DecodeErrorKind::UnknownField { field, expected } => {
                write!(f, "unknown field `{field}`")?;
                if !expected.is_empty() {
                    write!(f, ", expected one of: {}", expected.join(", "))?;
                }
                Ok(())
            }
            DecodeErrorKind::DuplicateField { field } => {
                write!(f, "field `{field}` is set more than once")
            }
            DecodeErrorKind::UnknownEnumValue { enumeration, value } => {
                write!(f, "`{value}` is not a value of enum {enumeration}")
            }
            DecodeErrorKind::NumberOutOfRange { value, target } => {
                write!(f, "number {value} out of range for {target}")
            }
            DecodeErrorKind::InvalidValue { message } => write!(f, "invalid value: {message}"),
            DecodeErrorKind::NullElement => write!(f, "repeated field elements cannot be null"),
        }
    }
}

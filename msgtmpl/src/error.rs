use alloc::string::String;
use core::fmt;

use msgtmpl_schema::DecodeError;

/// The template text could not be read as a JSON object.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The text is not JSON.
    Syntax(serde_json::Error),
    /// The text is JSON, but its root is not an object.
    NotAnObject {
        /// The JSON type found at the root.
        found: &'static str,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Syntax(err) => write!(f, "template is not valid JSON: {err}"),
            ParseError::NotAnObject { found } => {
                write!(f, "template root must be a JSON object, found {found}")
            }
        }
    }
}

impl core::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ParseError::Syntax(err) => Some(err),
            ParseError::NotAnObject { .. } => None,
        }
    }
}

/// A custom placeholder pattern has no capture group for the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    /// The rejected pattern.
    pub pattern: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placeholder pattern `{}` has no capture group for the name",
            self.pattern
        )
    }
}

impl core::error::Error for PatternError {}

/// Why a placeholder location cannot be followed through the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TraversalReason {
    /// A key follows a field that is neither a message nor a list of messages.
    ScalarDescent,
    /// An index follows something other than a repeated field.
    IndexIntoSingular,
    /// A key follows a repeated field without selecting an element first.
    MissingIndex,
    /// The location ends on a message rather than a scalar or enum value.
    NonScalarLeaf,
    /// The location ends on a repeated field as a whole.
    RepeatedLeaf,
}

impl fmt::Display for TraversalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TraversalReason::ScalarDescent => "cannot descend into a field that is not a message",
            TraversalReason::IndexIntoSingular => "only repeated fields can be indexed",
            TraversalReason::MissingIndex => "a repeated field must be indexed before descending",
            TraversalReason::NonScalarLeaf => {
                "a placeholder must stand for a scalar or enum value, not a message"
            }
            TraversalReason::RepeatedLeaf => {
                "a placeholder must stand for one element of a repeated field, not the whole list"
            }
        })
    }
}

/// Errors raised while compiling a template.
#[derive(Debug)]
#[non_exhaustive]
pub enum CompileError {
    /// The template text is not a JSON object.
    Parse(ParseError),

    /// A placeholder location names a key that is not a field of the
    /// enclosing message.
    UnknownField {
        /// The placeholder whose location failed to resolve.
        placeholder: String,
        /// The key that matched no field.
        segment: String,
        /// The part of the location before `segment`.
        path: String,
        /// The message type that was searched.
        message: String,
        /// The closest field JSON name, if one is similar enough.
        suggestion: Option<String>,
    },

    /// A placeholder location names real fields but cannot be followed.
    PathTraversal {
        /// The placeholder whose location failed to resolve.
        placeholder: String,
        /// The offending segment.
        segment: String,
        /// The part of the location before `segment`.
        path: String,
        /// What is wrong with it.
        reason: TraversalReason,
    },

    /// The literal parts of the template do not decode as the target type.
    SchemaMismatch(DecodeError),

    /// No message type with this name is registered.
    UnknownType {
        /// The requested type name.
        name: String,
    },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(err) => write!(f, "{err}"),
            CompileError::UnknownField {
                placeholder,
                segment,
                path,
                message,
                suggestion,
            } => {
                write!(
                    f,
                    "unknown field `{segment}` in {message} at {path} (placeholder `{placeholder}`)"
                )?;
                if let Some(suggestion) = suggestion {
                    write!(f, "; did you mean `{suggestion}`?")?;
                }
                Ok(())
            }
            CompileError::PathTraversal {
                placeholder,
                segment,
                path,
                reason,
            } => write!(
                f,
                "cannot follow `{segment}` at {path} (placeholder `{placeholder}`): {reason}"
            ),
            CompileError::SchemaMismatch(err) => {
                write!(f, "template does not match the message type: {err}")
            }
            CompileError::UnknownType { name } => write!(f, "unknown message type `{name}`"),
        }
    }
}

impl core::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            CompileError::Parse(err) => Some(err),
            CompileError::SchemaMismatch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<DecodeError> for CompileError {
    fn from(err: DecodeError) -> Self {
        CompileError::SchemaMismatch(err)
    }
}

/// Errors raised while evaluating a compiled template.
///
/// An error aborts only the evaluation that raised it; the template stays
/// usable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvalError {
    /// A path indexes past the end of a list in the skeleton.
    IndexOutOfRange {
        /// The placeholder being written.
        placeholder: String,
        /// The list being indexed.
        path: String,
        /// The requested index.
        index: usize,
        /// The list's length.
        len: usize,
    },

    /// An argument cannot be converted to the placeholder's field kind.
    TypeMismatch {
        /// The placeholder being written.
        placeholder: String,
        /// The field's kind.
        expected: String,
        /// The shape of the supplied value.
        received: &'static str,
    },

    /// The skeleton lacks a container the compiled path walks through.
    PathMismatch {
        /// The placeholder being written.
        placeholder: String,
        /// The compiled path.
        path: String,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::IndexOutOfRange {
                placeholder,
                path,
                index,
                len,
            } => write!(
                f,
                "placeholder `{placeholder}`: index {index} is out of range for `{path}` (length {len})"
            ),
            EvalError::TypeMismatch {
                placeholder,
                expected,
                received,
            } => write!(
                f,
                "placeholder `{placeholder}`: expected {expected}, got {received}"
            ),
            EvalError::PathMismatch { placeholder, path } => write!(
                f,
                "placeholder `{placeholder}`: the skeleton has no value at `{path}`"
            ),
        }
    }
}

impl core::error::Error for EvalError {}

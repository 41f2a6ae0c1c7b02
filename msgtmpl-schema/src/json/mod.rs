//! Canonical JSON mapping for [`DynamicMessage`](crate::DynamicMessage).
//!
//! Decoding accepts both JSON names and declared names as object keys,
//! treats `null` as "unset", accepts 64-bit integers as numbers or strings,
//! floats as numbers or `"NaN"` / `"Infinity"` / `"-Infinity"`, bytes as
//! standard or URL-safe base64, and enums by name or number.
//!
//! Encoding writes populated fields under their JSON names, 64-bit
//! integers as strings, and enums by name when the number is known.

mod decode;
pub use decode::{from_str, from_value};

mod encode;
pub use encode::{to_string, to_value};

/// The JSON type of `value`, as used in error messages.
pub fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

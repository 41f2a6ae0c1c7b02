use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as Json;

use crate::{DynamicMessage, Kind, Value};

/// Encode `message` as a JSON object.
///
/// Singular scalar and enum fields holding their default are omitted, as
/// are empty lists. Populated message fields are always written, even when
/// every field inside them is unset.
pub fn to_value(message: &DynamicMessage) -> Json {
    let mut object = serde_json::Map::new();
    for (field, value) in message.fields() {
        let kind = field.kind();
        let omit = match value {
            Value::List(items) => items.is_empty(),
            Value::Message(_) => false,
            value => *value == field.default_value(),
        };
        if omit {
            continue;
        }
        object.insert(field.json_name().to_owned(), encode_value(value, &kind));
    }
    Json::Object(object)
}

/// Encode `message` as compact JSON text.
pub fn to_string(message: &DynamicMessage) -> String {
    to_value(message).to_string()
}

fn encode_value(value: &Value, kind: &Kind) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::I32(n) => Json::from(*n),
        Value::U32(n) => Json::from(*n),
        Value::I64(n) => Json::String(n.to_string()),
        Value::U64(n) => Json::String(n.to_string()),
        // shortest decimal form of the f32, not of its widened f64
        Value::F32(n) => encode_float(n.to_string().parse().unwrap_or(f64::from(*n))),
        Value::F64(n) => encode_float(*n),
        Value::String(s) => Json::String(s.clone()),
        Value::Bytes(bytes) => Json::String(STANDARD.encode(bytes)),
        Value::EnumNumber(number) => match kind.as_enum().and_then(|e| e.value_by_number(*number)) {
            Some(name) => Json::String(name.to_owned()),
            None => Json::from(*number),
        },
        Value::Message(message) => to_value(message),
        Value::List(items) => Json::Array(items.iter().map(|item| encode_value(item, kind)).collect()),
    }
}

fn encode_float(n: f64) -> Json {
    if n.is_nan() {
        Json::String("NaN".into())
    } else if n.is_infinite() {
        Json::String(if n > 0.0 { "Infinity" } else { "-Infinity" }.into())
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

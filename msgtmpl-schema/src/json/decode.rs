use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde_json::Value as Json;

use super::json_type_name;
use crate::{
    DecodeError, DecodeErrorKind, DynamicMessage, EnumDescriptor, FieldDescriptor, Kind,
    MessageDescriptor, PathSegment, ScalarKind, Value, trace,
};

const PADDING_INDIFFERENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_INDIFFERENT);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_INDIFFERENT);

/// Parse `text` and decode it as an instance of `descriptor`.
pub fn from_str(text: &str, descriptor: &MessageDescriptor) -> Result<DynamicMessage, DecodeError> {
    let json: Json = serde_json::from_str(text)
        .map_err(|err| DecodeError::new(DecodeErrorKind::Syntax(err), descriptor.full_name()))?;
    from_value(&json, descriptor)
}

/// Decode an already parsed JSON tree as an instance of `descriptor`.
pub fn from_value(json: &Json, descriptor: &MessageDescriptor) -> Result<DynamicMessage, DecodeError> {
    trace!(message = descriptor.full_name(), "decoding message from JSON");
    decode_message(json, descriptor)
}

fn decode_message(json: &Json, descriptor: &MessageDescriptor) -> Result<DynamicMessage, DecodeError> {
    let error = |kind| DecodeError::new(kind, descriptor.full_name());

    let Json::Object(object) = json else {
        return Err(error(DecodeErrorKind::TypeMismatch {
            expected: "object",
            got: json_type_name(json),
        }));
    };

    let mut message = DynamicMessage::new(descriptor.clone());
    let mut seen = Vec::with_capacity(object.len());
    for (key, item) in object {
        let Some(field) = descriptor
            .field_by_json_name(key)
            .or_else(|| descriptor.field_by_name(key))
        else {
            return Err(error(DecodeErrorKind::UnknownField {
                field: key.clone(),
                expected: descriptor
                    .fields()
                    .map(|field| field.json_name().to_owned())
                    .collect(),
            }));
        };

        if seen.contains(&field.index()) {
            return Err(error(DecodeErrorKind::DuplicateField { field: key.clone() }));
        }
        seen.push(field.index());

        if item.is_null() {
            continue;
        }
        let value = decode_field(item, &field)
            .map_err(|err| err.with_path(PathSegment::Field(key.clone())))?;
        message.insert_unchecked(&field, value);
    }

    Ok(message)
}

fn decode_field(item: &Json, field: &FieldDescriptor) -> Result<Value, DecodeError> {
    let kind = field.kind();
    if !field.is_list() {
        return decode_single(item, &kind, field);
    }

    let Json::Array(items) = item else {
        return Err(DecodeError::new(
            DecodeErrorKind::TypeMismatch {
                expected: "array",
                got: json_type_name(item),
            },
            field.containing_message().full_name(),
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let decoded = if element.is_null() {
                Err(DecodeError::new(
                    DecodeErrorKind::NullElement,
                    field.containing_message().full_name(),
                ))
            } else {
                decode_single(element, &kind, field)
            };
            decoded.map_err(|err| err.with_path(PathSegment::Index(index)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::List)
}

fn decode_single(item: &Json, kind: &Kind, field: &FieldDescriptor) -> Result<Value, DecodeError> {
    let error = |kind| DecodeError::new(kind, field.containing_message().full_name());
    match kind {
        Kind::Message(message) => decode_message(item, message).map(Value::Message),
        Kind::Enum(enumeration) => decode_enum(item, enumeration).map_err(error),
        Kind::Scalar(scalar) => decode_scalar(item, *scalar).map_err(error),
    }
}

fn decode_enum(item: &Json, enumeration: &EnumDescriptor) -> Result<Value, DecodeErrorKind> {
    match item {
        Json::String(name) => enumeration
            .value_by_name(name)
            .map(Value::EnumNumber)
            .ok_or_else(|| DecodeErrorKind::UnknownEnumValue {
                enumeration: enumeration.full_name().to_owned(),
                value: name.clone(),
            }),
        Json::Number(_) => Ok(Value::EnumNumber(fit(integer(item)?, "enum")?)),
        other => Err(DecodeErrorKind::TypeMismatch {
            expected: "enum name or number",
            got: json_type_name(other),
        }),
    }
}

fn decode_scalar(item: &Json, scalar: ScalarKind) -> Result<Value, DecodeErrorKind> {
    let mismatch = |expected| DecodeErrorKind::TypeMismatch {
        expected,
        got: json_type_name(item),
    };

    Ok(match scalar {
        ScalarKind::Bool => Value::Bool(item.as_bool().ok_or_else(|| mismatch("boolean"))?),
        ScalarKind::Int32 => Value::I32(fit(integer(item)?, "int32")?),
        ScalarKind::Int64 => Value::I64(fit(integer(item)?, "int64")?),
        ScalarKind::Uint32 => Value::U32(fit(integer(item)?, "uint32")?),
        ScalarKind::Uint64 => Value::U64(fit(integer(item)?, "uint64")?),
        ScalarKind::Float => {
            let value = float(item)?;
            if value.is_finite() && value.abs() > f64::from(f32::MAX) {
                return Err(DecodeErrorKind::NumberOutOfRange {
                    value: value.to_string(),
                    target: "float",
                });
            }
            Value::F32(value as f32)
        }
        ScalarKind::Double => Value::F64(float(item)?),
        ScalarKind::String => {
            Value::String(item.as_str().ok_or_else(|| mismatch("string"))?.to_owned())
        }
        ScalarKind::Bytes => {
            Value::Bytes(decode_bytes(item.as_str().ok_or_else(|| mismatch("base64 string"))?)?)
        }
    })
}

fn integral(value: f64) -> Option<i128> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e38).then_some(value as i128)
}

/// Read an integer from a JSON number or a decimal string. Floats with no
/// fractional part (`1.0`, `1e3`) are accepted.
fn integer(item: &Json) -> Result<i128, DecodeErrorKind> {
    let invalid = || DecodeErrorKind::InvalidValue {
        message: format!("{item} is not an integer"),
    };
    match item {
        Json::Number(number) => {
            if let Some(value) = number.as_i64() {
                Ok(value.into())
            } else if let Some(value) = number.as_u64() {
                Ok(value.into())
            } else {
                number.as_f64().and_then(integral).ok_or_else(invalid)
            }
        }
        Json::String(text) => match text.parse::<i128>() {
            Ok(value) => Ok(value),
            Err(_) => text
                .parse::<f64>()
                .ok()
                .and_then(integral)
                .ok_or_else(invalid),
        },
        other => Err(DecodeErrorKind::TypeMismatch {
            expected: "integer",
            got: json_type_name(other),
        }),
    }
}

fn fit<T: TryFrom<i128>>(value: i128, target: &'static str) -> Result<T, DecodeErrorKind> {
    T::try_from(value).map_err(|_| DecodeErrorKind::NumberOutOfRange {
        value: value.to_string(),
        target,
    })
}

fn float(item: &Json) -> Result<f64, DecodeErrorKind> {
    match item {
        Json::Number(number) => number.as_f64().ok_or_else(|| DecodeErrorKind::InvalidValue {
            message: format!("{number} is not representable as a double"),
        }),
        Json::String(text) => match text.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| DecodeErrorKind::InvalidValue {
                    message: format!("`{other}` is not a number"),
                }),
        },
        other => Err(DecodeErrorKind::TypeMismatch {
            expected: "number",
            got: json_type_name(other),
        }),
    }
}

fn decode_bytes(text: &str) -> Result<Vec<u8>, DecodeErrorKind> {
    let engine = if text.contains(|c| c == '-' || c == '_') {
        &URL_SAFE
    } else {
        &STANDARD
    };
    engine
        .decode(text)
        .map_err(|err| DecodeErrorKind::InvalidValue {
            message: format!("invalid base64: {err}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnumDef, FieldDef, MessageDef, SchemaBuilder, SchemaRegistry};

    fn registry() -> SchemaRegistry {
        SchemaBuilder::new()
            .message(
                MessageDef::new("test.Scalars")
                    .field(FieldDef::new("flag", 1, "bool"))
                    .field(FieldDef::new("small", 2, "int32"))
                    .field(FieldDef::new("big", 3, "int64"))
                    .field(FieldDef::new("unsigned", 4, "uint32"))
                    .field(FieldDef::new("ratio", 5, "float"))
                    .field(FieldDef::new("precise", 6, "double"))
                    .field(FieldDef::new("text", 7, "string"))
                    .field(FieldDef::new("blob", 8, "bytes"))
                    .field(FieldDef::new("state", 9, "test.State"))
                    .field(FieldDef::new("child", 10, "test.Child"))
                    .field(FieldDef::new("children", 11, "test.Child").repeated())
                    .field(FieldDef::new("snake_case", 12, "string")),
            )
            .message(MessageDef::new("test.Child").field(FieldDef::new("name", 1, "string")))
            .enumeration(
                EnumDef::new("test.State")
                    .value("STATE_UNKNOWN", 0)
                    .value("STATE_READY", 1),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn decodes_canonical_forms() {
        let registry = registry();
        let scalars = registry.message("test.Scalars").unwrap();
        let message = from_str(
            r#"{
                "flag": true,
                "small": "-12",
                "big": "9007199254740993",
                "unsigned": 1.0,
                "ratio": 0.5,
                "precise": "-Infinity",
                "text": "hello",
                "blob": "aGk",
                "state": "STATE_READY",
                "child": { "name": "a" },
                "children": [{ "name": "b" }, {}],
                "snakeCase": "camel"
            }"#,
            &scalars,
        )
        .unwrap();

        let get = |name: &str| message.get_by_name(name).unwrap().into_owned();
        assert_eq!(get("flag"), Value::Bool(true));
        assert_eq!(get("small"), Value::I32(-12));
        assert_eq!(get("big"), Value::I64(9_007_199_254_740_993));
        assert_eq!(get("unsigned"), Value::U32(1));
        assert_eq!(get("ratio"), Value::F32(0.5));
        assert_eq!(get("precise"), Value::F64(f64::NEG_INFINITY));
        assert_eq!(get("text"), Value::from("hello"));
        assert_eq!(get("blob"), Value::Bytes(b"hi".to_vec()));
        assert_eq!(get("state"), Value::EnumNumber(1));
        assert_eq!(get("snake_case"), Value::from("camel"));

        let children = get("children");
        let children = children.as_list().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0].as_message().unwrap().get_by_name("name").unwrap().as_str(),
            Some("b")
        );
    }

    #[test]
    fn null_means_unset() {
        let registry = registry();
        let scalars = registry.message("test.Scalars").unwrap();
        let message = from_str(r#"{"text": null, "child": null}"#, &scalars).unwrap();
        assert_eq!(message, DynamicMessage::new(scalars));
    }

    #[test]
    fn reports_path_of_nested_failure() {
        let registry = registry();
        let scalars = registry.message("test.Scalars").unwrap();
        let err = from_str(r#"{"children": [{}, {"nmae": "x"}]}"#, &scalars).unwrap_err();
        assert_eq!(err.path_string(), "children[1]");
        assert_eq!(err.message, "test.Child");
        assert_eq!(
            err.to_string(),
            "at children[1]: unknown field `nmae`, expected one of: name (in test.Child)"
        );
    }

    #[test]
    fn rejects_shape_mismatches() {
        let registry = registry();
        let scalars = registry.message("test.Scalars").unwrap();

        let err = from_str(r#"{"child": "oops"}"#, &scalars).unwrap_err();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::TypeMismatch {
                expected: "object",
                got: "string"
            }
        ));

        let err = from_str(r#"{"small": 3000000000}"#, &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::NumberOutOfRange { target: "int32", .. }));

        let err = from_str(r#"{"small": 1.5}"#, &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::InvalidValue { .. }));

        let err = from_str(r#"{"state": "STATE_GONE"}"#, &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::UnknownEnumValue { .. }));

        let err = from_str(r#"{"children": [null]}"#, &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::NullElement));

        let err = from_str(r#"{"snakeCase": "a", "snake_case": "b"}"#, &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::DuplicateField { .. }));

        let err = from_str("{", &scalars).unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::Syntax(_)));
    }
}

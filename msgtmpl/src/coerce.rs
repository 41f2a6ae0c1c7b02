use msgtmpl_schema::{Kind, ScalarKind, Value};

/// Convert an argument to `kind`, allowing lossless numeric widening and
/// enum values given by name or number. `None` if no conversion applies.
pub(crate) fn coerce(value: &Value, kind: &Kind) -> Option<Value> {
    match kind {
        Kind::Scalar(scalar) => coerce_scalar(value, *scalar),
        Kind::Enum(enumeration) => match value {
            Value::EnumNumber(number) | Value::I32(number) => Some(Value::EnumNumber(*number)),
            Value::String(name) => enumeration.value_by_name(name).map(Value::EnumNumber),
            _ => None,
        },
        Kind::Message(message) => match value {
            Value::Message(nested) if nested.descriptor() == message => Some(value.clone()),
            _ => None,
        },
    }
}

fn coerce_scalar(value: &Value, scalar: ScalarKind) -> Option<Value> {
    Some(match (scalar, value) {
        (ScalarKind::Bool, Value::Bool(b)) => Value::Bool(*b),
        (ScalarKind::Int32, Value::I32(n)) => Value::I32(*n),
        (ScalarKind::Int64, Value::I32(n)) => Value::I64(i64::from(*n)),
        (ScalarKind::Int64, Value::I64(n)) => Value::I64(*n),
        (ScalarKind::Int64, Value::U32(n)) => Value::I64(i64::from(*n)),
        (ScalarKind::Uint32, Value::U32(n)) => Value::U32(*n),
        (ScalarKind::Uint64, Value::U32(n)) => Value::U64(u64::from(*n)),
        (ScalarKind::Uint64, Value::U64(n)) => Value::U64(*n),
        (ScalarKind::Float, Value::F32(n)) => Value::F32(*n),
        (ScalarKind::Double, Value::F32(n)) => Value::F64(f64::from(*n)),
        (ScalarKind::Double, Value::F64(n)) => Value::F64(*n),
        (ScalarKind::Double, Value::I32(n)) => Value::F64(f64::from(*n)),
        (ScalarKind::Double, Value::U32(n)) => Value::F64(f64::from(*n)),
        (ScalarKind::String, Value::String(s)) => Value::String(s.clone()),
        (ScalarKind::Bytes, Value::Bytes(bytes)) => Value::Bytes(bytes.clone()),
        _ => return None,
    })
}

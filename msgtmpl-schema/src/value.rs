use crate::{DynamicMessage, FieldDescriptor, Kind, ScalarKind};

/// A dynamically typed field value.
///
/// Enum values are stored by number. Repeated fields hold a [`Value::List`]
/// whose elements all share the field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `int32`
    I32(i32),
    /// `int64`
    I64(i64),
    /// `uint32`
    U32(u32),
    /// `uint64`
    U64(u64),
    /// `float`
    F32(f32),
    /// `double`
    F64(f64),
    /// `string`
    String(String),
    /// `bytes`
    Bytes(Vec<u8>),
    /// An enum value, by number.
    EnumNumber(i32),
    /// A nested message.
    Message(DynamicMessage),
    /// The elements of a repeated field.
    List(Vec<Value>),
}

impl Value {
    /// The default value of a single (non-list) value of `kind`.
    pub fn default_for(kind: &Kind) -> Value {
        match kind {
            Kind::Scalar(scalar) => match scalar {
                ScalarKind::Bool => Value::Bool(false),
                ScalarKind::Int32 => Value::I32(0),
                ScalarKind::Int64 => Value::I64(0),
                ScalarKind::Uint32 => Value::U32(0),
                ScalarKind::Uint64 => Value::U64(0),
                ScalarKind::Float => Value::F32(0.0),
                ScalarKind::Double => Value::F64(0.0),
                ScalarKind::String => Value::String(String::new()),
                ScalarKind::Bytes => Value::Bytes(Vec::new()),
            },
            Kind::Enum(enumeration) => Value::EnumNumber(enumeration.default_number()),
            Kind::Message(message) => Value::Message(DynamicMessage::new(message.clone())),
        }
    }

    /// Short name of this value's shape, for diagnostics.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::I32(_) => "int32",
            Value::I64(_) => "int64",
            Value::U32(_) => "uint32",
            Value::U64(_) => "uint64",
            Value::F32(_) => "float",
            Value::F64(_) => "double",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::EnumNumber(_) => "enum number",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    /// Whether this value can be stored as a single value of `kind`, without
    /// any conversion.
    pub fn is_valid_for(&self, kind: &Kind) -> bool {
        match (self, kind) {
            (Value::Bool(_), Kind::Scalar(ScalarKind::Bool))
            | (Value::I32(_), Kind::Scalar(ScalarKind::Int32))
            | (Value::I64(_), Kind::Scalar(ScalarKind::Int64))
            | (Value::U32(_), Kind::Scalar(ScalarKind::Uint32))
            | (Value::U64(_), Kind::Scalar(ScalarKind::Uint64))
            | (Value::F32(_), Kind::Scalar(ScalarKind::Float))
            | (Value::F64(_), Kind::Scalar(ScalarKind::Double))
            | (Value::String(_), Kind::Scalar(ScalarKind::String))
            | (Value::Bytes(_), Kind::Scalar(ScalarKind::Bytes))
            | (Value::EnumNumber(_), Kind::Enum(_)) => true,
            (Value::Message(message), Kind::Message(descriptor)) => {
                message.descriptor() == descriptor
            }
            _ => false,
        }
    }

    /// Whether this value can be stored in `field` as is: a list of valid
    /// elements for repeated fields, a single valid value otherwise.
    pub fn is_valid_for_field(&self, field: &FieldDescriptor) -> bool {
        let kind = field.kind();
        match self {
            Value::List(items) if field.is_list() => {
                items.iter().all(|item| item.is_valid_for(&kind))
            }
            _ if field.is_list() => false,
            value => value.is_valid_for(&kind),
        }
    }

    /// The value as a `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(value) => Some(value),
            _ => None,
        }
    }

    /// The value as an `i32`.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::I32(value) => Some(value),
            _ => None,
        }
    }

    /// The value as an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I64(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a `u32`.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Value::U32(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(value) => Some(value),
            _ => None,
        }
    }

    /// The value as an `f32`.
    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            Value::F32(value) => Some(value),
            _ => None,
        }
    }

    /// The value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F64(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// The value as a byte slice.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(value) => Some(value),
            _ => None,
        }
    }

    /// The enum number.
    pub fn as_enum_number(&self) -> Option<i32> {
        match *self {
            Value::EnumNumber(value) => Some(value),
            _ => None,
        }
    }

    /// The nested message.
    pub fn as_message(&self) -> Option<&DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// The nested message, mutably.
    pub fn as_message_mut(&mut self) -> Option<&mut DynamicMessage> {
        match self {
            Value::Message(value) => Some(value),
            _ => None,
        }
    }

    /// The list elements.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }

    /// The list elements, mutably.
    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::List(value) => Some(value),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => I32,
    i64 => I64,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    DynamicMessage => Message,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

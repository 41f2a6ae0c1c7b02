//! Runtime descriptors for message and enum types.
//!
//! Descriptors are cheap handles into a frozen [`SchemaRegistry`]: an
//! `Arc` to the registry plus an index. Types refer to each other by index,
//! so recursive messages need no special treatment.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::{SchemaDocument, SchemaError, Value};

/// The kind of a non-message, non-enum field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// `bool`
    Bool,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
    /// `float` (32-bit)
    Float,
    /// `double` (64-bit)
    Double,
    /// UTF-8 `string`
    String,
    /// Arbitrary `bytes`
    Bytes,
}

impl ScalarKind {
    /// The keyword used for this kind in schema documents.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Float => "float",
            ScalarKind::Double => "double",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
        }
    }

    /// Parse a schema document keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "bool" => ScalarKind::Bool,
            "int32" => ScalarKind::Int32,
            "int64" => ScalarKind::Int64,
            "uint32" => ScalarKind::Uint32,
            "uint64" => ScalarKind::Uint64,
            "float" => ScalarKind::Float,
            "double" => ScalarKind::Double,
            "string" => ScalarKind::String,
            "bytes" => ScalarKind::Bytes,
            _ => return None,
        })
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field holds one value or a list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    /// Exactly one value (which may be unset and read back as the default).
    #[default]
    Singular,
    /// A list of values.
    Repeated,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TypeRef {
    Message(usize),
    Enum(usize),
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum KindRef {
    Scalar(ScalarKind),
    Enum(usize),
    Message(usize),
}

#[derive(Debug)]
pub(crate) struct FieldData {
    pub(crate) name: String,
    pub(crate) json_name: String,
    pub(crate) number: u32,
    pub(crate) cardinality: Cardinality,
    pub(crate) kind: KindRef,
}

#[derive(Debug)]
pub(crate) struct MessageData {
    pub(crate) full_name: String,
    pub(crate) fields: Vec<FieldData>,
    pub(crate) by_name: HashMap<String, usize>,
    pub(crate) by_json_name: HashMap<String, usize>,
    pub(crate) by_number: HashMap<u32, usize>,
}

#[derive(Debug)]
pub(crate) struct EnumValueData {
    pub(crate) name: String,
    pub(crate) number: i32,
}

#[derive(Debug)]
pub(crate) struct EnumData {
    pub(crate) full_name: String,
    pub(crate) values: Vec<EnumValueData>,
}

#[derive(Debug)]
pub(crate) struct Registry {
    pub(crate) messages: Vec<MessageData>,
    pub(crate) enums: Vec<EnumData>,
    pub(crate) types: IndexMap<String, TypeRef>,
}

fn simple_name(full_name: &str) -> &str {
    full_name.rsplit_once('.').map_or(full_name, |(_, name)| name)
}

/// A frozen set of message and enum types, looked up by fully qualified name.
///
/// Cloning a registry is cheap; all clones share the same descriptors.
/// Nothing can be added to a registry once it has been built.
#[derive(Clone)]
pub struct SchemaRegistry {
    inner: Arc<Registry>,
}

impl SchemaRegistry {
    pub(crate) fn from_registry(registry: Registry) -> Self {
        Self {
            inner: Arc::new(registry),
        }
    }

    /// Build a registry from a schema document.
    pub fn from_document(document: &SchemaDocument) -> Result<Self, SchemaError> {
        crate::builder::build(document)
    }

    /// Parse a JSON schema document and build a registry from it.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(text).map_err(SchemaError::Document)?;
        Self::from_document(&document)
    }

    /// Look up a message type. A leading `.` on the name is ignored.
    pub fn message(&self, full_name: &str) -> Option<MessageDescriptor> {
        match self.inner.types.get(full_name.trim_start_matches('.'))? {
            TypeRef::Message(index) => Some(MessageDescriptor {
                registry: Arc::clone(&self.inner),
                index: *index,
            }),
            TypeRef::Enum(_) => None,
        }
    }

    /// Look up an enum type. A leading `.` on the name is ignored.
    pub fn enumeration(&self, full_name: &str) -> Option<EnumDescriptor> {
        match self.inner.types.get(full_name.trim_start_matches('.'))? {
            TypeRef::Enum(index) => Some(EnumDescriptor {
                registry: Arc::clone(&self.inner),
                index: *index,
            }),
            TypeRef::Message(_) => None,
        }
    }

    /// All message types, in declaration order.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        (0..self.inner.messages.len()).map(move |index| MessageDescriptor {
            registry: Arc::clone(&self.inner),
            index,
        })
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("types", &self.inner.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Describes a message type: its name and its ordered fields.
#[derive(Clone)]
pub struct MessageDescriptor {
    registry: Arc<Registry>,
    index: usize,
}

impl MessageDescriptor {
    fn data(&self) -> &MessageData {
        &self.registry.messages[self.index]
    }

    fn field_at(&self, index: usize) -> FieldDescriptor {
        FieldDescriptor {
            message: self.clone(),
            index,
        }
    }

    /// Fully qualified name, e.g. `test.Foo`.
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Name without the package prefix, e.g. `Foo`.
    pub fn name(&self) -> &str {
        simple_name(self.full_name())
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.data().fields.len()).map(move |index| self.field_at(index))
    }

    /// Look up a field by its JSON name (exact, case-sensitive).
    pub fn field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        let index = *self.data().by_json_name.get(json_name)?;
        Some(self.field_at(index))
    }

    /// Look up a field by its declared name.
    pub fn field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        let index = *self.data().by_name.get(name)?;
        Some(self.field_at(index))
    }

    /// Look up a field by its number.
    pub fn field_by_number(&self, number: u32) -> Option<FieldDescriptor> {
        let index = *self.data().by_number.get(&number)?;
        Some(self.field_at(index))
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry) && self.index == other.index
    }
}

impl Eq for MessageDescriptor {}

impl Hash for MessageDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.registry) as usize).hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MessageDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

impl fmt::Display for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// Describes one field of a message type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: usize,
}

impl FieldDescriptor {
    fn data(&self) -> &FieldData {
        &self.message.data().fields[self.index]
    }

    /// Declared name, e.g. `foo_bar`.
    pub fn name(&self) -> &str {
        &self.data().name
    }

    /// JSON-facing name, e.g. `fooBar`.
    pub fn json_name(&self) -> &str {
        &self.data().json_name
    }

    /// Field number.
    pub fn number(&self) -> u32 {
        self.data().number
    }

    /// Position of this field in its message's declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Singular or repeated.
    pub fn cardinality(&self) -> Cardinality {
        self.data().cardinality
    }

    /// Whether this is a repeated field.
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated
    }

    /// The kind of a single value of this field (for repeated fields, of one element).
    pub fn kind(&self) -> Kind {
        let registry = &self.message.registry;
        match self.data().kind {
            KindRef::Scalar(scalar) => Kind::Scalar(scalar),
            KindRef::Enum(index) => Kind::Enum(EnumDescriptor {
                registry: Arc::clone(registry),
                index,
            }),
            KindRef::Message(index) => Kind::Message(MessageDescriptor {
                registry: Arc::clone(registry),
                index,
            }),
        }
    }

    /// The message type this field belongs to.
    pub fn containing_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// The value an unset field reads back as: an empty list for repeated
    /// fields, otherwise the default of the field's kind.
    pub fn default_value(&self) -> Value {
        if self.is_list() {
            Value::List(Vec::new())
        } else {
            Value::default_for(&self.kind())
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("message", &self.message.full_name())
            .field("name", &self.name())
            .field("number", &self.number())
            .finish()
    }
}

impl fmt::Display for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.message.full_name(), self.name())
    }
}

/// Describes an enum type.
#[derive(Clone)]
pub struct EnumDescriptor {
    registry: Arc<Registry>,
    index: usize,
}

impl EnumDescriptor {
    fn data(&self) -> &EnumData {
        &self.registry.enums[self.index]
    }

    /// Fully qualified name.
    pub fn full_name(&self) -> &str {
        &self.data().full_name
    }

    /// Name without the package prefix.
    pub fn name(&self) -> &str {
        simple_name(self.full_name())
    }

    /// `(name, number)` pairs in declaration order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = (&str, i32)> + '_ {
        self.data()
            .values
            .iter()
            .map(|value| (value.name.as_str(), value.number))
    }

    /// Number of the value with the given name.
    pub fn value_by_name(&self, name: &str) -> Option<i32> {
        self.values()
            .find_map(|(candidate, number)| (candidate == name).then_some(number))
    }

    /// Name of the first value with the given number.
    pub fn value_by_number(&self, number: i32) -> Option<&str> {
        self.values()
            .find_map(|(name, candidate)| (candidate == number).then_some(name))
    }

    /// The number an unset enum field reads back as: the first declared value.
    pub fn default_number(&self) -> i32 {
        self.data().values.first().map_or(0, |value| value.number)
    }
}

impl PartialEq for EnumDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry) && self.index == other.index
    }
}

impl Eq for EnumDescriptor {}

impl Hash for EnumDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.registry) as usize).hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EnumDescriptor")
            .field(&self.full_name())
            .finish()
    }
}

impl fmt::Display for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

/// The declared kind of a field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A scalar.
    Scalar(ScalarKind),
    /// An enum, stored as its number.
    Enum(EnumDescriptor),
    /// A nested message.
    Message(MessageDescriptor),
}

impl Kind {
    /// The nested message type, if this is a message kind.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(message) => Some(message),
            _ => None,
        }
    }

    /// The enum type, if this is an enum kind.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    /// Whether values of this kind are nested messages.
    pub fn is_message(&self) -> bool {
        matches!(self, Kind::Message(_))
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar(scalar) => write!(f, "{scalar}"),
            Kind::Enum(enumeration) => write!(f, "enum {enumeration}"),
            Kind::Message(message) => write!(f, "message {message}"),
        }
    }
}

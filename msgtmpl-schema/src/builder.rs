//! Schema documents and the builder that freezes them into a registry.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::descriptor::{
    EnumData, EnumValueData, FieldData, KindRef, MessageData, Registry, TypeRef,
};
use crate::{Cardinality, ScalarKind, SchemaError, SchemaRegistry};

/// A set of type declarations, as written in a JSON schema file.
///
/// ```json
/// {
///   "messages": [
///     { "name": "test.Foo", "fields": [
///       { "name": "one", "number": 1, "type": "int32" },
///       { "name": "tags", "number": 2, "type": "string", "repeated": true }
///     ] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    /// Message declarations.
    #[serde(default)]
    pub messages: Vec<MessageDef>,
    /// Enum declarations.
    #[serde(default)]
    pub enums: Vec<EnumDef>,
}

/// A message type declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageDef {
    /// Fully qualified name, e.g. `test.Foo`.
    pub name: String,
    /// Fields, in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl MessageDef {
    /// A message with no fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

/// A field declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Declared name, usually snake_case.
    pub name: String,
    /// Field number; must be non-zero and unique within the message.
    pub number: u32,
    /// A scalar keyword (`int32`, `string`, ...) or the full name of a
    /// message or enum type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the field is repeated.
    #[serde(default)]
    pub repeated: bool,
    /// JSON name override; defaults to the lowerCamelCase form of `name`.
    #[serde(default)]
    pub json_name: Option<String>,
}

impl FieldDef {
    /// A singular field.
    pub fn new(name: impl Into<String>, number: u32, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            type_name: type_name.into(),
            repeated: false,
            json_name: None,
        }
    }

    /// Make the field repeated.
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Override the JSON name.
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = Some(json_name.into());
        self
    }
}

/// An enum type declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDef {
    /// Fully qualified name.
    pub name: String,
    /// Values, in declaration order. The first one is the default.
    pub values: Vec<EnumValueDef>,
}

impl EnumDef {
    /// An enum with no values yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Append a value.
    pub fn value(mut self, name: impl Into<String>, number: i32) -> Self {
        self.values.push(EnumValueDef {
            name: name.into(),
            number,
        });
        self
    }
}

/// One enum value.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDef {
    /// Value name.
    pub name: String,
    /// Value number.
    pub number: i32,
}

/// Collects type declarations in code and freezes them into a [`SchemaRegistry`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    document: SchemaDocument,
}

impl SchemaBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a message type.
    pub fn message(mut self, message: MessageDef) -> Self {
        self.document.messages.push(message);
        self
    }

    /// Declare an enum type.
    pub fn enumeration(mut self, enumeration: EnumDef) -> Self {
        self.document.enums.push(enumeration);
        self
    }

    /// Resolve type references and freeze the registry.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        build(&self.document)
    }
}

/// The JSON name protobuf derives from a field name: underscores dropped,
/// the letter after each one upper-cased.
pub fn to_json_name(name: &str) -> String {
    let mut json_name = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            json_name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            json_name.push(c);
        }
    }
    json_name
}

fn canonical(name: &str) -> &str {
    name.trim_start_matches('.')
}

pub(crate) fn build(document: &SchemaDocument) -> Result<SchemaRegistry, SchemaError> {
    let mut types = IndexMap::new();

    for (index, def) in document.enums.iter().enumerate() {
        let name = canonical(&def.name);
        if def.values.is_empty() {
            return Err(SchemaError::EmptyEnum {
                name: name.to_owned(),
            });
        }
        if types.insert(name.to_owned(), TypeRef::Enum(index)).is_some() {
            return Err(SchemaError::DuplicateType {
                name: name.to_owned(),
            });
        }
    }
    for (index, def) in document.messages.iter().enumerate() {
        let name = canonical(&def.name);
        if types.insert(name.to_owned(), TypeRef::Message(index)).is_some() {
            return Err(SchemaError::DuplicateType {
                name: name.to_owned(),
            });
        }
    }

    let enums = document
        .enums
        .iter()
        .map(build_enum)
        .collect::<Result<Vec<_>, _>>()?;
    let messages = document
        .messages
        .iter()
        .map(|def| build_message(def, &types))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaRegistry::from_registry(Registry {
        messages,
        enums,
        types,
    }))
}

fn build_enum(def: &EnumDef) -> Result<EnumData, SchemaError> {
    let full_name = canonical(&def.name).to_owned();
    let mut values: Vec<EnumValueData> = Vec::with_capacity(def.values.len());
    for value in &def.values {
        if values.iter().any(|existing| existing.name == value.name) {
            return Err(SchemaError::DuplicateEnumValue {
                enumeration: full_name,
                value: value.name.clone(),
            });
        }
        values.push(EnumValueData {
            name: value.name.clone(),
            number: value.number,
        });
    }
    Ok(EnumData { full_name, values })
}

fn resolve_kind(type_name: &str, types: &IndexMap<String, TypeRef>) -> Option<KindRef> {
    if let Some(scalar) = ScalarKind::from_keyword(type_name) {
        return Some(KindRef::Scalar(scalar));
    }
    Some(match types.get(canonical(type_name))? {
        TypeRef::Message(index) => KindRef::Message(*index),
        TypeRef::Enum(index) => KindRef::Enum(*index),
    })
}

fn build_message(
    def: &MessageDef,
    types: &IndexMap<String, TypeRef>,
) -> Result<MessageData, SchemaError> {
    let full_name = canonical(&def.name).to_owned();
    let mut fields = Vec::with_capacity(def.fields.len());
    let mut by_name = HashMap::new();
    let mut by_json_name = HashMap::new();
    let mut by_number = HashMap::new();

    for field in &def.fields {
        let duplicate = |what| SchemaError::DuplicateField {
            message: full_name.clone(),
            field: field.name.clone(),
            what,
        };

        if field.number == 0 {
            return Err(SchemaError::InvalidFieldNumber {
                message: full_name.clone(),
                field: field.name.clone(),
            });
        }
        let kind =
            resolve_kind(&field.type_name, types).ok_or_else(|| SchemaError::UnresolvedType {
                message: full_name.clone(),
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            })?;
        let json_name = field
            .json_name
            .clone()
            .unwrap_or_else(|| to_json_name(&field.name));

        let index = fields.len();
        if by_name.insert(field.name.clone(), index).is_some() {
            return Err(duplicate("name"));
        }
        if by_number.insert(field.number, index).is_some() {
            return Err(duplicate("number"));
        }
        if by_json_name.insert(json_name.clone(), index).is_some() {
            return Err(duplicate("JSON name"));
        }

        fields.push(FieldData {
            name: field.name.clone(),
            json_name,
            number: field.number,
            cardinality: if field.repeated {
                Cardinality::Repeated
            } else {
                Cardinality::Singular
            },
            kind,
        });
    }

    Ok(MessageData {
        full_name,
        fields,
        by_name,
        by_json_name,
        by_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Kind;

    #[test]
    fn json_names_are_lower_camel_case() {
        assert_eq!(to_json_name("foo"), "foo");
        assert_eq!(to_json_name("foo_bar"), "fooBar");
        assert_eq!(to_json_name("foo_bar_2"), "fooBar2");
        assert_eq!(to_json_name("already_camelCase"), "alreadyCamelCase");
    }

    #[test]
    fn resolves_forward_and_recursive_references() {
        let registry = SchemaBuilder::new()
            .message(
                MessageDef::new("test.Node")
                    .field(FieldDef::new("child", 1, "test.Node"))
                    .field(FieldDef::new("leaf", 2, ".test.Leaf").repeated()),
            )
            .message(MessageDef::new("test.Leaf").field(FieldDef::new("state", 1, "test.State")))
            .enumeration(EnumDef::new("test.State").value("IDLE", 0).value("BUSY", 1))
            .build()
            .unwrap();

        let node = registry.message("test.Node").unwrap();
        let child = node.field_by_name("child").unwrap();
        assert_eq!(child.kind(), Kind::Message(node.clone()));

        let leaf = node.field_by_json_name("leaf").unwrap();
        assert!(leaf.is_list());
        let leaf_type = leaf.kind().as_message().cloned().unwrap();
        assert_eq!(leaf_type.full_name(), "test.Leaf");

        let state = leaf_type.field_by_name("state").unwrap().kind();
        let state = state.as_enum().unwrap();
        assert_eq!(state.value_by_name("BUSY"), Some(1));
        assert_eq!(state.default_number(), 0);
    }

    #[test]
    fn rejects_unresolved_type() {
        let err = SchemaBuilder::new()
            .message(MessageDef::new("test.Foo").field(FieldDef::new("bar", 1, "test.Missing")))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnresolvedType { ref type_name, .. } if type_name == "test.Missing"));
    }

    #[test]
    fn rejects_colliding_json_names() {
        let err = SchemaBuilder::new()
            .message(
                MessageDef::new("test.Foo")
                    .field(FieldDef::new("foo_bar", 1, "string"))
                    .field(FieldDef::new("fooBar", 2, "string")),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "field `test.Foo.fooBar` reuses an existing JSON name"
        );
    }

    #[test]
    fn rejects_duplicate_types() {
        let err = SchemaBuilder::new()
            .message(MessageDef::new("test.Foo"))
            .message(MessageDef::new(".test.Foo"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateType { ref name } if name == "test.Foo"));
    }
}

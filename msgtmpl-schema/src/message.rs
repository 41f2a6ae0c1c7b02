use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use core::fmt;

use crate::{FieldDescriptor, FieldError, MessageDescriptor, Value};

/// A message instance whose type is only known at runtime.
///
/// Only populated fields are stored. Reading an unset field yields the
/// field's default, and equality compares those effective values, so a
/// field explicitly set to its default equals an unset one.
#[derive(Clone)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<usize, Value>,
}

impl DynamicMessage {
    /// An empty instance of `descriptor`.
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// The message type.
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    fn check_owner(&self, field: &FieldDescriptor) -> Result<(), FieldError> {
        if field.containing_message() == &self.descriptor {
            Ok(())
        } else {
            Err(FieldError::ForeignField {
                field: field.to_string(),
                message: self.descriptor.full_name().to_owned(),
            })
        }
    }

    /// Whether `field` has been populated.
    pub fn has(&self, field: &FieldDescriptor) -> bool {
        field.containing_message() == &self.descriptor && self.fields.contains_key(&field.index())
    }

    /// The value of `field`, or its default when unset.
    ///
    /// Fields of other message types always read as their default.
    pub fn get(&self, field: &FieldDescriptor) -> Cow<'_, Value> {
        if field.containing_message() != &self.descriptor {
            return Cow::Owned(field.default_value());
        }
        match self.fields.get(&field.index()) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(field.default_value()),
        }
    }

    /// The value of the field with the given JSON or declared name.
    pub fn get_by_name(&self, name: &str) -> Option<Cow<'_, Value>> {
        let field = self.field_named(name)?;
        Some(self.get(&field))
    }

    /// Mutable access to `field`, populating it with its default first if it
    /// was unset. This is how nested messages are created on demand.
    pub fn get_mut(&mut self, field: &FieldDescriptor) -> Result<&mut Value, FieldError> {
        self.check_owner(field)?;
        Ok(self
            .fields
            .entry(field.index())
            .or_insert_with(|| field.default_value()))
    }

    /// Set `field` to `value`, which must already have the field's exact kind.
    pub fn set(&mut self, field: &FieldDescriptor, value: Value) -> Result<(), FieldError> {
        self.check_owner(field)?;
        if !value.is_valid_for_field(field) {
            return Err(FieldError::KindMismatch {
                field: field.to_string(),
                expected: if field.is_list() {
                    format!("list of {}", field.kind())
                } else {
                    field.kind().to_string()
                },
                received: value.shape_name(),
            });
        }
        self.fields.insert(field.index(), value);
        Ok(())
    }

    /// Set the field with the given JSON or declared name.
    pub fn set_by_name(&mut self, name: &str, value: Value) -> Result<(), FieldError> {
        let field = self
            .field_named(name)
            .ok_or_else(|| FieldError::UnknownField {
                message: self.descriptor.full_name().to_owned(),
                name: name.to_owned(),
            })?;
        self.set(&field, value)
    }

    /// Reset `field` to unset.
    pub fn clear(&mut self, field: &FieldDescriptor) {
        if field.containing_message() == &self.descriptor {
            self.fields.remove(&field.index());
        }
    }

    /// Populated fields, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (FieldDescriptor, &Value)> + '_ {
        self.descriptor
            .fields()
            .filter_map(move |field| self.fields.get(&field.index()).map(|value| (field, value)))
    }

    /// Store a value the caller has already validated.
    pub(crate) fn insert_unchecked(&mut self, field: &FieldDescriptor, value: Value) {
        self.fields.insert(field.index(), value);
    }

    fn field_named(&self, name: &str) -> Option<FieldDescriptor> {
        self.descriptor
            .field_by_json_name(name)
            .or_else(|| self.descriptor.field_by_name(name))
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor
            && self
                .descriptor
                .fields()
                .all(|field| {
                    let index = field.index();
                    // both unset: skip, or recursive message types never bottom out
                    match (self.fields.get(&index), other.fields.get(&index)) {
                        (None, None) => true,
                        _ => self.get(&field) == other.get(&field),
                    }
                })
    }
}

impl fmt::Debug for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.descriptor.name());
        for (field, value) in self.fields() {
            s.field(field.name(), value);
        }
        s.finish()
    }
}

use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use indexmap::IndexMap;
use msgtmpl_schema::{DynamicMessage, MessageDescriptor, Value};

use crate::coerce::coerce;
use crate::path::render;
use crate::resolve::Substitution;
use crate::{EvalError, PathStep, ResolvedPath, debug, trace};

/// A compiled template: a skeleton message holding the literal parts, and
/// one [`Substitution`] per placeholder.
///
/// Templates are immutable. [`Template::evaluate`] works on a copy of the
/// skeleton, so one template can be evaluated any number of times, from any
/// number of threads.
#[derive(Debug, Clone)]
pub struct Template {
    substitutions: IndexMap<String, Substitution>,
    skeleton: DynamicMessage,
}

impl Template {
    pub(crate) fn new(
        substitutions: IndexMap<String, Substitution>,
        skeleton: DynamicMessage,
    ) -> Self {
        Self {
            substitutions,
            skeleton,
        }
    }

    /// The message type this template produces.
    pub fn descriptor(&self) -> &MessageDescriptor {
        self.skeleton.descriptor()
    }

    /// The literal parts of the template, decoded.
    pub fn skeleton(&self) -> &DynamicMessage {
        &self.skeleton
    }

    /// Placeholder names, in the order they appear in the template.
    pub fn placeholders(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.substitutions.keys().map(String::as_str)
    }

    /// The compiled substitution for one placeholder.
    pub fn substitution(&self, placeholder: &str) -> Option<&Substitution> {
        self.substitutions.get(placeholder)
    }

    /// All substitutions, keyed by placeholder name.
    pub fn substitutions(&self) -> &IndexMap<String, Substitution> {
        &self.substitutions
    }

    /// Build a message from the skeleton with every placeholder replaced by
    /// its argument.
    ///
    /// A placeholder without an argument gets the zero value of its field.
    /// Arguments naming no placeholder are ignored.
    pub fn evaluate<S: BuildHasher>(
        &self,
        args: &HashMap<String, Value, S>,
    ) -> Result<DynamicMessage, EvalError> {
        let mut message = self.skeleton.clone();

        for (placeholder, substitution) in &self.substitutions {
            let kind = &substitution.leaf_kind;
            let value = match args.get(placeholder) {
                Some(arg) => coerce(arg, kind).ok_or_else(|| EvalError::TypeMismatch {
                    placeholder: placeholder.clone(),
                    expected: kind.to_string(),
                    received: arg.shape_name(),
                })?,
                None => {
                    debug!(placeholder = %placeholder, "no argument supplied, writing the zero value");
                    Value::default_for(kind)
                }
            };
            trace!(placeholder = %placeholder, path = %substitution.path, "writing substitution");
            write(&mut message, placeholder, &substitution.path, value)?;
        }

        Ok(message)
    }
}

enum Slot<'a> {
    Message(&'a mut DynamicMessage),
    List(&'a mut Vec<Value>),
}

fn write(
    root: &mut DynamicMessage,
    placeholder: &str,
    path: &ResolvedPath,
    value: Value,
) -> Result<(), EvalError> {
    let mismatch = || EvalError::PathMismatch {
        placeholder: placeholder.to_owned(),
        path: path.to_string(),
    };
    let out_of_range = |depth: usize, index: usize, len: usize| EvalError::IndexOutOfRange {
        placeholder: placeholder.to_owned(),
        path: render(&path.steps()[..depth]),
        index,
        len,
    };

    let Some((last, parents)) = path.split_last() else {
        return Err(mismatch());
    };

    let mut slot = Slot::Message(root);
    for (depth, step) in parents.iter().enumerate() {
        slot = match (slot, step) {
            (Slot::Message(message), PathStep::Field(field)) => {
                match message.get_mut(field).map_err(|_| mismatch())? {
                    Value::Message(nested) => Slot::Message(nested),
                    Value::List(items) => Slot::List(items),
                    _ => return Err(mismatch()),
                }
            }
            (Slot::List(items), PathStep::Index(index)) => {
                let len = items.len();
                match items.get_mut(*index) {
                    Some(Value::Message(nested)) => Slot::Message(nested),
                    Some(_) => return Err(mismatch()),
                    None => return Err(out_of_range(depth, *index, len)),
                }
            }
            _ => return Err(mismatch()),
        };
    }

    match (slot, last) {
        (Slot::Message(message), PathStep::Field(field)) => {
            message.set(field, value).map_err(|_| mismatch())
        }
        (Slot::List(items), PathStep::Index(index)) => {
            let len = items.len();
            let element = items
                .get_mut(*index)
                .ok_or_else(|| out_of_range(parents.len(), *index, len))?;
            *element = value;
            Ok(())
        }
        _ => Err(mismatch()),
    }
}

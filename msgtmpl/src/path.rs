use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{self, Write};

use msgtmpl_schema::FieldDescriptor;

/// A single step of a schema-checked path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Select a field of the current message.
    Field(FieldDescriptor),
    /// Select an element of the current repeated field.
    Index(usize),
}

/// A path from a root message to one scalar or enum value, checked against
/// the schema when the template was compiled.
///
/// Every step but the last reaches a nested message or the list of a
/// repeated field. The last step is either a singular non-message field or
/// an index into a repeated non-message field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    steps: Vec<PathStep>,
}

impl ResolvedPath {
    pub(crate) fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// The steps, root first.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps. Never true for a compiled path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final step and the ones leading to it.
    pub fn split_last(&self) -> Option<(&PathStep, &[PathStep])> {
        self.steps.split_last()
    }

    /// The last field step, which names the field holding the value.
    pub fn leaf_field(&self) -> Option<&FieldDescriptor> {
        self.steps.iter().rev().find_map(|step| match step {
            PathStep::Field(field) => Some(field),
            PathStep::Index(_) => None,
        })
    }
}

/// Render `steps` as `foo.bar[2].baz`, using JSON names.
pub(crate) fn render(steps: &[PathStep]) -> String {
    let mut out = String::new();
    for step in steps {
        match step {
            PathStep::Field(field) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(field.json_name());
            }
            PathStep::Index(index) => {
                let _ = write!(out, "[{index}]");
            }
        }
    }
    if out.is_empty() {
        out.push_str("<root>");
    }
    out
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.steps))
    }
}

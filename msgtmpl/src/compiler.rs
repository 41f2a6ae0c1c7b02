use msgtmpl_schema::{DynamicMessage, MessageDescriptor, SchemaRegistry, json};

use crate::extract::{Extraction, PlaceholderExtractor};
use crate::resolve::resolve;
use crate::{CompileError, Template, debug};

/// Compiles JSON templates into [`Template`]s for the message types of a
/// registry.
///
/// The compiler holds no per-template state and can be shared between
/// threads.
#[derive(Debug, Clone)]
pub struct TemplateCompiler {
    registry: SchemaRegistry,
    extractor: PlaceholderExtractor,
}

impl TemplateCompiler {
    /// A compiler for the types in `registry`, using `{{name}}` placeholders.
    pub fn new(registry: SchemaRegistry) -> Self {
        Self {
            registry,
            extractor: PlaceholderExtractor::default(),
        }
    }

    /// Use a different placeholder syntax.
    pub fn with_extractor(mut self, extractor: PlaceholderExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// The registry message types are looked up in.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Compile `text` as a template for the message type named `type_name`.
    pub fn compile(&self, type_name: &str, text: &str) -> Result<Template, CompileError> {
        let descriptor =
            self.registry
                .message(type_name)
                .ok_or_else(|| CompileError::UnknownType {
                    name: type_name.to_owned(),
                })?;
        self.compile_for(&descriptor, text)
    }

    /// Compile `text` as a template for `descriptor`.
    pub fn compile_for(
        &self,
        descriptor: &MessageDescriptor,
        text: &str,
    ) -> Result<Template, CompileError> {
        let Extraction { locations, pruned } = self.extractor.extract_str(text)?;
        debug!(
            message = descriptor.full_name(),
            placeholders = locations.len(),
            "extracted placeholders"
        );

        let substitutions = resolve(&locations, descriptor)?;
        let skeleton = materialize(&pruned, descriptor)?;
        debug!(
            message = descriptor.full_name(),
            substitutions = substitutions.len(),
            "compiled template"
        );

        Ok(Template::new(substitutions, skeleton))
    }
}

/// Decode a placeholder-free template tree into the skeleton message.
pub fn materialize(
    pruned: &serde_json::Value,
    descriptor: &MessageDescriptor,
) -> Result<DynamicMessage, CompileError> {
    Ok(json::from_value(pruned, descriptor)?)
}

#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

/// The schema layer: descriptors, dynamic messages, and their JSON mapping.
pub use msgtmpl_schema as schema;
pub use msgtmpl_schema::{DynamicMessage, MessageDescriptor, SchemaRegistry, Value};

mod error;
pub use error::*;

pub mod extract;

mod path;
pub use path::{PathStep, ResolvedPath};

pub mod resolve;
pub use resolve::Substitution;

mod coerce;

mod template;
pub use template::Template;

mod compiler;
pub use compiler::{TemplateCompiler, materialize};

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
/// Forwards to tracing::warn when the tracing feature is enabled
macro_rules! warn {
    ($($tt:tt)*) => {};
}

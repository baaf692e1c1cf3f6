//! Schema module - typed tool signatures from runtime JSON Schema
//!
//! Tool servers describe their parameters with JSON Schema that is only
//! known at runtime. This module turns those schemas into a declarative
//! [`ToolSignature`] and validates named arguments against it, replacing
//! any need for runtime-generated functions.
//!
//! ## Architecture
//!
//! - **types**: semantic types, record types, signatures and typed values
//! - **adapter**: pure schema → signature conversion
//! - **registry**: session-scoped memo of generated record types
//! - **binding**: call-with-named-arguments validation

mod adapter;
mod binding;
mod registry;
mod types;

pub use adapter::SchemaAdapter;
pub use binding::{BindError, BoundArguments};
pub use registry::RecordRegistry;
pub use types::{
    FieldSpec, Parameter, RecordType, RecordValue, SemanticType, ToolSignature, TypedValue,
};

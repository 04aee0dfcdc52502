//! Schema declarations: field specs and the per-record-type registry.

mod registry;
mod spec;

pub use registry::SchemaRegistry;
pub use spec::FieldSpec;

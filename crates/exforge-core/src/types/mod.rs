//! Data model types shared across the workspace

pub mod coerce;
pub mod example;
pub mod pattern;
pub mod record;
pub mod schema;

pub use example::Example;
pub use pattern::{Pattern, PatternType, Transformation};
pub use record::Record;
pub use schema::{FieldType, SchemaField, TargetSchema};

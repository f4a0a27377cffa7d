//! Component schema types: field declarations, values, coercions and constraints.

mod component;
mod field;
mod types;

pub use component::ComponentSchema;
pub use field::FieldSpec;
pub use types::{CoerceFn, Coercion, Constraint, FieldType, Value};

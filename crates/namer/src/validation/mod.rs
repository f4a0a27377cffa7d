//! Validation and coercion of components against a schema.

mod validator;

pub use validator::Validator;

//! Field specification: one declared component of an identifier format.

use crate::error::{ComponentError, ComponentResult};

use super::types::{Coercion, Constraint, FieldType, Value};

/// Declaration of a single named component.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: String,
    /// Whether the field must be present.
    pub required: bool,
    /// Type every present value must have after coercion.
    pub expected_type: FieldType,
    /// Conversion applied before the type check.
    pub coercion: Option<Coercion>,
    /// Checks applied after the type check.
    pub constraints: Vec<Constraint>,
}

impl FieldSpec {
    /// Create a required field of the given type, without coercion.
    pub fn new(name: impl Into<String>, expected_type: FieldType) -> Self {
        Self {
            name: name.into(),
            required: true,
            expected_type,
            coercion: None,
            constraints: Vec::new(),
        }
    }

    /// Required string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Required integer field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// Mark the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Set the coercion.
    pub fn coerce(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }

    /// Add a constraint.
    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Coerce, type check and constrain a present, non-null value.
    pub fn check(&self, value: Value) -> ComponentResult<Value> {
        let value = match &self.coercion {
            Some(coercion) => coercion.apply(value),
            None => value,
        };
        self.conform(&value)?;
        Ok(value)
    }

    /// Type check and constrain an already coerced value.
    pub(crate) fn conform(&self, value: &Value) -> ComponentResult<()> {
        if !self.expected_type.matches(value) {
            return Err(ComponentError::TypeMismatch {
                field: self.name.clone(),
                expected: self.expected_type,
                actual: value.type_name().to_string(),
            });
        }

        for constraint in &self.constraints {
            constraint
                .check(value)
                .map_err(|reason| ComponentError::ConstraintViolation {
                    field: self.name.clone(),
                    reason,
                })?;
        }

        Ok(())
    }
}

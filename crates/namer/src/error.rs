//! Error types for the namer library.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::FieldType;

/// An error concerning a single record: one components mapping or one name.
///
/// Scalar operations fail with exactly one of these. Batch operations never
/// fail for a bad record; they attach one of these to the row instead.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentError {
    /// A required field is absent.
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// A key that the schema does not declare.
    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    /// A value does not have the declared type, even after coercion.
    #[error("field '{field}' expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        actual: String,
    },

    /// A value has the right type but breaks a declared constraint.
    #[error("field '{field}' violates constraint: {reason}")]
    ConstraintViolation { field: String, reason: String },

    /// The strategy cannot render the given components.
    #[error("encoding error: {reason}")]
    Encoding { reason: String },

    /// The name does not have the shape the strategy expects.
    #[error("decoding error: {reason}")]
    Decoding { reason: String },
}

impl ComponentError {
    /// Returns the field this error concerns, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ComponentError::MissingField { field }
            | ComponentError::UnknownField { field }
            | ComponentError::TypeMismatch { field, .. }
            | ComponentError::ConstraintViolation { field, .. } => Some(field),
            ComponentError::Encoding { .. } | ComponentError::Decoding { .. } => None,
        }
    }

    /// Returns true for the schema-level kinds (missing, unknown, mistyped, constrained).
    pub fn is_schema_error(&self) -> bool {
        self.field().is_some()
    }

    /// Short snake_case label, used for diagnostics columns.
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentError::MissingField { .. } => "missing_field",
            ComponentError::UnknownField { .. } => "unknown_field",
            ComponentError::TypeMismatch { .. } => "type_mismatch",
            ComponentError::ConstraintViolation { .. } => "constraint_violation",
            ComponentError::Encoding { .. } => "encoding_error",
            ComponentError::Decoding { .. } => "decoding_error",
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ComponentError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn unknown(field: impl Into<String>) -> Self {
        ComponentError::UnknownField {
            field: field.into(),
        }
    }

    pub(crate) fn encoding(reason: impl Into<String>) -> Self {
        ComponentError::Encoding {
            reason: reason.into(),
        }
    }

    pub(crate) fn decoding(reason: impl Into<String>) -> Self {
        ComponentError::Decoding {
            reason: reason.into(),
        }
    }
}

/// Main error type for namer construction and I/O.
#[derive(Debug, Error)]
pub enum NamerError {
    /// A schema or strategy that is inconsistent with itself.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// A record-level error surfaced outside a batch.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error reading from a stream with no path attached.
    #[error("IO error reading input: {0}")]
    Read(#[source] std::io::Error),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column the caller asked for is not in the input.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A table column whose length differs from the table's row count.
    #[error("Column '{column}' has {len} values, table has {rows} rows")]
    RaggedColumn {
        column: String,
        len: usize,
        rows: usize,
    },

    /// Empty file or no rows to read.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result type alias for construction and I/O.
pub type Result<T> = std::result::Result<T, NamerError>;

/// Result type alias for single-record operations.
pub type ComponentResult<T> = std::result::Result<T, ComponentError>;

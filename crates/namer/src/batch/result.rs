//! Batch results: aligned outputs plus per-row diagnostics.

use serde::{Deserialize, Serialize};

use crate::components::Components;
use crate::error::ComponentError;

use super::table::ComponentTable;

/// Diagnostic for one invalid row of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based position in the input batch.
    pub row: usize,
    pub error: ComponentError,
}

impl RowError {
    pub fn new(row: usize, error: ComponentError) -> Self {
        Self { row, error }
    }
}

fn sorted(mut errors: Vec<RowError>) -> Vec<RowError> {
    errors.sort_by_key(|e| e.row);
    errors.dedup_by_key(|e| e.row);
    errors
}

fn find_error(errors: &[RowError], row: usize) -> Option<&ComponentError> {
    errors
        .binary_search_by_key(&row, |e| e.row)
        .ok()
        .map(|i| &errors[i].error)
}

/// Result of formatting a batch: one outcome per input row, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameBatch {
    rows: Vec<Result<String, ComponentError>>,
}

impl NameBatch {
    /// Assemble a batch from name slots and diagnostics. A row with a
    /// diagnostic loses its name; only the first diagnostic per row is kept.
    /// A slot with neither gets an encoding error.
    pub fn new(names: Vec<Option<String>>, errors: Vec<RowError>) -> Self {
        let mut errors = sorted(errors).into_iter().peekable();
        let rows = names
            .into_iter()
            .enumerate()
            .map(|(row, name)| match errors.next_if(|e| e.row == row) {
                Some(e) => Err(e.error),
                None => name.ok_or_else(|| ComponentError::encoding("no name produced for row")),
            })
            .collect();
        Self { rows }
    }

    /// Batch where every row failed with the same error.
    pub fn failed(len: usize, error: ComponentError) -> Self {
        Self {
            rows: vec![Err(error); len],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name at a row, if the row was valid.
    pub fn get(&self, row: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.as_deref().ok())
    }

    /// Name slots in input order, `None` where the row was invalid.
    pub fn names(&self) -> impl Iterator<Item = Option<&str>> {
        self.rows.iter().map(|r| r.as_deref().ok())
    }

    /// Diagnostics, sorted by row.
    pub fn errors(&self) -> Vec<RowError> {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(row, r)| r.as_ref().err().map(|e| RowError::new(row, e.clone())))
            .collect()
    }

    pub fn error_at(&self, row: usize) -> Option<&ComponentError> {
        self.rows.get(row).and_then(|r| r.as_ref().err())
    }

    pub fn is_valid(&self, row: usize) -> bool {
        self.rows.get(row).is_some_and(Result::is_ok)
    }

    pub fn valid_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_ok()).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.len() - self.valid_count()
    }

    /// Per-row view: the name or the error for that row.
    pub fn iter(&self) -> impl Iterator<Item = Result<&str, &ComponentError>> {
        self.rows.iter().map(|r| r.as_deref())
    }

    /// Consume into per-row outcomes.
    pub fn into_results(self) -> Vec<Result<String, ComponentError>> {
        self.rows
    }
}

/// Result of parsing or validating a batch: a table aligned with the input,
/// with every cell of an invalid row set to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawComponentBatch")]
pub struct ComponentBatch {
    table: ComponentTable,
    errors: Vec<RowError>,
}

#[derive(Deserialize)]
struct RawComponentBatch {
    table: ComponentTable,
    errors: Vec<RowError>,
}

impl TryFrom<RawComponentBatch> for ComponentBatch {
    type Error = String;

    fn try_from(raw: RawComponentBatch) -> Result<Self, String> {
        let rows = raw.table.row_count();
        if let Some(e) = raw.errors.iter().find(|e| e.row >= rows) {
            return Err(format!("error for row {} in a batch of {} rows", e.row, rows));
        }
        Ok(Self::new(raw.table, raw.errors))
    }
}

impl ComponentBatch {
    /// Assemble a batch. Rows with an error have their cells cleared.
    /// Only the first error per row is kept.
    pub fn new(mut table: ComponentTable, errors: Vec<RowError>) -> Self {
        let errors = sorted(errors);
        for e in &errors {
            if e.row < table.row_count() {
                table.clear_row(e.row);
            }
        }
        Self { table, errors }
    }

    pub fn len(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &ComponentTable {
        &self.table
    }

    /// Components at a row, if the row was valid.
    pub fn get(&self, row: usize) -> Option<Components> {
        if self.error_at(row).is_some() {
            return None;
        }
        self.table.row(row)
    }

    /// Diagnostics, sorted by row.
    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn error_at(&self, row: usize) -> Option<&ComponentError> {
        find_error(&self.errors, row)
    }

    pub fn is_valid(&self, row: usize) -> bool {
        row < self.len() && self.error_at(row).is_none()
    }

    /// Row indices without an error, ascending.
    pub fn valid_rows(&self) -> Vec<usize> {
        let mut errors = self.errors.iter().map(|e| e.row).peekable();
        (0..self.len())
            .filter(|row| {
                if errors.peek() == Some(row) {
                    errors.next();
                    false
                } else {
                    true
                }
            })
            .collect()
    }

    pub fn valid_count(&self) -> usize {
        self.len() - self.errors.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.errors.len()
    }

    /// Per-row view: the components or the error for that row.
    pub fn iter(&self) -> impl Iterator<Item = Result<Components, &ComponentError>> + '_ {
        (0..self.len()).map(move |row| match self.error_at(row) {
            Some(error) => Err(error),
            None => Ok(self.table.row(row).unwrap_or_default()),
        })
    }

    /// Split into the aligned table and diagnostics.
    pub fn into_parts(self) -> (ComponentTable, Vec<RowError>) {
        (self.table, self.errors)
    }
}

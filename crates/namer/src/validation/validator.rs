//! Schema validation for single mappings and whole tables.

use tracing::trace;

use crate::batch::{ComponentBatch, ComponentTable, RowError};
use crate::components::Components;
use crate::error::ComponentResult;
use crate::schema::{ComponentSchema, FieldSpec, Value};

/// Applies a [`ComponentSchema`] to records and batches.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: ComponentSchema,
}

impl Validator {
    pub fn new(schema: ComponentSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    /// Validate and coerce one mapping. Returns a new mapping in field order.
    pub fn validate(&self, raw: &Components) -> ComponentResult<Components> {
        self.schema.validate_and_coerce(raw)
    }

    /// Validate and coerce every row of a table.
    ///
    /// Each declared column is coerced and checked in one pass. Rows that
    /// fail any column are then re-run through [`validate`](Self::validate)
    /// one by one, so the reported error is exactly the one the scalar path
    /// would report. The result keeps every input row, in order; invalid
    /// rows have null cells and a diagnostic.
    pub fn validate_batch(&self, table: &ComponentTable) -> ComponentBatch {
        let rows = table.row_count();
        let mut failed = vec![false; rows];
        let mut out = ComponentTable::new(rows);

        for field in self.schema.fields() {
            match table.column(&field.name) {
                Some(column) => {
                    let checked = check_column(field, column, &mut failed);
                    out.put_column(field.name.as_str(), checked);
                }
                None if field.required => failed.fill(true),
                None => {}
            }
        }

        for (name, column) in table.columns() {
            if self.schema.contains(name) {
                continue;
            }
            for (row, cell) in column.iter().enumerate() {
                if !cell.is_null() {
                    failed[row] = true;
                }
            }
        }

        let errors = self.diagnose(table, &failed);
        if !errors.is_empty() {
            trace!(rows, invalid = errors.len(), "row-wise validation fallback");
        }
        ComponentBatch::new(out, errors)
    }

    /// Row-wise pass over the rows the column pass flagged.
    fn diagnose(&self, table: &ComponentTable, failed: &[bool]) -> Vec<RowError> {
        failed
            .iter()
            .enumerate()
            .filter(|(_, failed)| **failed)
            .filter_map(|(row, _)| {
                let raw = table.row(row)?;
                self.validate(&raw).err().map(|error| RowError::new(row, error))
            })
            .collect()
    }
}

/// Coerce one column and mark the rows whose cells do not conform.
fn check_column(field: &FieldSpec, column: &[Value], failed: &mut [bool]) -> Vec<Value> {
    let mut values = column.to_vec();

    if let Some(coercion) = &field.coercion {
        if coercion.is_broadcastable() {
            coercion.apply_column(&mut values);
        } else {
            for cell in values.iter_mut().filter(|c| !c.is_null()) {
                *cell = coercion.apply(std::mem::take(cell));
            }
        }
    }

    for (row, cell) in values.iter().enumerate() {
        if failed[row] {
            continue;
        }
        let ok = if cell.is_null() {
            !field.required
        } else {
            field.conform(cell).is_ok()
        };
        if !ok {
            failed[row] = true;
        }
    }

    values
}

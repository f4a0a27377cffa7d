//! Glue between batch shapes and the strategy entry points.
//!
//! Batch operations run validation over the whole table, hand only the valid
//! rows to the strategy, then scatter the strategy's results back to their
//! original row positions. Everything here keeps row count and row order.

use crate::components::Components;
use crate::error::ComponentResult;
use crate::namer::Namer;
use crate::schema::{ComponentSchema, Value};

use super::{ComponentBatch, ComponentTable, NameBatch, RowError};

// ============================================================================
// Table preparation
// ============================================================================

/// Rename `<prefix><field>` columns to `<field>` for every declared field.
///
/// A column already named `<field>` is left alone and the prefixed one is
/// kept as is, so it surfaces as an unknown field during validation.
pub(crate) fn strip_column_prefix(
    table: &mut ComponentTable,
    prefix: &str,
    schema: &ComponentSchema,
) {
    if prefix.is_empty() {
        return;
    }
    for name in schema.field_names() {
        if table.has_column(name) {
            continue;
        }
        table.rename_column(&format!("{prefix}{name}"), name);
    }
}

/// Broadcast each default into its column: missing columns are created,
/// null cells in existing columns are filled.
pub(crate) fn apply_defaults(table: &mut ComponentTable, defaults: &Components) {
    let rows = table.row_count();
    for (key, value) in defaults.iter() {
        if value.is_null() {
            continue;
        }
        match table.column_mut(key) {
            Some(column) => {
                for cell in column.iter_mut().filter(|c| c.is_null()) {
                    *cell = value.clone();
                }
            }
            None => table.put_column(key, vec![value.clone(); rows]),
        }
    }
}

/// Overwrite each forced column with its constant value.
pub(crate) fn apply_forced(table: &mut ComponentTable, forced: &Components) {
    let rows = table.row_count();
    for (key, value) in forced.iter() {
        table.put_column(key, vec![value.clone(); rows]);
    }
}

// ============================================================================
// Scatter back to input positions
// ============================================================================

/// Place names computed for a subset of rows back at their input positions.
///
/// `positions[j]` is the input row of the subset's row `j`. Rows not in the
/// subset must be covered by `prior`.
pub(crate) fn scatter_names(
    total: usize,
    positions: &[usize],
    subset: NameBatch,
    prior: Vec<RowError>,
) -> NameBatch {
    let mut names = vec![None; total];
    let mut errors = prior;

    for (outcome, &row) in subset.into_results().into_iter().zip(positions) {
        match outcome {
            Ok(name) => names[row] = Some(name),
            Err(error) => errors.push(RowError::new(row, error)),
        }
    }
    NameBatch::new(names, errors)
}

/// Place components computed for a subset of rows back at their input
/// positions. Rows outside the subset get null cells.
pub(crate) fn scatter_components(
    total: usize,
    positions: &[usize],
    subset: ComponentBatch,
    prior: Vec<RowError>,
) -> ComponentBatch {
    let (subset_table, subset_errors) = subset.into_parts();
    let mut table = ComponentTable::new(total);

    for (name, cells) in subset_table.into_columns() {
        let mut column = vec![Value::Null; total];
        for (cell, &row) in cells.into_iter().zip(positions) {
            column[row] = cell;
        }
        table.put_column(name, column);
    }

    let mut errors = prior;
    errors.extend(
        subset_errors
            .into_iter()
            .map(|e| RowError::new(positions[e.row], e.error)),
    );
    ComponentBatch::new(table, errors)
}

// ============================================================================
// Shape dispatch
// ============================================================================

/// An input [`Namer::convert`] accepts, routed by its shape.
///
/// A single mapping is formatted, a table is formatted row-wise in bulk, a
/// single name is parsed, and a slice of names is parsed in bulk.
pub trait NamerInput {
    type Output;

    fn convert_with(self, namer: &Namer) -> Self::Output;
}

impl NamerInput for &Components {
    type Output = ComponentResult<String>;

    fn convert_with(self, namer: &Namer) -> Self::Output {
        namer.format(self)
    }
}

impl NamerInput for &ComponentTable {
    type Output = NameBatch;

    fn convert_with(self, namer: &Namer) -> Self::Output {
        namer.format_many(self)
    }
}

impl NamerInput for &str {
    type Output = ComponentResult<Components>;

    fn convert_with(self, namer: &Namer) -> Self::Output {
        namer.parse(self)
    }
}

impl<S: AsRef<str>> NamerInput for &[S] {
    type Output = ComponentBatch;

    fn convert_with(self, namer: &Namer) -> Self::Output {
        namer.parse_many(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components;
    use crate::error::ComponentError;
    use crate::schema::FieldSpec;

    fn table() -> ComponentTable {
        ComponentTable::from_rows(&[
            components! { "x_a" => "1", "b" => "k" },
            components! { "x_a" => "2" },
        ])
    }

    #[test]
    fn test_strip_column_prefix() {
        let schema =
            ComponentSchema::new(vec![FieldSpec::string("a"), FieldSpec::string("b")]).unwrap();
        let mut t = table();
        strip_column_prefix(&mut t, "x_", &schema);
        assert_eq!(t.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_defaults_fill_nulls_and_missing_columns() {
        let mut t = table();
        apply_defaults(&mut t, &components! { "b" => "d", "c" => "z" });

        assert_eq!(t.get(0, "b"), Some(&Value::from("k")));
        assert_eq!(t.get(1, "b"), Some(&Value::from("d")));
        assert_eq!(t.column("c").unwrap(), &[Value::from("z"), Value::from("z")]);
    }

    #[test]
    fn test_forced_overwrites() {
        let mut t = table();
        apply_forced(&mut t, &components! { "b" => "f" });
        assert_eq!(t.column("b").unwrap(), &[Value::from("f"), Value::from("f")]);
    }

    #[test]
    fn test_scatter_names_restores_positions() {
        let subset = NameBatch::new(
            vec![Some("n0".into()), None],
            vec![RowError::new(1, ComponentError::encoding("nope"))],
        );
        let prior = vec![RowError::new(1, ComponentError::missing("a"))];
        let batch = scatter_names(4, &[0, 3], subset, prior);

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.get(0), Some("n0"));
        assert_eq!(batch.error_at(1), Some(&ComponentError::missing("a")));
        assert!(batch.error_at(2).is_some());
        assert_eq!(batch.error_at(3), Some(&ComponentError::encoding("nope")));
    }

    #[test]
    fn test_scatter_components_restores_positions() {
        let subset = ComponentBatch::new(
            ComponentTable::from_rows(&[components! { "a" => "1" }, components! { "a" => "2" }]),
            Vec::new(),
        );
        let prior = vec![RowError::new(1, ComponentError::decoding("bad"))];
        let batch = scatter_components(3, &[0, 2], subset, prior);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(2), Some(components! { "a" => "2" }));
        assert_eq!(batch.table().get(1, "a"), Some(&Value::Null));
        assert!(!batch.is_valid(1));
    }
}

//! Columnar table of components: one column per field, one row per record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::components::Components;
use crate::error::{NamerError, Result};
use crate::schema::Value;

/// A batch of components stored column-wise.
///
/// Every column has exactly `row_count` cells. A `Null` cell means the field
/// is absent for that row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct ComponentTable {
    columns: IndexMap<String, Vec<Value>>,
    row_count: usize,
}

/// Serialized shape of a table, checked before it becomes one.
#[derive(Deserialize)]
struct RawTable {
    columns: IndexMap<String, Vec<Value>>,
    row_count: usize,
}

impl TryFrom<RawTable> for ComponentTable {
    type Error = NamerError;

    fn try_from(raw: RawTable) -> Result<Self> {
        let mut table = Self::new(raw.row_count);
        for (name, values) in raw.columns {
            table.add_column(name, values)?;
        }
        Ok(table)
    }
}

impl ComponentTable {
    /// Create a table with `row_count` rows and no columns yet.
    pub fn new(row_count: usize) -> Self {
        Self {
            columns: IndexMap::new(),
            row_count,
        }
    }

    /// Build a table from named columns, which must all have the same length.
    pub fn from_columns<K, I>(columns: I) -> Result<Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<Value>)>,
    {
        let mut iter = columns.into_iter().peekable();
        let row_count = iter.peek().map(|(_, v)| v.len()).unwrap_or(0);

        let mut table = Self::new(row_count);
        for (name, values) in iter {
            table.add_column(name, values)?;
        }
        Ok(table)
    }

    /// Build a table from row mappings. Columns appear in first-seen key
    /// order; keys missing from a row become null cells.
    pub fn from_rows(rows: &[Components]) -> Self {
        let mut table = Self::new(rows.len());
        for (row_idx, row) in rows.iter().enumerate() {
            for (key, value) in row.iter() {
                let column = table
                    .columns
                    .entry(key.to_string())
                    .or_insert_with(|| vec![Value::Null; rows.len()]);
                column[row_idx] = value.clone();
            }
        }
        table
    }

    /// Add (or replace) a column, builder style.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        self.add_column(name, values)?;
        Ok(self)
    }

    /// Add (or replace) a column.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if values.len() != self.row_count {
            return Err(NamerError::RaggedColumn {
                column: name,
                len: values.len(),
                rows: self.row_count,
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Insert a column whose length the caller already guarantees.
    pub(crate) fn put_column(&mut self, name: impl Into<String>, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.row_count);
        self.columns.insert(name.into(), values);
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Vec<Value>> {
        self.columns.get_mut(name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in column order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Iterate over `(name, cells)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Rename a column in place, keeping its position. Returns false if
    /// `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> bool {
        if !self.columns.contains_key(from) {
            return false;
        }
        let to = to.into();
        self.columns = std::mem::take(&mut self.columns)
            .into_iter()
            .map(|(name, values)| {
                if name == from {
                    (to.clone(), values)
                } else {
                    (name, values)
                }
            })
            .collect();
        true
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.get(row))
    }

    /// Materialize one row as a components mapping. Null cells are omitted.
    pub fn row(&self, row: usize) -> Option<Components> {
        if row >= self.row_count {
            return None;
        }
        Some(
            self.columns
                .iter()
                .filter(|(_, cells)| !cells[row].is_null())
                .map(|(name, cells)| (name.as_str(), cells[row].clone()))
                .collect(),
        )
    }

    /// Iterate rows as components mappings.
    pub fn rows(&self) -> impl Iterator<Item = Components> + '_ {
        (0..self.row_count).filter_map(move |i| self.row(i))
    }

    /// New table holding only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> ComponentTable {
        let mut out = ComponentTable::new(rows.len());
        for (name, cells) in &self.columns {
            let taken = rows.iter().map(|&i| cells[i].clone()).collect();
            out.columns.insert(name.clone(), taken);
        }
        out
    }

    /// Consume into `(name, cells)` pairs in column order.
    pub(crate) fn into_columns(self) -> impl Iterator<Item = (String, Vec<Value>)> {
        self.columns.into_iter()
    }

    /// Set every cell of a row to null.
    pub(crate) fn clear_row(&mut self, row: usize) {
        for cells in self.columns.values_mut() {
            cells[row] = Value::Null;
        }
    }
}

//! Delimiter-joined names: field values in declaration order, joined by one
//! separator character.

use std::borrow::Cow;

use crate::batch::{ComponentBatch, ComponentTable, NameBatch, RowError};
use crate::components::Components;
use crate::error::{ComponentError, ComponentResult, NamerError, Result};
use crate::schema::{ComponentSchema, Value};

use super::NamingStrategy;

/// Strategy for names of the form `<field1><sep><field2><sep>...`.
///
/// Values must not contain the separator. There is no escaping; such values
/// are refused at encode time.
#[derive(Debug, Clone)]
pub struct DelimitedStrategy {
    schema: ComponentSchema,
    separator: char,
}

impl DelimitedStrategy {
    /// Create a strategy. Segments are assigned to fields by position, so
    /// every field must be required.
    pub fn new(schema: ComponentSchema, separator: char) -> Result<Self> {
        if let Some(field) = schema.fields().find(|f| !f.required) {
            return Err(NamerError::InvalidSchema(format!(
                "delimited formats decode by position; field '{}' cannot be optional",
                field.name
            )));
        }

        Ok(Self { schema, separator })
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Text for one segment.
    fn segment<'v>(&self, field: &str, value: Option<&'v Value>) -> ComponentResult<Cow<'v, str>> {
        let value = value
            .filter(|v| !v.is_null())
            .ok_or_else(|| ComponentError::encoding(format!("field '{}' is missing", field)))?;
        let text = value.render();
        if text.contains(self.separator) {
            return Err(ComponentError::encoding(format!(
                "field '{}' contains the separator '{}'",
                field, self.separator
            )));
        }
        Ok(text)
    }

    fn segment_count_error(&self, found: usize) -> ComponentError {
        ComponentError::decoding(format!(
            "expected {} segments separated by '{}', found {}",
            self.schema.len(),
            self.separator,
            found
        ))
    }
}

impl NamingStrategy for DelimitedStrategy {
    fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    fn encode_one(&self, components: &Components) -> ComponentResult<String> {
        let mut name = String::new();
        for (i, field) in self.schema.fields().enumerate() {
            let text = self.segment(&field.name, components.get(&field.name))?;
            if i > 0 {
                name.push(self.separator);
            }
            name.push_str(&text);
        }
        Ok(name)
    }

    fn decode_one(&self, name: &str) -> ComponentResult<Components> {
        let segments: Vec<&str> = name.split(self.separator).collect();
        if segments.len() != self.schema.len() {
            return Err(self.segment_count_error(segments.len()));
        }

        Ok(self
            .schema
            .fields()
            .zip(segments)
            .map(|(field, segment)| (field.name.as_str(), segment))
            .collect())
    }

    fn encode_many(&self, table: &ComponentTable) -> NameBatch {
        let rows = table.row_count();
        let mut names = vec![String::new(); rows];
        let mut failed = vec![false; rows];
        let mut errors = Vec::new();

        // One pass per column: append separator and cell to every row.
        for (i, field) in self.schema.fields().enumerate() {
            let Some(column) = table.column(&field.name) else {
                return NameBatch::failed(
                    rows,
                    ComponentError::encoding(format!("column '{}' is missing", field.name)),
                );
            };

            for (row, (name, cell)) in names.iter_mut().zip(column).enumerate() {
                if failed[row] {
                    continue;
                }
                match self.segment(&field.name, Some(cell)) {
                    Ok(text) => {
                        if i > 0 {
                            name.push(self.separator);
                        }
                        name.push_str(&text);
                    }
                    Err(error) => {
                        failed[row] = true;
                        errors.push(RowError::new(row, error));
                    }
                }
            }
        }

        let names = names
            .into_iter()
            .zip(failed)
            .map(|(name, failed)| (!failed).then_some(name))
            .collect();
        NameBatch::new(names, errors)
    }

    fn decode_many(&self, names: &[&str]) -> ComponentBatch {
        let width = self.schema.len();
        let mut columns: Vec<Vec<Value>> =
            (0..width).map(|_| Vec::with_capacity(names.len())).collect();
        let mut errors = Vec::new();
        let mut segments: Vec<&str> = Vec::with_capacity(width);

        for (row, name) in names.iter().enumerate() {
            segments.clear();
            segments.extend(name.split(self.separator));

            if segments.len() == width {
                for (column, segment) in columns.iter_mut().zip(&segments) {
                    column.push(Value::from(*segment));
                }
            } else {
                errors.push(RowError::new(row, self.segment_count_error(segments.len())));
                for column in &mut columns {
                    column.push(Value::Null);
                }
            }
        }

        let mut table = ComponentTable::new(names.len());
        for (field, column) in self.schema.fields().zip(columns) {
            table.put_column(field.name.as_str(), column);
        }
        ComponentBatch::new(table, errors)
    }
}

//! Prefixed file names: `^<prefix>|<fname>`.
//!
//! Formatting guarantees the prefix: a file name without one gets three
//! random alphanumerics, so uploads with the same file name do not collide.
//! Parsing never fails; a name without a well-formed prefix is taken whole
//! as `fname`.

use crate::batch::{ComponentBatch, ComponentTable, NameBatch, RowError};
use crate::components::Components;
use crate::error::{ComponentError, ComponentResult, Result};
use crate::namer::Namer;
use crate::schema::{ComponentSchema, Constraint, FieldSpec, Value};
use crate::strategy::NamingStrategy;

/// Field names, in name order.
pub const SS_FILE_FIELDS: [&str; 2] = ["prefix", "fname"];

const MARKER: char = '^';
const BAR: char = '|';
const PREFIX_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct SsFileStrategy {
    schema: ComponentSchema,
}

impl SsFileStrategy {
    pub fn new() -> Result<Self> {
        let schema = ComponentSchema::new(vec![
            FieldSpec::string(SS_FILE_FIELDS[0])
                .optional()
                .constrain(Constraint::exact_length(PREFIX_LEN)),
            FieldSpec::string(SS_FILE_FIELDS[1]),
        ])?;
        Ok(Self { schema })
    }

    /// Split `^abc|rest` into `("abc", "rest")`.
    fn split_prefixed(name: &str) -> Option<(&str, &str)> {
        let rest = name.strip_prefix(MARKER)?;
        let (end, _) = rest.char_indices().nth(PREFIX_LEN)?;
        let (prefix, tail) = rest.split_at(end);
        let fname = tail.strip_prefix(BAR)?;
        Some((prefix, fname))
    }

    fn random_prefix() -> String {
        std::iter::repeat_with(fastrand::alphanumeric)
            .take(PREFIX_LEN)
            .collect()
    }

    fn render(prefix: &Value, fname: &Value) -> String {
        format!("{}{}{}{}", MARKER, prefix.render(), BAR, fname.render())
    }
}

impl NamingStrategy for SsFileStrategy {
    fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    fn encode_one(&self, components: &Components) -> ComponentResult<String> {
        let prefix = components
            .get_present(SS_FILE_FIELDS[0])
            .ok_or_else(|| ComponentError::encoding("prefix is missing"))?;
        let fname = components
            .get_present(SS_FILE_FIELDS[1])
            .ok_or_else(|| ComponentError::encoding("fname is missing"))?;
        Ok(Self::render(prefix, fname))
    }

    fn decode_one(&self, name: &str) -> ComponentResult<Components> {
        let mut components = Components::with_capacity(2);
        match Self::split_prefixed(name) {
            Some((prefix, fname)) => {
                components.insert(SS_FILE_FIELDS[0], prefix);
                components.insert(SS_FILE_FIELDS[1], fname);
            }
            None => {
                components.insert(SS_FILE_FIELDS[1], name);
            }
        }
        Ok(components)
    }

    fn encode_many(&self, table: &ComponentTable) -> NameBatch {
        let rows = table.row_count();
        let (Some(prefixes), Some(fnames)) = (
            table.column(SS_FILE_FIELDS[0]),
            table.column(SS_FILE_FIELDS[1]),
        ) else {
            return NameBatch::failed(
                rows,
                ComponentError::encoding("prefix and fname columns are required"),
            );
        };

        let mut errors = Vec::new();
        let names = prefixes
            .iter()
            .zip(fnames)
            .enumerate()
            .map(|(row, (prefix, fname))| {
                if prefix.is_null() || fname.is_null() {
                    errors.push(RowError::new(
                        row,
                        ComponentError::encoding("prefix and fname must both be present"),
                    ));
                    None
                } else {
                    Some(Self::render(prefix, fname))
                }
            })
            .collect();
        NameBatch::new(names, errors)
    }

    fn decode_many(&self, names: &[&str]) -> ComponentBatch {
        let mut prefixes = Vec::with_capacity(names.len());
        let mut fnames = Vec::with_capacity(names.len());

        for name in names {
            match Self::split_prefixed(name) {
                Some((prefix, fname)) => {
                    prefixes.push(Value::from(prefix));
                    fnames.push(Value::from(fname));
                }
                None => {
                    prefixes.push(Value::Null);
                    fnames.push(Value::from(*name));
                }
            }
        }

        let mut table = ComponentTable::new(names.len());
        table.put_column(SS_FILE_FIELDS[0], prefixes);
        table.put_column(SS_FILE_FIELDS[1], fnames);
        ComponentBatch::new(table, Vec::new())
    }

    fn complete(&self, components: Components) -> Components {
        if components.get_present(SS_FILE_FIELDS[0]).is_some() {
            return components;
        }
        let mut completed = Components::with_capacity(components.len() + 1);
        completed.insert(SS_FILE_FIELDS[0], Self::random_prefix());
        for (key, value) in components {
            if key != SS_FILE_FIELDS[0] {
                completed.insert(key, value);
            }
        }
        completed
    }

    fn complete_many(&self, mut table: ComponentTable) -> ComponentTable {
        match table.column_mut(SS_FILE_FIELDS[0]) {
            Some(prefixes) => {
                for cell in prefixes.iter_mut().filter(|c| c.is_null()) {
                    *cell = Value::from(Self::random_prefix());
                }
            }
            None => {
                let prefixes = (0..table.row_count())
                    .map(|_| Value::from(Self::random_prefix()))
                    .collect();
                table.put_column(SS_FILE_FIELDS[0], prefixes);
            }
        }
        table
    }
}

/// Namer for prefixed file names.
pub fn ss_file_namer() -> Result<Namer> {
    Ok(Namer::new(SsFileStrategy::new()?))
}

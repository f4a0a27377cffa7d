//! Regex-described names: decoding through named capture groups, encoding
//! through a `{field}` template.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::batch::{ComponentBatch, ComponentTable, NameBatch, RowError};
use crate::components::Components;
use crate::error::{ComponentError, ComponentResult, NamerError, Result};
use crate::schema::{ComponentSchema, Value};

use super::NamingStrategy;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone)]
enum Piece {
    Literal(String),
    Field(String),
}

/// Strategy for names described by a regex with one named group per field.
///
/// ```
/// use namer::schema::{ComponentSchema, FieldSpec};
/// use namer::strategy::{NamingStrategy, PatternStrategy};
///
/// let schema = ComponentSchema::new(vec![
///     FieldSpec::string("year"),
///     FieldSpec::string("seq"),
/// ]).unwrap();
/// let strategy = PatternStrategy::new(
///     schema,
///     r"report-(?P<year>\d{4})-(?P<seq>\d+)\.csv",
///     "report-{year}-{seq}.csv",
/// ).unwrap();
///
/// let c = strategy.decode_one("report-2024-7.csv").unwrap();
/// assert_eq!(c.get_str("year"), Some("2024"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternStrategy {
    schema: ComponentSchema,
    regex: Regex,
    template: Vec<Piece>,
}

impl PatternStrategy {
    /// Create a strategy. The pattern is matched against the whole name.
    /// Its named groups and the template's placeholders must both cover
    /// exactly the schema's fields, and every field must be required.
    pub fn new(schema: ComponentSchema, pattern: &str, template: &str) -> Result<Self> {
        if let Some(field) = schema.fields().find(|f| !f.required) {
            return Err(NamerError::InvalidSchema(format!(
                "pattern formats need every field; '{}' cannot be optional",
                field.name
            )));
        }

        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        let groups: Vec<&str> = regex.capture_names().flatten().collect();
        check_covers(&schema, &groups, "capture group")?;

        let template = parse_template(template);
        let placeholders: Vec<&str> = template
            .iter()
            .filter_map(|p| match p {
                Piece::Field(name) => Some(name.as_str()),
                Piece::Literal(_) => None,
            })
            .collect();
        check_covers(&schema, &placeholders, "template placeholder")?;

        Ok(Self {
            schema,
            regex,
            template,
        })
    }

    /// A rendered name must decode back to the values it was rendered from.
    /// A match alone is not enough: ambiguous groups can split it elsewhere.
    fn check_decodes(
        &self,
        name: &str,
        rendered: impl Fn(&str) -> Option<String>,
    ) -> ComponentResult<()> {
        let caps = self.regex.captures(name).ok_or_else(|| {
            ComponentError::encoding(format!("rendered name '{}' would not decode", name))
        })?;
        for field in self.schema.fields() {
            let decoded = caps.name(&field.name).map(|m| m.as_str());
            if decoded != rendered(&field.name).as_deref() {
                return Err(ComponentError::encoding(format!(
                    "rendered name '{}' would decode field '{}' as '{}'",
                    name,
                    field.name,
                    decoded.unwrap_or_default()
                )));
            }
        }
        Ok(())
    }

    fn mismatch(&self, name: &str) -> ComponentError {
        ComponentError::decoding(format!(
            "'{}' does not match pattern {}",
            name,
            self.regex.as_str()
        ))
    }
}

/// Every schema field appears in `names`, and nothing else does.
fn check_covers(schema: &ComponentSchema, names: &[&str], what: &str) -> Result<()> {
    if let Some(unknown) = names.iter().find(|n| !schema.contains(n)) {
        return Err(NamerError::InvalidSchema(format!(
            "{} '{}' is not a declared field",
            what, unknown
        )));
    }
    if let Some(field) = schema.fields().find(|f| !names.contains(&f.name.as_str())) {
        return Err(NamerError::InvalidSchema(format!(
            "field '{}' has no {}",
            field.name, what
        )));
    }
    Ok(())
}

fn parse_template(template: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(template) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            pieces.push(Piece::Literal(template[last..whole.start()].to_string()));
        }
        pieces.push(Piece::Field(name.as_str().to_string()));
        last = whole.end();
    }
    if last < template.len() {
        pieces.push(Piece::Literal(template[last..].to_string()));
    }
    pieces
}

impl NamingStrategy for PatternStrategy {
    fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    fn encode_one(&self, components: &Components) -> ComponentResult<String> {
        let mut name = String::new();
        for piece in &self.template {
            match piece {
                Piece::Literal(text) => name.push_str(text),
                Piece::Field(field) => {
                    let value = components.get_present(field).ok_or_else(|| {
                        ComponentError::encoding(format!("field '{}' is missing", field))
                    })?;
                    name.push_str(&value.render());
                }
            }
        }

        self.check_decodes(&name, |field| {
            components.get_present(field).map(|v| v.render().into_owned())
        })?;
        Ok(name)
    }

    fn decode_one(&self, name: &str) -> ComponentResult<Components> {
        let caps = self.regex.captures(name).ok_or_else(|| self.mismatch(name))?;

        let mut components = Components::with_capacity(self.schema.len());
        for field in self.schema.fields() {
            let segment = caps
                .name(&field.name)
                .ok_or_else(|| self.mismatch(name))?;
            components.insert(field.name.as_str(), segment.as_str());
        }
        Ok(components)
    }

    fn encode_many(&self, table: &ComponentTable) -> NameBatch {
        let rows = table.row_count();
        let mut names = vec![String::new(); rows];
        let mut failed = vec![false; rows];
        let mut errors = Vec::new();

        for piece in &self.template {
            match piece {
                Piece::Literal(text) => {
                    for name in &mut names {
                        name.push_str(text);
                    }
                }
                Piece::Field(field) => {
                    let Some(column) = table.column(field) else {
                        return NameBatch::failed(
                            rows,
                            ComponentError::encoding(format!("column '{}' is missing", field)),
                        );
                    };
                    for (row, (name, cell)) in names.iter_mut().zip(column).enumerate() {
                        if failed[row] {
                            continue;
                        }
                        if cell.is_null() {
                            failed[row] = true;
                            errors.push(RowError::new(
                                row,
                                ComponentError::encoding(format!("field '{}' is missing", field)),
                            ));
                            continue;
                        }
                        name.push_str(&cell.render());
                    }
                }
            }
        }

        for (row, name) in names.iter().enumerate() {
            if failed[row] {
                continue;
            }
            let decodes = self.check_decodes(name, |field| {
                table
                    .get(row, field)
                    .filter(|v| !v.is_null())
                    .map(|v| v.render().into_owned())
            });
            if let Err(error) = decodes {
                failed[row] = true;
                errors.push(RowError::new(row, error));
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
        let fields: Vec<&str> = self.schema.fields().map(|f| f.name.as_str()).collect();
        let mut columns: Vec<Vec<Value>> = fields
            .iter()
            .map(|_| Vec::with_capacity(names.len()))
            .collect();
        let mut errors = Vec::new();

        for (row, name) in names.iter().enumerate() {
            let groups = self.regex.captures(name).and_then(|caps| {
                fields
                    .iter()
                    .map(|f| caps.name(f).map(|m| m.as_str()))
                    .collect::<Option<Vec<&str>>>()
            });

            match groups {
                Some(groups) => {
                    for (column, segment) in columns.iter_mut().zip(groups) {
                        column.push(Value::from(segment));
                    }
                }
                None => {
                    errors.push(RowError::new(row, self.mismatch(name)));
                    for column in &mut columns {
                        column.push(Value::Null);
                    }
                }
            }
        }

        let mut table = ComponentTable::new(names.len());
        for (field, column) in fields.into_iter().zip(columns) {
            table.put_column(field, column);
        }
        ComponentBatch::new(table, errors)
    }
}

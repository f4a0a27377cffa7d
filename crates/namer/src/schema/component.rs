//! Component schema: the ordered set of fields an identifier format requires.

use indexmap::IndexMap;

use crate::components::Components;
use crate::error::{ComponentError, ComponentResult, NamerError, Result};

use super::field::FieldSpec;

/// Ordered, uniquely named field declarations for one identifier format.
#[derive(Debug, Clone)]
pub struct ComponentSchema {
    fields: IndexMap<String, FieldSpec>,
}

impl ComponentSchema {
    /// Build a schema, rejecting empty or duplicate field names.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self> {
        if fields.is_empty() {
            return Err(NamerError::InvalidSchema(
                "schema declares no fields".to_string(),
            ));
        }

        let mut by_name = IndexMap::with_capacity(fields.len());
        for field in fields {
            if field.name.is_empty() {
                return Err(NamerError::InvalidSchema(
                    "field name cannot be empty".to_string(),
                ));
            }
            if by_name.contains_key(&field.name) {
                return Err(NamerError::InvalidSchema(format!(
                    "duplicate field '{}'",
                    field.name
                )));
            }
            by_name.insert(field.name.clone(), field);
        }

        Ok(Self { fields: by_name })
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Position of a field in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if every field is required.
    pub fn all_required(&self) -> bool {
        self.fields.values().all(|f| f.required)
    }

    /// Validate one raw mapping, producing a new, coerced mapping.
    ///
    /// Declared fields are checked in order: absent (or null) required
    /// fields fail, absent optional fields are skipped, present values are
    /// coerced then type checked then constrained. Keys the schema does not
    /// declare are rejected afterwards, unless null. The first failure is returned.
    pub fn validate_and_coerce(&self, raw: &Components) -> ComponentResult<Components> {
        let mut out = Components::with_capacity(self.fields.len());

        for field in self.fields.values() {
            match raw.get_present(&field.name) {
                None if field.required => return Err(ComponentError::missing(&field.name)),
                None => {}
                Some(value) => {
                    let value = field.check(value.clone())?;
                    out.insert(field.name.as_str(), value);
                }
            }
        }

        if let Some((unknown, _)) = raw
            .iter()
            .find(|(k, v)| !v.is_null() && !self.fields.contains_key(*k))
        {
            return Err(ComponentError::unknown(unknown));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components;
    use crate::schema::{Coercion, FieldType};

    fn dtid_like() -> ComponentSchema {
        ComponentSchema::new(vec![
            FieldSpec::string("document_id"),
            FieldSpec::string("tabletype"),
            FieldSpec::string("tnum").coerce(Coercion::ToString),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_fields() {
        let err = ComponentSchema::new(vec![FieldSpec::string("a"), FieldSpec::string("a")])
            .unwrap_err();
        assert!(matches!(err, NamerError::InvalidSchema(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn test_rejects_empty_schema() {
        assert!(ComponentSchema::new(Vec::new()).is_err());
        assert!(ComponentSchema::new(vec![FieldSpec::string("")]).is_err());
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let schema = dtid_like();
        assert_eq!(schema.field_names(), vec!["document_id", "tabletype", "tnum"]);
        assert_eq!(schema.position("tnum"), Some(2));
        assert!(schema.all_required());
    }

    #[test]
    fn test_validate_coerces() {
        let schema = dtid_like();
        let raw = components! { "document_id" => "1234", "tabletype" => "t", "tnum" => 3 };
        let out = schema.validate_and_coerce(&raw).unwrap();
        assert_eq!(out.get_str("tnum"), Some("3"));
        // Input mapping is not touched
        assert_eq!(raw.get("tnum").and_then(|v| v.as_i64()), Some(3));
    }

    #[test]
    fn test_validate_missing_field() {
        let schema = dtid_like();
        let raw = components! { "document_id" => "1234", "tabletype" => "some-org_2" };
        assert_eq!(
            schema.validate_and_coerce(&raw),
            Err(ComponentError::missing("tnum"))
        );
    }

    #[test]
    fn test_validate_null_counts_as_missing() {
        let schema = dtid_like();
        let raw = components! {
            "document_id" => "1234",
            "tabletype" => crate::schema::Value::Null,
            "tnum" => "3",
        };
        assert_eq!(
            schema.validate_and_coerce(&raw),
            Err(ComponentError::missing("tabletype"))
        );
    }

    #[test]
    fn test_validate_unknown_field() {
        let schema = dtid_like();
        let raw = components! {
            "document_id" => "1234", "tabletype" => "t", "tnum" => "3", "tnm" => "3"
        };
        assert_eq!(
            schema.validate_and_coerce(&raw),
            Err(ComponentError::unknown("tnm"))
        );
    }

    #[test]
    fn test_validate_type_mismatch_reports_first_field() {
        let schema = dtid_like();
        let raw = components! { "document_id" => 1234, "tabletype" => 7, "tnum" => "3" };
        assert_eq!(
            schema.validate_and_coerce(&raw),
            Err(ComponentError::TypeMismatch {
                field: "document_id".to_string(),
                expected: FieldType::String,
                actual: "integer".to_string(),
            })
        );
    }

    #[test]
    fn test_optional_field_is_omitted_when_absent() {
        let schema = ComponentSchema::new(vec![
            FieldSpec::string("prefix").optional(),
            FieldSpec::string("fname"),
        ])
        .unwrap();

        let out = schema
            .validate_and_coerce(&components! { "fname" => "a.csv" })
            .unwrap();
        assert_eq!(out, components! { "fname" => "a.csv" });
    }
}

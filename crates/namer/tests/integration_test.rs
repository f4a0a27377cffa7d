//! Integration tests for namer.

use std::sync::Arc;

use namer::formats::{DTID_FIELDS, dtid_strategy};
use namer::{
    Coercion, ComponentError, ComponentSchema, ComponentTable, Components, Constraint,
    DelimitedStrategy, FieldSpec, FieldType, FormatOptions, Namer, NamerConfig, NamerError,
    NamingStrategy, PatternStrategy, Value, components, dtid_namer, ss_file_namer,
};

fn dtid() -> Namer {
    dtid_namer().expect("dtid namer")
}

// =============================================================================
// Document-table identifiers
// =============================================================================

#[test]
fn test_dtid_format_concrete() {
    let name = dtid()
        .format(&components! {
            "document_id" => "1234",
            "tabletype" => "some-org_2",
            "tnum" => 3,
        })
        .unwrap();
    assert_eq!(name, "1234/some-org_2/3");
}

#[test]
fn test_dtid_parse_canonicalizes_tnum_to_string() {
    let parsed = dtid().parse("1234/some-org_2/3").unwrap();
    assert_eq!(
        parsed,
        components! { "document_id" => "1234", "tabletype" => "some-org_2", "tnum" => "3" }
    );
    assert_eq!(parsed.get("tnum"), Some(&Value::String("3".into())));
    assert_eq!(parsed.keys().collect::<Vec<_>>(), DTID_FIELDS.to_vec());
}

#[test]
fn test_dtid_integer_and_string_tnum_format_identically() {
    let namer = dtid();
    let as_int = namer
        .format(&components! { "document_id" => "1", "tabletype" => "t", "tnum" => 3 })
        .unwrap();
    let as_str = namer
        .format(&components! { "document_id" => "1", "tabletype" => "t", "tnum" => "3" })
        .unwrap();
    assert_eq!(as_int, as_str);
}

#[test]
fn test_dtid_missing_tnum() {
    let err = dtid()
        .format(&components! { "document_id" => "1234", "tabletype" => "some-org_2" })
        .unwrap_err();
    assert_eq!(err, ComponentError::MissingField { field: "tnum".into() });
}

#[test]
fn test_dtid_unknown_field() {
    let err = dtid()
        .format(&components! {
            "document_id" => "1", "tabletype" => "t", "tnum" => 1, "page" => 2,
        })
        .unwrap_err();
    assert_eq!(err, ComponentError::UnknownField { field: "page".into() });
}

#[test]
fn test_dtid_parse_two_segments_is_decoding_error() {
    let err = dtid().parse("1234/some-org_2").unwrap_err();
    assert!(matches!(err, ComponentError::Decoding { .. }));
    assert_eq!(err.kind(), "decoding_error");
}

#[test]
fn test_dtid_parse_many_keeps_alignment() {
    let batch = dtid().parse_many(&["1234/some-org_2/3", "bad-string"]);

    assert_eq!(batch.len(), 2);
    assert_eq!(
        batch.get(0),
        Some(components! { "document_id" => "1234", "tabletype" => "some-org_2", "tnum" => "3" })
    );
    assert!(batch.get(1).is_none());
    assert!(matches!(batch.error_at(1), Some(ComponentError::Decoding { .. })));
    assert_eq!(batch.table().get(1, "document_id"), Some(&Value::Null));
}

#[test]
fn test_dtid_format_many_keeps_alignment() {
    let table = ComponentTable::from_rows(&[
        components! { "document_id" => "1", "tabletype" => "a", "tnum" => 1 },
        components! { "document_id" => "2", "tabletype" => "b" },
        components! { "document_id" => "3", "tabletype" => "c", "tnum" => "3" },
    ]);
    let batch = dtid().format_many(&table);

    assert_eq!(batch.len(), 3);
    assert_eq!(
        batch.names().collect::<Vec<_>>(),
        vec![Some("1/a/1"), None, Some("3/c/3")]
    );
    assert_eq!(batch.error_at(1), Some(&ComponentError::MissingField { field: "tnum".into() }));
    assert_eq!(batch.valid_count(), 2);
}

// =============================================================================
// Alternative canonical direction
// =============================================================================

fn integer_tnum_namer() -> Namer {
    let schema = ComponentSchema::new(vec![
        FieldSpec::string("document_id"),
        FieldSpec::string("tabletype"),
        FieldSpec::integer("tnum").coerce(Coercion::ToInteger),
    ])
    .unwrap();
    Namer::new(DelimitedStrategy::new(schema, '/').unwrap())
}

#[test]
fn test_integer_canonical_schema_parses_to_integer() {
    let namer = integer_tnum_namer();
    assert_eq!(
        namer.parse("1234/some-org_2/3").unwrap().get("tnum"),
        Some(&Value::Integer(3))
    );
    assert_eq!(
        namer
            .format(&components! { "document_id" => "1234", "tabletype" => "some-org_2", "tnum" => "3" })
            .unwrap(),
        "1234/some-org_2/3"
    );
}

#[test]
fn test_integer_canonical_schema_rejects_non_numeric_segment() {
    let err = integer_tnum_namer().parse("1234/some-org_2/three").unwrap_err();
    assert!(matches!(
        err,
        ComponentError::TypeMismatch { ref field, expected: FieldType::Integer, .. } if field == "tnum"
    ));
}

// =============================================================================
// Construction errors
// =============================================================================

#[test]
fn test_invalid_schemas_fail_at_construction() {
    assert!(matches!(
        ComponentSchema::new(vec![FieldSpec::string("a"), FieldSpec::string("a")]),
        Err(NamerError::InvalidSchema(_))
    ));
    assert!(matches!(ComponentSchema::new(Vec::new()), Err(NamerError::InvalidSchema(_))));
}

// =============================================================================
// Configuration and options
// =============================================================================

#[test]
fn test_forced_components() {
    let config = NamerConfig::new().with_forced("tabletype", "financial");
    let namer = Namer::with_config(dtid_strategy().unwrap(), config).unwrap();

    let name = namer
        .format(&components! { "document_id" => "9", "tnum" => 2 })
        .unwrap();
    assert_eq!(name, "9/financial/2");
}

#[test]
fn test_format_options_prefix_and_defaults() {
    let table = ComponentTable::from_columns([
        ("dtid_document_id", vec![Value::from("1"), Value::from("2")]),
        ("dtid_tnum", vec![Value::from(7), Value::Null]),
    ])
    .unwrap();
    let options = FormatOptions::new()
        .with_column_prefix("dtid_")
        .with_default("tabletype", "bs")
        .with_default("tnum", 1);

    let batch = dtid().format_many_with(&table, &options);
    assert_eq!(batch.get(0), Some("1/bs/7"));
    assert_eq!(batch.get(1), Some("2/bs/1"));
}

#[test]
fn test_rename_changes_one_component() {
    let renamed = dtid()
        .rename("1234/some-org_2/3", &components! { "tabletype" => "other" })
        .unwrap();
    assert_eq!(renamed, "1234/other/3");
}

#[test]
fn test_convert_by_shape() {
    let namer = dtid();
    let c = components! { "document_id" => "1", "tabletype" => "a", "tnum" => "2" };

    assert_eq!(namer.convert(&c).unwrap(), "1/a/2");
    assert_eq!(namer.convert("1/a/2").unwrap(), c);
    assert_eq!(namer.convert(&["1/a/2", "x"][..]).invalid_count(), 1);
}

#[test]
fn test_shared_strategy() {
    let strategy: Arc<dyn NamingStrategy> = Arc::new(dtid_strategy().unwrap());
    let a = Namer::from_shared(Arc::clone(&strategy));
    let b = Namer::from_shared(strategy);

    let c = components! { "document_id" => "1", "tabletype" => "a", "tnum" => "2" };
    assert_eq!(a.format(&c).unwrap(), b.format(&c).unwrap());
}

// =============================================================================
// Other strategies behind the same façade
// =============================================================================

#[test]
fn test_ss_file_behind_namer() {
    let namer = ss_file_namer().unwrap();

    let parsed = namer.parse("plain.csv").unwrap();
    assert_eq!(parsed, components! { "fname" => "plain.csv" });

    let formatted = namer.format(&parsed).unwrap();
    assert!(formatted.starts_with('^') && formatted.ends_with("|plain.csv"));

    let batch = namer.parse_many(&["^abc|x", "y"]);
    assert_eq!(batch.valid_count(), 2);
    assert_eq!(batch.get(0), Some(components! { "prefix" => "abc", "fname" => "x" }));
}

#[test]
fn test_pattern_strategy_behind_namer() {
    let schema = ComponentSchema::new(vec![
        FieldSpec::string("site").constrain(Constraint::exact_length(3)),
        FieldSpec::integer("plate").coerce(Coercion::ToInteger),
    ])
    .unwrap();
    let strategy = PatternStrategy::new(
        schema,
        r"(?P<site>[A-Z]+)-P(?P<plate>\d+)",
        "{site}-P{plate}",
    )
    .unwrap();
    let namer = Namer::new(strategy);

    assert_eq!(
        namer.format(&components! { "site" => "STL", "plate" => "12" }).unwrap(),
        "STL-P12"
    );
    assert_eq!(
        namer.parse("STL-P12").unwrap(),
        components! { "site" => "STL", "plate" => 12 }
    );
    assert!(matches!(
        namer.parse("STLX-P1"),
        Err(ComponentError::ConstraintViolation { .. })
    ));

    let batch = namer.parse_many(&["STL-P1", "nope", "ABCD-P2", "NYC-P3"]);
    assert_eq!(batch.valid_rows(), vec![0, 3]);
    assert!(matches!(batch.error_at(1), Some(ComponentError::Decoding { .. })));
    assert!(matches!(batch.error_at(2), Some(ComponentError::ConstraintViolation { .. })));
}

#[test]
fn test_batch_results_serialize() {
    let batch = dtid().parse_many(&["1/a/2", "bad"]);
    let json = serde_json::to_value(&batch).unwrap();
    assert!(json.is_object());

    let row: Components = serde_json::from_value(serde_json::json!({
        "document_id": "1", "tabletype": "a", "tnum": 2
    }))
    .unwrap();
    assert_eq!(dtid().format(&row).unwrap(), "1/a/2");
}

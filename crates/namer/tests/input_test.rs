//! Tests for reading component tables and names from delimited files.

use std::io::Write;
use tempfile::NamedTempFile;

use namer::input::{CsvConfig, TableReader, write_names, write_table};
use namer::{NamerError, Value, dtid_namer};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

#[test]
fn test_format_table_from_tsv_file() {
    let content = "document_id\ttabletype\ttnum\n\
                   1234\tsome-org_2\t3\n\
                   5678\tbalance\tNA\n\
                   9\tincome\t1\n";
    let file = create_test_file(content);

    let table = TableReader::new().read_table_file(file.path()).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.get(1, "tnum"), Some(&Value::Null));

    let batch = dtid_namer().unwrap().format_many(&table);
    assert_eq!(batch.get(0), Some("1234/some-org_2/3"));
    assert!(batch.error_at(1).is_some());
    assert_eq!(batch.get(2), Some("9/income/1"));

    let mut out = Vec::new();
    write_names(&mut out, &batch).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text.lines().collect::<Vec<_>>(),
        vec![
            "name,error",
            "1234/some-org_2/3,",
            ",missing required field 'tnum'",
            "9/income/1,",
        ]
    );
}

#[test]
fn test_parse_names_from_csv_file() {
    let content = "id,dtid\n1,1234/some-org_2/3\n2,bad-string\n3,\"7/a,b/2\"\n";
    let file = create_test_file(content);

    let names = TableReader::new().read_names_file(file.path(), "dtid").unwrap();
    assert_eq!(names, vec!["1234/some-org_2/3", "bad-string", "7/a,b/2"]);

    let batch = dtid_namer().unwrap().parse_many(&names);
    assert_eq!(batch.valid_rows(), vec![0, 2]);

    let mut out = Vec::new();
    write_table(&mut out, &batch).unwrap();

    let written = TableReader::with_config(CsvConfig::default().with_delimiter(b','))
        .read_table(out.as_slice())
        .unwrap();
    assert_eq!(written.column_names(), vec!["document_id", "tabletype", "tnum", "error"]);
    assert_eq!(written.get(2, "tabletype"), Some(&Value::from("a,b")));
    assert_eq!(written.get(1, "document_id"), Some(&Value::Null));
    assert!(written.get(1, "error").is_some_and(|v| !v.is_null()));
}

#[test]
fn test_missing_file_is_io_error() {
    let err = TableReader::new()
        .read_table_file("/nonexistent/path/to/file.csv")
        .unwrap_err();
    assert!(matches!(err, NamerError::Io { .. }));
}

#[test]
fn test_empty_file_is_empty_data() {
    let file = create_test_file("");
    let err = TableReader::new().read_table_file(file.path()).unwrap_err();
    assert!(matches!(err, NamerError::EmptyData(_)));
}

#[test]
fn test_missing_names_column() {
    let file = create_test_file("a,b\n1,2\n");
    let err = TableReader::new().read_names_file(file.path(), "dtid").unwrap_err();
    assert!(matches!(err, NamerError::MissingColumn(_)));
}

//! CSV/TSV reader with delimiter detection.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::batch::ComponentTable;
use crate::error::{NamerError, Result};
use crate::schema::Value;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the input has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

impl CsvConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }
}

/// Header plus raw cell text, padded to the header width.
struct RawRecords {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Reads component tables and name columns from delimited text.
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    config: CsvConfig,
}

impl TableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Read a whole table. Every cell is a string; empty and NA-like cells
    /// become null.
    pub fn read_table(&self, reader: impl Read) -> Result<ComponentTable> {
        let bytes = read_all(reader)?;
        self.table_from_bytes(&bytes)
    }

    /// Read the raw text of one column.
    pub fn read_names(&self, reader: impl Read, column: &str) -> Result<Vec<String>> {
        let bytes = read_all(reader)?;
        self.names_from_bytes(&bytes, column)
    }

    pub fn read_table_file(&self, path: impl AsRef<Path>) -> Result<ComponentTable> {
        let bytes = read_file(path.as_ref())?;
        self.table_from_bytes(&bytes)
    }

    pub fn read_names_file(&self, path: impl AsRef<Path>, column: &str) -> Result<Vec<String>> {
        let bytes = read_file(path.as_ref())?;
        self.names_from_bytes(&bytes, column)
    }

    fn table_from_bytes(&self, bytes: &[u8]) -> Result<ComponentTable> {
        let raw = self.parse_bytes(bytes)?;
        let mut table = ComponentTable::new(raw.rows.len());

        for (col, header) in raw.headers.iter().enumerate() {
            if table.has_column(header) {
                return Err(NamerError::InvalidSchema(format!(
                    "duplicate column '{}'",
                    header
                )));
            }
            let cells = raw
                .rows
                .iter()
                .map(|row| {
                    let cell = &row[col];
                    if is_null_value(cell) {
                        Value::Null
                    } else {
                        Value::String(cell.clone())
                    }
                })
                .collect();
            table.add_column(header.as_str(), cells)?;
        }
        Ok(table)
    }

    fn names_from_bytes(&self, bytes: &[u8], column: &str) -> Result<Vec<String>> {
        let raw = self.parse_bytes(bytes)?;
        let col = raw
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| NamerError::MissingColumn(column.to_string()))?;
        Ok(raw.rows.into_iter().map(|mut row| row.swap_remove(col)).collect())
    }

    fn parse_bytes(&self, bytes: &[u8]) -> Result<RawRecords> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if self.config.max_rows.is_some_and(|max| row_idx >= max) {
                break;
            }
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        }

        if !self.config.has_header {
            let width = rows
                .first()
                .map(Vec::len)
                .ok_or_else(|| NamerError::EmptyData("No data rows found".to_string()))?;
            headers = (0..width).map(|i| format!("column_{}", i + 1)).collect();
        }

        if headers.is_empty() {
            return Err(NamerError::EmptyData("No columns found".to_string()));
        }

        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }

        debug!(
            rows = rows.len(),
            columns = width,
            delimiter = %(delimiter as char).escape_default(),
            "read delimited input"
        );
        Ok(RawRecords { headers, rows })
    }
}

fn read_all(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(NamerError::Read)?;
    Ok(bytes)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| NamerError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Whether a cell stands for a missing value.
pub(crate) fn is_null_value(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nil")
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(NamerError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts beat higher but ragged ones. Ties go to tab.
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"a,b,c\n1,2,3\n4,5,6").unwrap(), b',');
        assert_eq!(detect_delimiter(b"a\tb\tc\n1\t2\t3").unwrap(), b'\t');
        assert_eq!(detect_delimiter(b"a;b\n1;2").unwrap(), b';');
        assert!(detect_delimiter(b"\n\n").is_err());
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("connection reset"))
        }
    }

    #[test]
    fn test_stream_failure_is_read_error() {
        let err = TableReader::new().read_table(BrokenReader).unwrap_err();
        assert!(matches!(err, NamerError::Read(ref e) if e.to_string() == "connection reset"));

        let err = TableReader::new()
            .read_names(BrokenReader, "dtid")
            .unwrap_err();
        assert!(matches!(err, NamerError::Read(_)));
    }

    #[test]
    fn test_quoted_delimiters_are_ignored() {
        assert_eq!(count_delimiter_in_line(r#""a,b",c"#, b','), 1);
    }

    #[test]
    fn test_is_null_value() {
        assert!(is_null_value(""));
        assert!(is_null_value(" NA "));
        assert!(is_null_value("n/a"));
        assert!(is_null_value("NULL"));
        assert!(!is_null_value("0"));
        assert!(!is_null_value("some-org_2"));
    }

    #[test]
    fn test_read_table_nulls_and_strings() {
        let data = "document_id,tabletype,tnum\n1234,some-org_2,3\n5,,NA\n";
        let table = TableReader::new().read_table(data.as_bytes()).unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.get(0, "tnum"), Some(&Value::from("3")));
        assert_eq!(table.get(1, "tabletype"), Some(&Value::Null));
        assert_eq!(table.get(1, "tnum"), Some(&Value::Null));
    }

    #[test]
    fn test_read_table_pads_short_rows() {
        let data = "a,b,c\n1,2\n";
        let table = TableReader::with_config(CsvConfig::default().with_delimiter(b','))
            .read_table(data.as_bytes())
            .unwrap();
        assert_eq!(table.get(0, "c"), Some(&Value::Null));
    }

    #[test]
    fn test_read_table_duplicate_header() {
        let data = "a,a\n1,2\n";
        assert!(matches!(
            TableReader::new().read_table(data.as_bytes()),
            Err(NamerError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_read_names_keeps_raw_text() {
        let data = "id\tname\n1\t1234/a/3\n2\t\n";
        let names = TableReader::new().read_names(data.as_bytes(), "name").unwrap();
        assert_eq!(names, vec!["1234/a/3".to_string(), String::new()]);

        let err = TableReader::new().read_names(data.as_bytes(), "nope").unwrap_err();
        assert!(matches!(err, NamerError::MissingColumn(ref c) if c == "nope"));
    }

    #[test]
    fn test_no_header_and_max_rows() {
        let data = "x|y\nz|w\nq|r\n";
        let config = CsvConfig::default().without_header().with_max_rows(2);
        let table = TableReader::with_config(config).read_table(data.as_bytes()).unwrap();

        assert_eq!(table.column_names(), vec!["column_1", "column_2"]);
        assert_eq!(table.row_count(), 2);
    }
}

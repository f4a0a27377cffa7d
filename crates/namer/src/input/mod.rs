//! Tabular input and output: CSV/TSV files in, aligned results out.

mod reader;
mod writer;

pub use reader::{CsvConfig, TableReader};
pub use writer::{write_diagnostics_json, write_names, write_table};

//! Writers for batch results. Every output row keeps its input position and
//! carries its diagnostic in a trailing `error` column.

use std::io::Write;

use crate::batch::{ComponentBatch, NameBatch, RowError};
use crate::error::Result;

const ERROR_COLUMN: &str = "error";

/// Write formatted names as a two-column CSV: `name,error`.
pub fn write_names(writer: impl Write, batch: &NameBatch) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["name", ERROR_COLUMN])?;

    for outcome in batch.iter() {
        match outcome {
            Ok(name) => out.write_record([name, ""])?,
            Err(error) => out.write_record(["", error.to_string().as_str()])?,
        }
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write parsed components as CSV, one column per field plus `error`.
/// Null cells are written empty.
pub fn write_table(writer: impl Write, batch: &ComponentBatch) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let table = batch.table();

    let mut header: Vec<&str> = table.column_names();
    header.push(ERROR_COLUMN);
    out.write_record(&header)?;

    for row in 0..batch.len() {
        let mut record: Vec<String> = table
            .columns()
            .map(|(_, cells)| {
                if cells[row].is_null() {
                    String::new()
                } else {
                    cells[row].render().into_owned()
                }
            })
            .collect();
        record.push(batch.error_at(row).map(|e| e.to_string()).unwrap_or_default());
        out.write_record(&record)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write per-row diagnostics as a pretty-printed JSON array.
pub fn write_diagnostics_json(writer: impl Write, errors: &[RowError]) -> Result<()> {
    serde_json::to_writer_pretty(writer, errors)?;
    Ok(())
}

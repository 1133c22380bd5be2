// TeleSift - core/export.rs
//
// CSV and JSON serialisation of one table.
// Core layer: writes to any Write trait object. File handling lives in
// app::sink.

use crate::core::model::{Row, Table};
use crate::util::error::SinkError;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Reject a table whose rows do not line up with its column list.
pub fn check_row_widths(table: &Table) -> Result<(), SinkError> {
    let expected = table.column_names().len();
    match table.rows.iter().find(|r| r.len() != expected) {
        Some(row) => Err(SinkError::RowWidth {
            table: table.name.clone(),
            expected,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}

/// Write `table` as CSV: a header record, then one record per row.
/// Null cells are written as empty fields.
pub fn write_csv<W: Write>(table: &Table, writer: W, path: &Path) -> Result<usize, SinkError> {
    check_row_widths(table)?;
    let csv_err = |e| SinkError::Csv {
        path: path.to_path_buf(),
        source: e,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(table.column_names())
        .map_err(csv_err)?;

    for row in &table.rows {
        csv_writer
            .write_record(row.cells.iter().map(|c| c.as_deref().unwrap_or("")))
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| SinkError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(table.rows.len())
}

#[derive(Serialize)]
struct JsonTable<'a> {
    table: &'a str,
    schema_version: u32,
    columns: Vec<String>,
    rows: &'a [Row],
}

/// Write `table` as a single JSON document. Null cells stay `null`.
/// The writer is flushed before returning.
pub fn write_json<W: Write>(table: &Table, mut writer: W, path: &Path) -> Result<usize, SinkError> {
    check_row_widths(table)?;
    let doc = JsonTable {
        table: &table.name,
        schema_version: table.schema.version,
        columns: table.column_names(),
        rows: &table.rows,
    };
    serde_json::to_writer_pretty(&mut writer, &doc).map_err(|e| SinkError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(|e| SinkError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(table.rows.len())
}

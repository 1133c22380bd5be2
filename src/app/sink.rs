// TeleSift - app/sink.rs
//
// Record sinks: where assembled tables go.
//
// Every sink has drop-and-recreate semantics: writing a table replaces
// whatever an earlier run wrote under the same name.

use crate::core::export;
use crate::core::model::Table;
use crate::util::error::SinkError;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Accepts whole tables of rows.
pub trait RecordSink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError>;
}

fn create_file(path: &Path) -> Result<BufWriter<File>, SinkError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| SinkError::Io {
            path: path.to_path_buf(),
            source: e,
        })
}

fn ensure_dir(dir: &Path) -> Result<(), SinkError> {
    std::fs::create_dir_all(dir).map_err(|e| SinkError::Io {
        path: dir.to_path_buf(),
        source: e,
    })
}

// =============================================================================
// CSV directory
// =============================================================================

#[derive(Serialize)]
struct SchemaColumn<'a> {
    name: &'a str,
    family: &'a str,
    kind: &'static str,
}

/// Sidecar written next to each CSV so the column layout can be checked
/// without opening the data.
#[derive(Serialize)]
struct SchemaSidecar<'a> {
    table: &'a str,
    schema_version: u32,
    header_columns: &'static [&'static str],
    columns: Vec<SchemaColumn<'a>>,
    rows: usize,
    generated_at: String,
}

/// One `<table>.csv` plus `<table>.schema.json` per table.
#[derive(Debug, Clone)]
pub struct CsvDirSink {
    pub dir: PathBuf,
}

impl CsvDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }

    pub fn schema_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.schema.json"))
    }

    fn write_sidecar(&self, table: &Table) -> Result<(), SinkError> {
        let path = self.schema_path(&table.name);
        let sidecar = SchemaSidecar {
            table: &table.name,
            schema_version: table.schema.version,
            header_columns: &crate::util::constants::HEADER_COLUMNS,
            columns: table
                .schema
                .families
                .iter()
                .flat_map(|f| {
                    f.columns.iter().map(move |c| SchemaColumn {
                        name: c,
                        family: &f.key,
                        kind: f.kind.label(),
                    })
                })
                .collect(),
            rows: table.rows.len(),
            generated_at: chrono::Utc::now().to_rfc3339(),
        };
        let mut writer = create_file(&path)?;
        serde_json::to_writer_pretty(&mut writer, &sidecar).map_err(|e| SinkError::Json {
            path: path.clone(),
            source: e,
        })?;
        writer.flush().map_err(|e| SinkError::Io { path, source: e })
    }
}

impl RecordSink for CsvDirSink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        ensure_dir(&self.dir)?;
        let path = self.table_path(&table.name);
        let rows = export::write_csv(table, create_file(&path)?, &path)?;
        self.write_sidecar(table)?;
        tracing::info!(table = %table.name, rows, file = %path.display(), "Table written");
        Ok(())
    }
}

// =============================================================================
// JSON directory
// =============================================================================

/// One `<table>.json` per table.
#[derive(Debug, Clone)]
pub struct JsonSink {
    pub dir: PathBuf,
}

impl JsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.json"))
    }
}

impl RecordSink for JsonSink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        ensure_dir(&self.dir)?;
        let path = self.table_path(&table.name);
        let rows = export::write_json(table, create_file(&path)?, &path)?;
        tracing::info!(table = %table.name, rows, file = %path.display(), "Table written");
        Ok(())
    }
}

// =============================================================================
// Memory
// =============================================================================

/// Keeps written tables in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub tables: Vec<Table>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl RecordSink for MemorySink {
    fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        export::check_row_widths(table)?;
        self.tables.retain(|t| t.name != table.name);
        self.tables.push(table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ColumnFamily, ColumnSchema, Row, ValueKind};

    fn table(name: &str, values: &[&str]) -> Table {
        let schema = ColumnSchema {
            version: 1,
            families: vec![ColumnFamily {
                key: "att".to_string(),
                kind: ValueKind::Numeric,
                columns: vec!["A1".to_string()],
            }],
        };
        let mut t = Table::new(name, schema);
        for v in values {
            t.rows.push(Row {
                cells: vec![
                    Some("2024-01-01 00:00:00".into()),
                    Some("000".into()),
                    Some("1".into()),
                    Some("INFO".into()),
                    Some((*v).to_string()),
                ],
            });
        }
        t
    }

    #[test]
    fn test_csv_sink_recreates_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvDirSink::new(dir.path().join("out"));

        sink.write_table(&table("T", &["1", "2", "3"])).unwrap();
        sink.write_table(&table("T", &["9"])).unwrap();

        let csv = std::fs::read_to_string(sink.table_path("T")).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.ends_with("9\n"));

        let schema: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sink.schema_path("T")).unwrap())
                .unwrap();
        assert_eq!(schema["table"], "T");
        assert_eq!(schema["rows"], 1);
        assert_eq!(schema["columns"][0]["name"], "A1");
        assert_eq!(schema["columns"][0]["kind"], "numeric");
        assert!(schema["generated_at"].as_str().is_some());
    }

    #[test]
    fn test_json_sink_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = JsonSink::new(dir.path());
        sink.write_table(&table("T", &["5"])).unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sink.table_path("T")).unwrap())
                .unwrap();
        assert_eq!(doc["rows"][0][4], "5");
    }

    #[test]
    fn test_memory_sink_replaces_by_name() {
        let mut sink = MemorySink::new();
        sink.write_table(&table("T", &["1", "2"])).unwrap();
        sink.write_table(&table("U", &["1"])).unwrap();
        sink.write_table(&table("T", &["3"])).unwrap();
        assert_eq!(sink.tables.len(), 2);
        assert_eq!(sink.table("T").unwrap().rows.len(), 1);
    }
}

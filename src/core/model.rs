// TeleSift - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Log Entry (output of the header line parser)
// =============================================================================

/// One telemetry line that matched the header grammar.
///
/// All fields are kept as the raw captured text. Nothing is normalised here;
/// downstream stages decide what the tail means for their subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// 1-based line number in the decoded text.
    pub line_number: u64,

    /// `YYYY-MM-DD HH:MM:SS` as written by the controller.
    pub datetime: String,

    /// 3-digit code following the comma (milliseconds field on most controllers).
    pub code: String,

    /// Bracketed channel id identifying the emitting component.
    pub channel_id: String,

    /// Severity token (INFO, WARN, ...), verbatim.
    pub level: String,

    /// Leading word of `data`, up to the first `:`, whitespace or `-`.
    /// Display only; extraction never strips it from `data`.
    pub message: String,

    /// `body` without its leading `:`, whitespace or `-` run, trimmed.
    /// Extraction and the `require_data` rule work on this.
    pub data: String,

    /// The full text after the dash run.
    pub body: String,
}

impl LogEntry {
    /// Canonical single-line rendering. Parsing the result with
    /// `header::parse_line` yields an equal entry.
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{} [{}] {} - {}",
            self.datetime, self.code, self.channel_id, self.level, self.body
        )
    }
}

// =============================================================================
// Extracted field groups
// =============================================================================

/// The two shapes a telemetry field can take, plus free text.
///
/// Measurements and status-token presence are deliberately distinct: for a
/// token family only the count and order of recognised tokens matter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum FieldValues {
    /// Raw comma-separated measurements, trimmed, empties dropped.
    Numeric(Vec<String>),
    /// Recognised status tokens in order of appearance (e.g. "lck", "lc").
    Tokens(Vec<String>),
    /// A single free-text value (event messages).
    Text(String),
}

impl FieldValues {
    /// Number of positional values carried.
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Numeric(v) | FieldValues::Tokens(v) => v.len(),
            FieldValues::Text(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at position `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        match self {
            FieldValues::Numeric(v) | FieldValues::Tokens(v) => v.get(index).map(String::as_str),
            FieldValues::Text(t) => (index == 0).then_some(t.as_str()),
        }
    }
}

/// One key occurrence (or frequency block) found in an entry's data tail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldGroup {
    /// Lower-cased key (`att`, `lock`, `2ghz`, ...).
    pub key: String,
    pub values: FieldValues,
}

// =============================================================================
// Schemas
// =============================================================================

/// How a family's raw value-run is decoded.
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// Split on commas.
    Numeric,
    /// Count occurrences of recognised status tokens.
    Tokens { pattern: regex::Regex },
    /// Keep as one text cell.
    Text,
}

impl ValueKind {
    pub fn label(&self) -> &'static str {
        match self {
            ValueKind::Numeric => "numeric",
            ValueKind::Tokens { .. } => "tokens",
            ValueKind::Text => "text",
        }
    }
}

/// A named group of same-type measurements, one column per physical channel.
#[derive(Debug, Clone)]
pub struct ColumnFamily {
    /// Lower-cased key this family is filled from.
    pub key: String,
    pub kind: ValueKind,
    /// Ordered column names; the slot count is `columns.len()`.
    pub columns: Vec<String>,
}

impl ColumnFamily {
    pub fn slots(&self) -> usize {
        self.columns.len()
    }
}

/// The fixed, versioned column layout of one table (header columns excluded).
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub version: u32,
    pub families: Vec<ColumnFamily>,
}

impl ColumnSchema {
    /// Number of payload columns.
    pub fn width(&self) -> usize {
        self.families.iter().map(ColumnFamily::slots).sum()
    }

    /// Payload column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.families
            .iter()
            .flat_map(|f| f.columns.iter().map(String::as_str))
    }

    /// Header columns followed by payload columns: the full row layout.
    pub fn row_columns(&self) -> Vec<String> {
        constants::HEADER_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.columns().map(str::to_string))
            .collect()
    }

    pub fn family(&self, key: &str) -> Option<&ColumnFamily> {
        self.families.iter().find(|f| f.key == key)
    }
}

// =============================================================================
// Rows and tables
// =============================================================================

/// One output row: cells aligned with `ColumnSchema::row_columns`.
///
/// Always `HEADER_COLUMNS.len() + schema.width()` cells long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    pub cells: Vec<Option<String>>,
}

impl Row {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// A named batch of rows sharing one schema, handed whole to the sink.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub schema: ColumnSchema,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: ColumnSchema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.row_columns()
    }

    /// Cell value by row index and column name. `None` for null cells and
    /// unknown columns alike.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.cells.get(idx)?.as_deref()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        constants::HEADER_COLUMNS
            .iter()
            .copied()
            .chain(self.schema.columns())
            .position(|c| c == column)
    }
}

// =============================================================================
// Subsystem descriptor (runtime representation)
// =============================================================================

/// Which body extraction a subsystem uses and where its rows go.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// `key=value-run` pairs into one table.
    KeyValue {
        table: String,
        schema: ColumnSchema,
        /// Compiled `(key1|key2|...)=(value-run)` scanner.
        pattern: regex::Regex,
    },
    /// `<N>ghz<payload>` blocks, one table per declared band.
    FrequencyBlock { bands: Vec<Band> },
    /// The whole entry body as a single text column.
    Message { table: String, schema: ColumnSchema },
}

impl Extraction {
    pub fn label(&self) -> &'static str {
        match self {
            Extraction::KeyValue { .. } => "key_value",
            Extraction::FrequencyBlock { .. } => "frequency_block",
            Extraction::Message { .. } => "message",
        }
    }

    /// Names of every table this extraction can produce, in output order.
    pub fn table_names(&self) -> Vec<&str> {
        match self {
            Extraction::KeyValue { table, .. } | Extraction::Message { table, .. } => {
                vec![table.as_str()]
            }
            Extraction::FrequencyBlock { bands } => {
                bands.iter().map(|b| b.table.as_str()).collect()
            }
        }
    }
}

/// One frequency band of the front-end receiver.
#[derive(Debug, Clone)]
pub struct Band {
    /// Lower-cased band tag, e.g. `22ghz`.
    pub name: String,
    pub table: String,
    /// Single-family schema keyed by `name`.
    pub schema: ColumnSchema,
}

/// Lane selection rules applied before extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneFilter {
    /// Required channel id. `None` accepts every channel.
    pub channel: Option<String>,
    /// Accepted severity tokens (case-insensitive). Empty accepts all.
    pub levels: Vec<String>,
    /// Drop entries whose data tail is empty.
    pub require_data: bool,
}

/// A compiled subsystem descriptor: everything that distinguishes one
/// controller's lane from another.
#[derive(Debug, Clone)]
pub struct Subsystem {
    /// Unique id (e.g. "kdown").
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub filter: LaneFilter,
    pub extraction: Extraction,
    /// Whether this is a built-in descriptor (true) or user-defined (false).
    pub is_builtin: bool,
}

// TeleSift - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Only edge failures live here: descriptor loading, log source transfer,
// sink writes and configuration. Malformed telemetry never becomes an error;
// the extraction core degrades to fewer or emptier rows instead.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all TeleSift operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum TeleSiftError {
    /// Descriptor loading or validation failed.
    Descriptor(DescriptorError),

    /// Fetching the raw telemetry buffer failed.
    Source(SourceError),

    /// Writing a table to the record sink failed.
    Sink(SinkError),

    /// Configuration loading or validation failed.
    Config(ConfigError),
}

impl fmt::Display for TeleSiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Descriptor(e) => write!(f, "Descriptor error: {e}"),
            Self::Source(e) => write!(f, "Log source error: {e}"),
            Self::Sink(e) => write!(f, "Record sink error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
        }
    }
}

impl std::error::Error for TeleSiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Descriptor(e) => Some(e),
            Self::Source(e) => Some(e),
            Self::Sink(e) => Some(e),
            Self::Config(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor errors
// ---------------------------------------------------------------------------

/// Errors related to subsystem descriptor loading and validation.
#[derive(Debug)]
pub enum DescriptorError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Descriptor file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty.
    MissingField {
        subsystem_id: String,
        field: &'static str,
    },

    /// A field holds a value that cannot be used.
    InvalidValue {
        subsystem_id: String,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A table would contain the same column twice.
    DuplicateColumn {
        subsystem_id: String,
        table: String,
        column: String,
    },

    /// Two subsystems write to the same output table.
    DuplicateTable {
        subsystem_id: String,
        table: String,
        owner: String,
    },

    /// A generated regex failed to compile.
    InvalidRegex {
        subsystem_id: String,
        pattern: String,
        source: regex::Error,
    },

    /// Maximum number of descriptors exceeded.
    TooManyDescriptors { count: usize, max: usize },

    /// I/O error reading a descriptor file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Descriptor '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField {
                subsystem_id,
                field,
            } => write!(
                f,
                "Subsystem '{subsystem_id}': missing required field '{field}'"
            ),
            Self::InvalidValue {
                subsystem_id,
                field,
                value,
                reason,
            } => write!(
                f,
                "Subsystem '{subsystem_id}': invalid value '{value}' for '{field}': {reason}"
            ),
            Self::DuplicateColumn {
                subsystem_id,
                table,
                column,
            } => write!(
                f,
                "Subsystem '{subsystem_id}': column '{column}' appears twice in table '{table}'"
            ),
            Self::DuplicateTable {
                subsystem_id,
                table,
                owner,
            } => write!(
                f,
                "Subsystem '{subsystem_id}': table '{table}' is already written by '{owner}'"
            ),
            Self::InvalidRegex {
                subsystem_id,
                pattern,
                source,
            } => write!(
                f,
                "Subsystem '{subsystem_id}': generated regex '{pattern}' is invalid: {source}"
            ),
            Self::TooManyDescriptors { count, max } => {
                write!(f, "Too many descriptors loaded ({count}), maximum is {max}")
            }
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading descriptor '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for DescriptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DescriptorError> for TeleSiftError {
    fn from(e: DescriptorError) -> Self {
        Self::Descriptor(e)
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors raised while acquiring the raw telemetry buffer.
///
/// Transfers are all-or-nothing: any of these means the run has no input,
/// never a partial one.
#[derive(Debug)]
pub enum SourceError {
    /// The address could not be resolved to a socket address.
    Resolve { address: String, source: io::Error },

    /// TCP connection to the controller PC failed.
    Connect { address: String, source: io::Error },

    /// The stream failed before the peer closed it.
    Read {
        address: String,
        bytes_received: usize,
        source: io::Error,
    },

    /// The peer sent more than the configured maximum.
    TooLarge { address: String, max_bytes: usize },

    /// A captured dump could not be read from disk.
    File { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve { address, source } => {
                write!(f, "Cannot resolve '{address}': {source}")
            }
            Self::Connect { address, source } => {
                write!(f, "Cannot connect to '{address}': {source}")
            }
            Self::Read {
                address,
                bytes_received,
                source,
            } => write!(
                f,
                "Transfer from '{address}' failed after {bytes_received} bytes: {source}"
            ),
            Self::TooLarge { address, max_bytes } => write!(
                f,
                "Transfer from '{address}' exceeded maximum of {max_bytes} bytes. \
                 Increase [source] max_bytes in config."
            ),
            Self::File { path, source } => {
                write!(f, "Cannot read dump '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve { source, .. } => Some(source),
            Self::Connect { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
            Self::File { source, .. } => Some(source),
            Self::TooLarge { .. } => None,
        }
    }
}

impl From<SourceError> for TeleSiftError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors related to writing tables to the record sink.
#[derive(Debug)]
pub enum SinkError {
    /// I/O error creating or writing an output file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A row does not match the width of its table's column list.
    RowWidth {
        table: String,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Sink I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV write error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON write error '{}': {source}", path.display())
            }
            Self::RowWidth {
                table,
                expected,
                actual,
            } => write!(
                f,
                "Table '{table}': row has {actual} cells, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::RowWidth { .. } => None,
        }
    }
}

impl From<SinkError> for TeleSiftError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// An encoding label is not known to the decoder.
    UnknownEncoding { label: String },

    /// A subsystem selection pattern is not a valid glob.
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEncoding { label } => {
                write!(f, "Encoding label '{label}' is not recognised")
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid subsystem pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            Self::UnknownEncoding { .. } => None,
        }
    }
}

impl From<ConfigError> for TeleSiftError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for TeleSift results.
pub type Result<T> = std::result::Result<T, TeleSiftError>;

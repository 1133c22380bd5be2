// TeleSift - platform/config.rs
//
// Platform-specific configuration, directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for TeleSift configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/telesift/ or %APPDATA%\TeleSift\config\)
    pub config_dir: PathBuf,

    /// User descriptor directory (e.g. ~/.config/telesift/subsystems/)
    pub user_descriptors_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let user_descriptors_dir = config_dir.join(constants::DESCRIPTORS_DIR_NAME);

            tracing::debug!(
                config = %config_dir.display(),
                descriptors = %user_descriptors_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                user_descriptors_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                user_descriptors_dir: fallback.join(constants::DESCRIPTORS_DIR_NAME),
                config_dir: fallback,
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads
/// with an older binary.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub source: SourceSection,
    pub decoding: DecodingSection,
    pub output: OutputSection,
    pub subsystems: SubsystemsSection,
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// `host:port` of the controller PC.
    pub address: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    /// Maximum accepted transfer size in bytes.
    pub max_bytes: Option<usize>,
}

/// `[decoding]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DecodingSection {
    pub primary: Option<String>,
    pub fallback: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "csv" or "json".
    pub format: Option<String>,
    pub directory: Option<String>,
}

/// `[subsystems]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SubsystemsSection {
    /// Additional descriptor directory.
    pub descriptor_directory: Option<String>,
    /// Glob patterns over subsystem ids; empty runs everything.
    pub enabled: Option<Vec<String>>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Sink file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Source --
    pub source_address: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub max_bytes: usize,

    // -- Decoding --
    pub primary_encoding: String,
    pub fallback_encoding: String,

    // -- Output --
    pub output_format: OutputFormat,
    pub output_dir: PathBuf,

    // -- Subsystems --
    pub descriptor_dir: Option<PathBuf>,
    pub enabled: Vec<String>,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_address: constants::DEFAULT_SOURCE_ADDRESS.to_string(),
            connect_timeout_ms: constants::DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: constants::DEFAULT_READ_TIMEOUT_MS,
            max_bytes: constants::DEFAULT_MAX_TRANSFER_BYTES,
            primary_encoding: constants::DEFAULT_PRIMARY_ENCODING.to_string(),
            fallback_encoding: constants::DEFAULT_FALLBACK_ENCODING.to_string(),
            output_format: OutputFormat::Csv,
            output_dir: PathBuf::from(constants::DEFAULT_OUTPUT_DIR),
            descriptor_dir: None,
            enabled: Vec::new(),
            log_level: None,
        }
    }
}

/// Load and validate `config.toml` at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unparseable, returns defaults with a warning; the run still
/// proceeds but the user is told.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let msg = format!(
                "Could not read config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                config_path.display()
            );
            tracing::warn!("{}", msg);
            return (AppConfig::default(), vec![msg]);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    validate(raw)
}

/// Validate each field against named constants, accumulating all warnings.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Source --
    if let Some(address) = raw.source.address {
        let address = address.trim();
        if address.rsplit_once(':').is_some_and(|(host, port)| {
            !host.is_empty() && port.parse::<u16>().is_ok()
        }) {
            config.source_address = address.to_string();
        } else {
            warnings.push(format!(
                "[source] address = \"{address}\" is not HOST:PORT. Using default ({}).",
                constants::DEFAULT_SOURCE_ADDRESS,
            ));
        }
    }

    let timeout_range = constants::MIN_TIMEOUT_MS..=constants::MAX_TIMEOUT_MS;
    if let Some(ms) = raw.source.connect_timeout_ms {
        if timeout_range.contains(&ms) {
            config.connect_timeout_ms = ms;
        } else {
            warnings.push(format!(
                "[source] connect_timeout_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_TIMEOUT_MS,
                constants::MAX_TIMEOUT_MS,
                constants::DEFAULT_CONNECT_TIMEOUT_MS,
            ));
        }
    }
    if let Some(ms) = raw.source.read_timeout_ms {
        if timeout_range.contains(&ms) {
            config.read_timeout_ms = ms;
        } else {
            warnings.push(format!(
                "[source] read_timeout_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_TIMEOUT_MS,
                constants::MAX_TIMEOUT_MS,
                constants::DEFAULT_READ_TIMEOUT_MS,
            ));
        }
    }

    if let Some(bytes) = raw.source.max_bytes {
        if (1..=constants::ABSOLUTE_MAX_TRANSFER_BYTES).contains(&bytes) {
            config.max_bytes = bytes;
        } else {
            warnings.push(format!(
                "[source] max_bytes = {bytes} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_TRANSFER_BYTES,
                constants::DEFAULT_MAX_TRANSFER_BYTES,
            ));
        }
    }

    // -- Decoding --
    for (field, value, target, default) in [
        (
            "primary",
            raw.decoding.primary,
            &mut config.primary_encoding,
            constants::DEFAULT_PRIMARY_ENCODING,
        ),
        (
            "fallback",
            raw.decoding.fallback,
            &mut config.fallback_encoding,
            constants::DEFAULT_FALLBACK_ENCODING,
        ),
    ] {
        let Some(label) = value else { continue };
        if encoding_rs::Encoding::for_label(label.trim().as_bytes()).is_some() {
            *target = label.trim().to_string();
        } else {
            warnings.push(format!(
                "[decoding] {field} = \"{label}\" is not a known encoding label. Using default ({default}).",
            ));
        }
    }

    // -- Output --
    if let Some(ref format) = raw.output.format {
        match OutputFormat::from_label(format) {
            Some(f) => config.output_format = f,
            None => warnings.push(format!(
                "[output] format = \"{format}\" is not recognised. Expected \"csv\" or \"json\". Using default (csv).",
            )),
        }
    }
    if let Some(dir) = raw.output.directory {
        if dir.trim().is_empty() {
            warnings.push(format!(
                "[output] directory is empty. Using default ({}).",
                constants::DEFAULT_OUTPUT_DIR
            ));
        } else {
            config.output_dir = PathBuf::from(dir.trim());
        }
    }

    // -- Subsystems --
    if let Some(dir) = raw.subsystems.descriptor_directory {
        if !dir.trim().is_empty() {
            config.descriptor_dir = Some(PathBuf::from(dir.trim()));
        }
    }
    if let Some(enabled) = raw.subsystems.enabled {
        for pattern in enabled {
            match glob::Pattern::new(&pattern) {
                Ok(_) => config.enabled.push(pattern),
                Err(e) => warnings.push(format!(
                    "[subsystems] enabled pattern \"{pattern}\" is invalid ({e}). Ignoring it.",
                )),
            }
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert!(warnings.is_empty());
        assert_eq!(config.source_address, constants::DEFAULT_SOURCE_ADDRESS);
        assert_eq!(config.output_format, OutputFormat::Csv);
    }

    #[test]
    fn test_valid_config() {
        let (_dir, path) = write_config(
            r#"
[source]
address = "10.0.0.7:7000"
read_timeout_ms = 5000
max_bytes = 1048576

[decoding]
primary = "euc-kr"
fallback = "utf-8"

[output]
format = "json"
directory = "out"

[subsystems]
descriptor_directory = "/etc/telesift/subsystems"
enabled = ["*down", "event"]

[logging]
level = "debug"

[future]
unknown = true
"#,
        );
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.source_address, "10.0.0.7:7000");
        assert_eq!(config.read_timeout_ms, 5000);
        assert_eq!(config.connect_timeout_ms, constants::DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(config.max_bytes, 1_048_576);
        assert_eq!(config.primary_encoding, "euc-kr");
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.enabled, vec!["*down", "event"]);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_invalid_values_fall_back_with_warnings() {
        let (_dir, path) = write_config(
            r#"
[source]
address = "no-port"
connect_timeout_ms = 1

[decoding]
primary = "klingon"

[output]
format = "xml"

[logging]
level = "loud"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 5);
        assert_eq!(config.source_address, constants::DEFAULT_SOURCE_ADDRESS);
        assert_eq!(config.connect_timeout_ms, constants::DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(config.primary_encoding, constants::DEFAULT_PRIMARY_ENCODING);
        assert_eq!(config.output_format, OutputFormat::Csv);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unparseable_file_gives_defaults_and_warning() {
        let (_dir, path) = write_config("[source\naddress=");
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert_eq!(config.max_bytes, constants::DEFAULT_MAX_TRANSFER_BYTES);
    }
}

// TeleSift - core/descriptor.rs
//
// Subsystem descriptor loading and validation.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::descriptor_mgr which feeds content here.
//
// A descriptor is the whole difference between one controller's lane and
// another: channel id, level filter, extraction variant, table names and
// the ordered column families. Adding a controller means adding a TOML
// file, not code.

use crate::core::model::{
    Band, ColumnFamily, ColumnSchema, Extraction, LaneFilter, Subsystem, ValueKind,
};
use crate::util::constants;
use crate::util::error::DescriptorError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML descriptor as deserialized from a .toml file.
/// This is validated and compiled into a `Subsystem` for runtime use.
#[derive(Debug, Deserialize)]
pub struct DescriptorDefinition {
    pub subsystem: SubsystemMeta,
    #[serde(default)]
    pub filter: FilterDef,
    pub extraction: ExtractionDef,
    #[serde(default, rename = "family")]
    pub families: Vec<FamilyDef>,
    #[serde(default, rename = "band")]
    pub bands: Vec<BandDef>,
}

#[derive(Debug, Deserialize)]
pub struct SubsystemMeta {
    pub id: String,
    pub name: String,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub description: String,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Debug, Deserialize, Default)]
pub struct FilterDef {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub require_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantDef {
    KeyValue,
    FrequencyBlock,
    Message,
}

/// Characters allowed in a `key=` value-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueCharset {
    /// Digits, sign, dot, comma and ASCII letters.
    #[default]
    Alphanumeric,
    /// Digits, minus, dot and comma only.
    Numeric,
}

impl ValueCharset {
    fn class(self) -> &'static str {
        match self {
            ValueCharset::Alphanumeric => r"[+\-\d.,a-zA-Z]",
            ValueCharset::Numeric => r"[\-\d.,]",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractionDef {
    pub variant: VariantDef,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub value_charset: ValueCharset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KindDef {
    #[default]
    Numeric,
    Tokens,
    Text,
}

#[derive(Debug, Deserialize)]
pub struct FamilyDef {
    pub key: String,
    #[serde(default)]
    pub kind: KindDef,
    /// Explicit column names. Takes precedence over `template`.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Column name pattern with `{n}` replaced by the channel number.
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default = "default_first")]
    pub first: u32,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BandDef {
    pub name: String,
    pub table: String,
    #[serde(default = "default_band_template")]
    pub template: String,
    #[serde(default = "default_first")]
    pub first: u32,
    pub count: u32,
}

fn default_first() -> u32 {
    1
}

fn default_band_template() -> String {
    "v{n}".to_string()
}

// =============================================================================
// Descriptor validation and compilation
// =============================================================================

/// Parse a TOML string into a `DescriptorDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_descriptor_toml(
    toml_content: &str,
    source_path: &PathBuf,
) -> Result<DescriptorDefinition, DescriptorError> {
    toml::from_str(toml_content).map_err(|e| DescriptorError::TomlParse {
        path: source_path.clone(),
        source: e,
    })
}

/// Validate a `DescriptorDefinition` and compile it into a runtime `Subsystem`.
///
/// Validates:
/// - Required fields are present and non-empty
/// - Channel ids are digit strings
/// - Every family and band resolves to at least one column
/// - No table repeats a column or shadows a header column
/// - Generated regexes compile
pub fn validate_and_compile(
    def: DescriptorDefinition,
    is_builtin: bool,
) -> Result<Subsystem, DescriptorError> {
    let id = def.subsystem.id.trim().to_string();

    if id.is_empty() {
        return Err(DescriptorError::MissingField {
            subsystem_id: "(empty)".to_string(),
            field: "subsystem.id",
        });
    }
    if def.subsystem.name.trim().is_empty() {
        return Err(DescriptorError::MissingField {
            subsystem_id: id,
            field: "subsystem.name",
        });
    }

    let filter = compile_filter(&id, def.filter)?;
    let version = def.subsystem.schema_version;

    let extraction = match def.extraction.variant {
        VariantDef::KeyValue => {
            let table = require_table(&id, def.extraction.table)?;
            if def.families.is_empty() {
                return Err(DescriptorError::MissingField {
                    subsystem_id: id,
                    field: "family",
                });
            }
            let schema = compile_schema(&id, &table, version, def.families)?;
            let pattern = key_value_pattern(&id, &schema, def.extraction.value_charset)?;
            Extraction::KeyValue {
                table,
                schema,
                pattern,
            }
        }
        VariantDef::FrequencyBlock => {
            if def.bands.is_empty() {
                return Err(DescriptorError::MissingField {
                    subsystem_id: id,
                    field: "band",
                });
            }
            if !def.families.is_empty() {
                tracing::warn!(
                    subsystem_id = %id,
                    "frequency_block descriptor declares [[family]] entries; they are ignored"
                );
            }
            Extraction::FrequencyBlock {
                bands: compile_bands(&id, version, def.bands)?,
            }
        }
        VariantDef::Message => {
            let table = require_table(&id, def.extraction.table)?;
            let families = if def.families.is_empty() {
                vec![FamilyDef {
                    key: "message".to_string(),
                    kind: KindDef::Text,
                    columns: vec!["message".to_string()],
                    template: None,
                    first: 1,
                    count: 0,
                    tokens: Vec::new(),
                }]
            } else {
                def.families
            };
            if families.len() != 1 || families[0].kind != KindDef::Text {
                return Err(DescriptorError::InvalidValue {
                    subsystem_id: id,
                    field: "family",
                    value: format!("{} families", families.len()),
                    reason: "message extraction takes exactly one text family",
                });
            }
            let schema = compile_schema(&id, &table, version, families)?;
            Extraction::Message { table, schema }
        }
    };

    Ok(Subsystem {
        id,
        name: def.subsystem.name,
        filter,
        extraction,
        is_builtin,
    })
}

fn compile_filter(id: &str, def: FilterDef) -> Result<LaneFilter, DescriptorError> {
    let channel = match def.channel.map(|c| c.trim().to_string()) {
        Some(c) if c.is_empty() || !c.chars().all(|ch| ch.is_ascii_digit()) => {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "filter.channel",
                value: c,
                reason: "channel id must be a non-empty digit string",
            });
        }
        other => other,
    };

    let levels = def
        .levels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    Ok(LaneFilter {
        channel,
        levels,
        require_data: def.require_data,
    })
}

fn require_table(id: &str, table: Option<String>) -> Result<String, DescriptorError> {
    match table.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => {
            // Table names become file names in the sinks.
            if t.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                Ok(t)
            } else {
                Err(DescriptorError::InvalidValue {
                    subsystem_id: id.to_string(),
                    field: "extraction.table",
                    value: t,
                    reason: "table name may only contain ASCII letters, digits, '_' or '-'",
                })
            }
        }
        _ => Err(DescriptorError::MissingField {
            subsystem_id: id.to_string(),
            field: "extraction.table",
        }),
    }
}

/// Expand `template` into `count` names starting at channel `first`.
fn expand_template(template: &str, first: u32, count: u32) -> Vec<String> {
    (first..first.saturating_add(count))
        .map(|n| template.replace(constants::TEMPLATE_CHANNEL_PLACEHOLDER, &n.to_string()))
        .collect()
}

fn too_many_columns(id: &str, width: usize) -> DescriptorError {
    DescriptorError::InvalidValue {
        subsystem_id: id.to_string(),
        field: "family",
        value: width.to_string(),
        reason: "table has too many columns",
    }
}

fn resolve_columns(id: &str, family: &FamilyDef) -> Result<Vec<String>, DescriptorError> {
    if !family.columns.is_empty() {
        if family.columns.len() > constants::MAX_TABLE_COLUMNS {
            return Err(too_many_columns(id, family.columns.len()));
        }
        return Ok(family.columns.iter().map(|c| c.trim().to_string()).collect());
    }

    let Some(ref template) = family.template else {
        return Err(DescriptorError::MissingField {
            subsystem_id: id.to_string(),
            field: "family.columns",
        });
    };
    if !template.contains(constants::TEMPLATE_CHANNEL_PLACEHOLDER) {
        return Err(DescriptorError::InvalidValue {
            subsystem_id: id.to_string(),
            field: "family.template",
            value: template.clone(),
            reason: "template must contain {n}",
        });
    }
    if family.count == 0 {
        return Err(DescriptorError::InvalidValue {
            subsystem_id: id.to_string(),
            field: "family.count",
            value: "0".to_string(),
            reason: "a family needs at least one channel",
        });
    }
    // Bound the count before expanding.
    if family.count as usize > constants::MAX_TABLE_COLUMNS {
        return Err(too_many_columns(id, family.count as usize));
    }

    Ok(expand_template(template, family.first, family.count))
}

fn compile_schema(
    id: &str,
    table: &str,
    version: u32,
    defs: Vec<FamilyDef>,
) -> Result<ColumnSchema, DescriptorError> {
    let mut families = Vec::with_capacity(defs.len());
    let mut keys = HashSet::new();

    for def in defs {
        let key = def.key.trim().to_lowercase();
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "family.key",
                value: def.key.clone(),
                reason: "key must be non-empty ASCII letters, digits or '_'",
            });
        }
        if !keys.insert(key.clone()) {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "family.key",
                value: key,
                reason: "key declared twice",
            });
        }

        let columns = resolve_columns(id, &def)?;
        let kind = match def.kind {
            KindDef::Numeric => ValueKind::Numeric,
            KindDef::Text => ValueKind::Text,
            KindDef::Tokens => ValueKind::Tokens {
                pattern: token_pattern(id, &key, &def.tokens)?,
            },
        };

        families.push(ColumnFamily { key, kind, columns });
    }

    let schema = ColumnSchema { version, families };
    check_columns(id, table, &schema)?;
    Ok(schema)
}

fn compile_bands(id: &str, version: u32, defs: Vec<BandDef>) -> Result<Vec<Band>, DescriptorError> {
    let band_name = Regex::new(r"^\d+ghz$").map_err(|e| DescriptorError::InvalidRegex {
        subsystem_id: id.to_string(),
        pattern: r"^\d+ghz$".to_string(),
        source: e,
    })?;

    let mut bands: Vec<Band> = Vec::with_capacity(defs.len());
    for def in defs {
        let name = def.name.trim().to_lowercase();
        if !band_name.is_match(&name) {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "band.name",
                value: def.name,
                reason: "band name must look like '<N>ghz'",
            });
        }
        if bands.iter().any(|b| b.name == name) {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "band.name",
                value: name,
                reason: "band declared twice",
            });
        }
        let table = require_table(id, Some(def.table))?;
        if bands.iter().any(|b| b.table == table) {
            return Err(DescriptorError::InvalidValue {
                subsystem_id: id.to_string(),
                field: "band.table",
                value: table,
                reason: "two bands write to the same table",
            });
        }

        let family = FamilyDef {
            key: name.clone(),
            kind: KindDef::Numeric,
            columns: Vec::new(),
            template: Some(def.template),
            first: def.first,
            count: def.count,
            tokens: Vec::new(),
        };
        let schema = compile_schema(id, &table, version, vec![family])?;
        bands.push(Band {
            name,
            table,
            schema,
        });
    }
    Ok(bands)
}

/// Reject empty, duplicate, header-shadowing or oversized column lists.
fn check_columns(id: &str, table: &str, schema: &ColumnSchema) -> Result<(), DescriptorError> {
    if schema.width() > constants::MAX_TABLE_COLUMNS {
        return Err(too_many_columns(id, schema.width()));
    }

    let mut seen: HashSet<String> = constants::HEADER_COLUMNS
        .iter()
        .map(|c| c.to_lowercase())
        .collect();
    for column in schema.columns() {
        if column.is_empty() {
            return Err(DescriptorError::MissingField {
                subsystem_id: id.to_string(),
                field: "family.columns",
            });
        }
        if !seen.insert(column.to_lowercase()) {
            return Err(DescriptorError::DuplicateColumn {
                subsystem_id: id.to_string(),
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

/// `(key1|key2|...)=(value-run)`, case-insensitive, keys in declaration order.
fn key_value_pattern(
    id: &str,
    schema: &ColumnSchema,
    charset: ValueCharset,
) -> Result<Regex, DescriptorError> {
    let keys: Vec<String> = schema
        .families
        .iter()
        .map(|f| regex::escape(&f.key))
        .collect();
    let pattern = format!("(?i)({})=({}*)", keys.join("|"), charset.class());
    compile_regex(id, &pattern)
}

fn token_pattern(id: &str, key: &str, tokens: &[String]) -> Result<Regex, DescriptorError> {
    let tokens: Vec<String> = tokens
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(regex::escape)
        .collect();
    if tokens.is_empty() {
        return Err(DescriptorError::InvalidValue {
            subsystem_id: id.to_string(),
            field: "family.tokens",
            value: key.to_string(),
            reason: "token family lists no tokens",
        });
    }
    compile_regex(id, &format!("(?i)(?:{})", tokens.join("|")))
}

fn compile_regex(id: &str, pattern: &str) -> Result<Regex, DescriptorError> {
    Regex::new(pattern).map_err(|e| DescriptorError::InvalidRegex {
        subsystem_id: id.to_string(),
        pattern: pattern.to_string(),
        source: e,
    })
}

// =============================================================================
// Built-in descriptors (embedded at compile time)
// =============================================================================

/// Embedded TOML content for built-in descriptors.
/// Each tuple is (filename, TOML content).
pub fn builtin_descriptor_sources() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "frontend.toml",
            include_str!("../../subsystems/frontend.toml"),
        ),
        (
            "if_selector.toml",
            include_str!("../../subsystems/if_selector.toml"),
        ),
        ("kdown.toml", include_str!("../../subsystems/kdown.toml")),
        ("qdown.toml", include_str!("../../subsystems/qdown.toml")),
        ("sxdown.toml", include_str!("../../subsystems/sxdown.toml")),
        (
            "videoconverter2.toml",
            include_str!("../../subsystems/videoconverter2.toml"),
        ),
        ("event.toml", include_str!("../../subsystems/event.toml")),
    ]
}

/// Load and validate all built-in descriptors.
///
/// Invalid descriptors are logged as errors and skipped (non-fatal).
pub fn load_builtin_descriptors() -> Vec<Subsystem> {
    let mut subsystems = Vec::new();
    let mut failures = 0usize;

    for (filename, content) in builtin_descriptor_sources() {
        let path = PathBuf::from(format!("<builtin>/{filename}"));
        match parse_descriptor_toml(content, &path).and_then(|def| validate_and_compile(def, true))
        {
            Ok(subsystem) => {
                tracing::debug!(subsystem_id = %subsystem.id, "Loaded built-in descriptor");
                subsystems.push(subsystem);
            }
            Err(e) => {
                tracing::error!(file = filename, error = %e, "Failed to load built-in descriptor");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        tracing::warn!(count = failures, "Some built-in descriptors failed to load");
    }

    subsystems
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_DESCRIPTOR_TOML: &str = r#"
[subsystem]
id = "test-down"
name = "Test Downconverter"
schema_version = 3

[filter]
channel = "21"
levels = ["INFO"]

[extraction]
variant = "key_value"
table = "TestDown"

[[family]]
key = "att"
template = "T{n}ATT"
count = 2

[[family]]
key = "LOCK"
kind = "tokens"
tokens = ["lck", "lc"]
columns = ["TALOCK", "TBLOCK"]
"#;

    fn compile(toml: &str) -> Result<Subsystem, DescriptorError> {
        let path = PathBuf::from("test.toml");
        let def = parse_descriptor_toml(toml, &path)?;
        validate_and_compile(def, false)
    }

    #[test]
    fn test_parse_valid_descriptor() {
        let path = PathBuf::from("test.toml");
        let def = parse_descriptor_toml(VALID_DESCRIPTOR_TOML, &path).unwrap();
        assert_eq!(def.subsystem.id, "test-down");
        assert_eq!(def.families.len(), 2);
        assert_eq!(def.extraction.variant, VariantDef::KeyValue);
    }

    #[test]
    fn test_compile_valid_descriptor() {
        let subsystem = compile(VALID_DESCRIPTOR_TOML).unwrap();
        assert!(!subsystem.is_builtin);
        assert_eq!(subsystem.filter.channel.as_deref(), Some("21"));
        match &subsystem.extraction {
            Extraction::KeyValue {
                table,
                schema,
                pattern,
            } => {
                assert_eq!(table, "TestDown");
                assert_eq!(schema.version, 3);
                let cols: Vec<&str> = schema.columns().collect();
                assert_eq!(cols, vec!["T1ATT", "T2ATT", "TALOCK", "TBLOCK"]);
                assert_eq!(schema.families[1].key, "lock");
                assert!(pattern.is_match("Lock=lck"));
                assert!(!pattern.is_match("level=1"));
            }
            other => panic!("expected key_value, got {}", other.label()),
        }
    }

    #[test]
    fn test_missing_id() {
        let toml = VALID_DESCRIPTOR_TOML.replace("id = \"test-down\"", "id = \"\"");
        match compile(&toml).unwrap_err() {
            DescriptorError::MissingField { field, .. } => assert_eq!(field, "subsystem.id"),
            other => panic!("Expected MissingField, got: {other:?}"),
        }
    }

    #[test]
    fn test_non_digit_channel_rejected() {
        let toml = VALID_DESCRIPTOR_TOML.replace("channel = \"21\"", "channel = \"2a\"");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::InvalidValue {
                field: "filter.channel",
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let toml = VALID_DESCRIPTOR_TOML.replace("\"TALOCK\", \"TBLOCK\"", "\"T1ATT\", \"TBLOCK\"");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::DuplicateColumn { .. }
        ));
    }

    #[test]
    fn test_header_column_shadowing_rejected() {
        let toml = VALID_DESCRIPTOR_TOML.replace("\"TALOCK\", \"TBLOCK\"", "\"Level\", \"TBLOCK\"");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::DuplicateColumn { .. }
        ));
    }

    #[test]
    fn test_token_family_without_tokens_rejected() {
        let toml = VALID_DESCRIPTOR_TOML.replace("tokens = [\"lck\", \"lc\"]", "tokens = []");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::InvalidValue {
                field: "family.tokens",
                ..
            }
        ));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        let toml = VALID_DESCRIPTOR_TOML.replace("T{n}ATT", "TATT");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::InvalidValue {
                field: "family.template",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_count_rejected_before_expansion() {
        let toml = VALID_DESCRIPTOR_TOML.replace("count = 2", "count = 4000000000");
        assert!(matches!(
            compile(&toml).unwrap_err(),
            DescriptorError::InvalidValue {
                field: "family",
                reason: "table has too many columns",
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_band_count_rejected() {
        let toml = r#"
[subsystem]
id = "fe"
name = "FE"

[extraction]
variant = "frequency_block"

[[band]]
name = "2ghz"
table = "fe_2"
count = 4294967295
"#;
        assert!(matches!(
            compile(toml).unwrap_err(),
            DescriptorError::InvalidValue { field: "family", .. }
        ));
    }

    #[test]
    fn test_invalid_toml() {
        let path = PathBuf::from("bad.toml");
        assert!(matches!(
            parse_descriptor_toml("[subsystem\nid=", &path).unwrap_err(),
            DescriptorError::TomlParse { .. }
        ));
    }

    #[test]
    fn test_bad_band_name_rejected() {
        let toml = r#"
[subsystem]
id = "fe"
name = "FE"

[extraction]
variant = "frequency_block"

[[band]]
name = "xband"
table = "fe_x"
count = 4
"#;
        assert!(matches!(
            compile(toml).unwrap_err(),
            DescriptorError::InvalidValue {
                field: "band.name",
                ..
            }
        ));
    }

    #[test]
    fn test_message_descriptor_gets_default_family() {
        let toml = r#"
[subsystem]
id = "ev"
name = "Events"

[filter]
levels = ["WARN"]

[extraction]
variant = "message"
table = "Ev"
"#;
        let subsystem = compile(toml).unwrap();
        assert_eq!(subsystem.filter.channel, None);
        match subsystem.extraction {
            Extraction::Message { schema, .. } => {
                assert_eq!(schema.columns().collect::<Vec<_>>(), vec!["message"]);
            }
            other => panic!("expected message, got {}", other.label()),
        }
    }

    #[test]
    fn test_load_builtin_descriptors() {
        let subsystems = load_builtin_descriptors();
        assert_eq!(subsystems.len(), builtin_descriptor_sources().len());
        assert!(subsystems.iter().all(|s| s.is_builtin));

        let width = |id: &str| -> Vec<usize> {
            let s = subsystems.iter().find(|s| s.id == id).unwrap();
            match &s.extraction {
                Extraction::KeyValue { schema, .. } | Extraction::Message { schema, .. } => {
                    vec![schema.width()]
                }
                Extraction::FrequencyBlock { bands } => {
                    bands.iter().map(|b| b.schema.width()).collect()
                }
            }
        };
        assert_eq!(width("if_selector"), vec![48]);
        assert_eq!(width("kdown"), vec![12]);
        assert_eq!(width("qdown"), vec![12]);
        assert_eq!(width("sxdown"), vec![9]);
        assert_eq!(width("videoconverter2"), vec![40]);
        assert_eq!(width("frontend"), vec![40, 40, 40, 40]);
        assert_eq!(width("event"), vec![1]);
    }

    #[test]
    fn test_builtin_channels() {
        let subsystems = load_builtin_descriptors();
        let channel = |id: &str| {
            subsystems
                .iter()
                .find(|s| s.id == id)
                .and_then(|s| s.filter.channel.clone())
        };
        assert_eq!(channel("frontend").as_deref(), Some("12"));
        assert_eq!(channel("if_selector").as_deref(), Some("15"));
        assert_eq!(channel("kdown").as_deref(), Some("11"));
        assert_eq!(channel("qdown").as_deref(), Some("14"));
        assert_eq!(channel("sxdown").as_deref(), Some("13"));
        assert_eq!(channel("videoconverter2").as_deref(), Some("4"));
        assert_eq!(channel("event"), None);
    }
}

// TeleSift - core/extract.rs
//
// Body field extraction: pulls key/value groups or frequency blocks out of
// an entry's data tail. Cardinality of the result is never trusted here;
// the column mapper pads or truncates later.
//
// Core layer: pure string processing.

use crate::core::model::{ColumnSchema, Extraction, FieldGroup, FieldValues, LogEntry, ValueKind};
use crate::util::constants;
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Replace full-width commas with ASCII commas.
pub fn normalise_commas(s: &str) -> Cow<'_, str> {
    if s.contains(constants::FULLWIDTH_COMMA) {
        Cow::Owned(s.replace(constants::FULLWIDTH_COMMA, ","))
    } else {
        Cow::Borrowed(s)
    }
}

/// Split a raw value-run on commas, trimming pieces and dropping empties.
pub fn split_values(run: &str) -> Vec<String> {
    run.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Recognised status tokens in `run`, in order of appearance.
///
/// Separators and unrecognised text between tokens are ignored entirely.
pub fn scan_tokens(run: &str, pattern: &Regex) -> Vec<String> {
    pattern
        .find_iter(run)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extract every field group a subsystem cares about from one entry.
pub fn extract(entry: &LogEntry, extraction: &Extraction) -> Vec<FieldGroup> {
    match extraction {
        Extraction::KeyValue {
            schema, pattern, ..
        } => extract_key_values(&entry.data, pattern, schema),
        Extraction::FrequencyBlock { .. } => extract_frequency_blocks(&entry.data),
        Extraction::Message { .. } => vec![FieldGroup {
            key: "message".to_string(),
            values: FieldValues::Text(entry.body.clone()),
        }],
    }
}

/// Scan `data` for `key=value-run` occurrences.
///
/// Returns one group per occurrence in source order, so a repeated key
/// appears more than once; consumers take the last one. Keys are
/// lower-cased. The value-run is decoded according to the family's kind.
pub fn extract_key_values(data: &str, pattern: &Regex, schema: &ColumnSchema) -> Vec<FieldGroup> {
    let data = normalise_commas(data);
    let mut groups = Vec::new();

    for caps in pattern.captures_iter(&data) {
        let (Some(key), Some(run)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let key = key.as_str().to_lowercase();
        let run = run.as_str();

        let values = match schema.family(&key).map(|f| &f.kind) {
            Some(ValueKind::Tokens { pattern }) => FieldValues::Tokens(scan_tokens(run, pattern)),
            Some(ValueKind::Text) => FieldValues::Text(run.to_string()),
            Some(ValueKind::Numeric) | None => FieldValues::Numeric(split_values(run)),
        };

        groups.push(FieldGroup { key, values });
    }

    groups
}

fn band_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\d+ghz").expect("band regex is valid"))
}

/// Scan `data` for `<N>ghz<payload>` blocks.
///
/// A block's payload runs up to the start of the next band tag (or the end
/// of the string), so blocks never overlap. Band keys are lower-cased; the
/// caller decides which bands it recognises.
pub fn extract_frequency_blocks(data: &str) -> Vec<FieldGroup> {
    let data = normalise_commas(data);
    let tags: Vec<_> = band_pattern().find_iter(&data).collect();

    tags.iter()
        .enumerate()
        .map(|(i, tag)| {
            let end = tags.get(i + 1).map_or(data.len(), |next| next.start());
            let payload = data[tag.end()..end].trim_matches(|c| c == ' ' || c == ',');
            FieldGroup {
                key: tag.as_str().to_lowercase(),
                values: FieldValues::Numeric(split_values(payload)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ColumnFamily;

    fn kv_schema() -> (Regex, ColumnSchema) {
        let pattern = Regex::new(r"(?i)(att|level|lock)=([+\-\d.,a-zA-Z]*)").unwrap();
        let family = |key: &str, kind: ValueKind| ColumnFamily {
            key: key.to_string(),
            kind,
            columns: (1..=4).map(|n| format!("K{n}{}", key.to_uppercase())).collect(),
        };
        let schema = ColumnSchema {
            version: 1,
            families: vec![
                family("att", ValueKind::Numeric),
                family("level", ValueKind::Numeric),
                family(
                    "lock",
                    ValueKind::Tokens {
                        pattern: Regex::new("(?i)lck|lc").unwrap(),
                    },
                ),
            ],
        };
        (pattern, schema)
    }

    fn numeric(values: &[&str]) -> FieldValues {
        FieldValues::Numeric(values.iter().map(|v| v.to_string()).collect())
    }

    #[test]
    fn test_two_frequency_blocks() {
        let groups = extract_frequency_blocks("2ghz1,2,3 8ghz4,5,6");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "2ghz");
        assert_eq!(groups[0].values, numeric(&["1", "2", "3"]));
        assert_eq!(groups[1].key, "8ghz");
        assert_eq!(groups[1].values, numeric(&["4", "5", "6"]));
    }

    #[test]
    fn test_frequency_block_case_and_prefix_text() {
        let groups = extract_frequency_blocks("status 22GHz 10.5, 11.5 ,43ghz,-1,,2,");
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["22ghz", "43ghz"]);
        assert_eq!(groups[0].values, numeric(&["10.5", "11.5"]));
        assert_eq!(groups[1].values, numeric(&["-1", "2"]));
    }

    #[test]
    fn test_frequency_block_without_tags() {
        assert!(extract_frequency_blocks("cryo 15K nominal").is_empty());
        assert!(extract_frequency_blocks("").is_empty());
    }

    #[test]
    fn test_frequency_block_fullwidth_commas() {
        let groups = extract_frequency_blocks("2ghz1\u{FF0C}2\u{FF0C}3");
        assert_eq!(groups[0].values, numeric(&["1", "2", "3"]));
    }

    #[test]
    fn test_lock_tokens_ignore_separator_noise() {
        let (pattern, schema) = kv_schema();
        let groups = extract_key_values("lock=lck,-,lc,-", &pattern, &schema);
        assert_eq!(groups.len(), 1);
        match &groups[0].values {
            FieldValues::Tokens(tokens) => assert_eq!(tokens, &vec!["lck", "lc"]),
            other => panic!("expected tokens, got {other:?}"),
        }
    }

    #[test]
    fn test_key_values_with_signs_and_case() {
        let (pattern, schema) = kv_schema();
        let groups = extract_key_values(
            "ATT=0,0,1,1 Level=-10.5,+3.2,-7 lock=LCK,lc",
            &pattern,
            &schema,
        );
        let keys: Vec<&str> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["att", "level", "lock"]);
        assert_eq!(groups[1].values, numeric(&["-10.5", "+3.2", "-7"]));
        assert_eq!(
            groups[2].values,
            FieldValues::Tokens(vec!["LCK".to_string(), "lc".to_string()])
        );
    }

    #[test]
    fn test_repeated_key_reported_per_occurrence() {
        let (pattern, schema) = kv_schema();
        let groups = extract_key_values("att=1,2 att=3,4,5", &pattern, &schema);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].values, numeric(&["3", "4", "5"]));
    }

    #[test]
    fn test_key_values_fullwidth_commas() {
        let (pattern, schema) = kv_schema();
        let groups = extract_key_values("att=1\u{FF0C}2\u{FF0C}3", &pattern, &schema);
        assert_eq!(groups[0].values, numeric(&["1", "2", "3"]));
    }

    #[test]
    fn test_empty_piece_shifts_later_values() {
        let (pattern, schema) = kv_schema();
        let groups = extract_key_values("att=1,,2 3", &pattern, &schema);
        assert_eq!(groups[0].values, numeric(&["1", "2"]));
    }

    #[test]
    fn test_message_extraction_uses_body() {
        let entry = crate::core::header::parse_line(
            "2024-01-01 10:00:00,200 [4] ERROR - Converter: lost lock",
            1,
        )
        .unwrap();
        let extraction = Extraction::Message {
            table: "Event".to_string(),
            schema: ColumnSchema {
                version: 1,
                families: vec![],
            },
        };
        let groups = extract(&entry, &extraction);
        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].values,
            FieldValues::Text("Converter: lost lock".to_string())
        );
    }
}

// TeleSift - core/header.rs
//
// Header line parsing: turns decoded telemetry text into `LogEntry` values.
// Core layer: operates on &str only, never touches sockets or files.
//
// Grammar (one line):
//   <date> <time>,<code> [<channel>] <LEVEL> <dash-run> <body>
// `data` is the body without its leading ':', whitespace or '-' run, so a
// label such as "KDown" stays in front of the payload. Lines that do not
// match are skipped; most of a controller dump is narrative text.

use crate::core::model::LogEntry;
use crate::util::logging;
use regex::Regex;
use std::sync::OnceLock;

/// Result of parsing a complete decoded dump.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Entries in source order.
    pub entries: Vec<LogEntry>,
    /// Total lines seen, including blank ones.
    pub lines_processed: u64,
    /// Non-blank lines that failed the header grammar.
    pub lines_skipped: u64,
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?P<datetime>\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}),(?P<code>\d{3})\s+\[(?P<channel>\d+)\]\s+(?P<level>\w+)\s*-+\s*(?P<body>.*)$",
        )
        .expect("header grammar regex is valid")
    })
}

/// Parse one line against the header grammar.
///
/// The line is trimmed first. Returns `None` for blank lines and for lines
/// that do not match; neither is an error.
pub fn parse_line(line: &str, line_number: u64) -> Option<LogEntry> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let caps = header_pattern().captures(line)?;
    let get = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    let body = get("body");
    let data = body.trim_start_matches(is_separator).trim();
    let message = data.split(is_separator).next().unwrap_or_default();

    Some(LogEntry {
        line_number,
        datetime: get("datetime"),
        code: get("code"),
        channel_id: get("channel"),
        level: get("level"),
        message: message.to_string(),
        data: data.to_string(),
        body,
    })
}

fn is_separator(c: char) -> bool {
    c == ':' || c == '-' || c.is_whitespace()
}

/// Split decoded text into lines and parse every one of them.
pub fn parse_text(text: &str) -> ParseResult {
    let mut result = ParseResult::default();

    for (idx, line) in text.lines().enumerate() {
        result.lines_processed += 1;
        let line_number = (idx as u64) + 1;

        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line, line_number) {
            Some(entry) => result.entries.push(entry),
            None => {
                result.lines_skipped += 1;
                tracing::trace!(
                    line = line_number,
                    preview = logging::preview(line),
                    "Line does not match header grammar"
                );
            }
        }
    }

    tracing::debug!(
        entries = result.entries.len(),
        skipped = result.lines_skipped,
        lines = result.lines_processed,
        "Header parsing complete"
    );

    result
}

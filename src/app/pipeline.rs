// TeleSift - app/pipeline.rs
//
// End-to-end run: fetch -> decode -> parse once -> run every subsystem
// lane in parallel -> hand non-empty tables to the sink.
//
// The parsed entry list is shared read-only between lanes; lanes never
// communicate. Only source and sink failures abort a run.

use crate::app::sink::RecordSink;
use crate::app::source::LogSource;
use crate::core::assemble::{run_subsystem, SubsystemOutput};
use crate::core::decode::{DecodePath, Decoder};
use crate::core::header;
use crate::core::model::Subsystem;
use crate::util::error::{ConfigError, Result};
use rayon::prelude::*;

/// Everything a run produced, before it is written anywhere.
#[derive(Debug)]
pub struct RunReport {
    pub source: String,
    pub bytes_received: usize,
    pub encoding: &'static str,
    pub decode_path: DecodePath,
    pub lines_processed: u64,
    pub lines_skipped: u64,
    pub entries: usize,
    /// One per subsystem, in descriptor order.
    pub outputs: Vec<SubsystemOutput>,
}

impl RunReport {
    pub fn total_rows(&self) -> usize {
        self.outputs.iter().map(SubsystemOutput::total_rows).sum()
    }

    pub fn table_count(&self) -> usize {
        self.outputs.iter().map(|o| o.tables.len()).sum()
    }
}

/// Keep only subsystems whose id matches one of `patterns` (glob syntax).
/// An empty pattern list keeps everything.
pub fn select_subsystems(
    subsystems: Vec<Subsystem>,
    patterns: &[String],
) -> std::result::Result<Vec<Subsystem>, ConfigError> {
    if patterns.is_empty() {
        return Ok(subsystems);
    }

    let compiled = patterns
        .iter()
        .map(|p| {
            glob::Pattern::new(p).map_err(|e| ConfigError::InvalidPattern {
                pattern: p.clone(),
                source: e,
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let selected: Vec<Subsystem> = subsystems
        .into_iter()
        .filter(|s| compiled.iter().any(|p| p.matches(&s.id)))
        .collect();

    if selected.is_empty() {
        tracing::warn!(?patterns, "No subsystem matches the selection");
    }
    Ok(selected)
}

/// Decode and extract an already-fetched buffer.
pub fn process_bytes(
    source: String,
    bytes: &[u8],
    decoder: &Decoder,
    subsystems: &[Subsystem],
) -> RunReport {
    let decoded = decoder.decode(bytes);
    let parsed = header::parse_text(&decoded.text);

    let outputs: Vec<SubsystemOutput> = subsystems
        .par_iter()
        .map(|s| run_subsystem(&parsed.entries, s))
        .collect();

    let report = RunReport {
        source,
        bytes_received: bytes.len(),
        encoding: decoded.encoding,
        decode_path: decoded.path,
        lines_processed: parsed.lines_processed,
        lines_skipped: parsed.lines_skipped,
        entries: parsed.entries.len(),
        outputs,
    };

    tracing::info!(
        entries = report.entries,
        skipped = report.lines_skipped,
        tables = report.table_count(),
        rows = report.total_rows(),
        "Extraction complete"
    );

    report
}

/// Fetch from `source` and extract. A failed transfer yields no report.
pub fn run(
    source: &mut dyn LogSource,
    decoder: &Decoder,
    subsystems: &[Subsystem],
) -> Result<RunReport> {
    let description = source.describe();
    tracing::info!(source = %description, subsystems = subsystems.len(), "Run started");
    let bytes = source.fetch()?;
    Ok(process_bytes(description, &bytes, decoder, subsystems))
}

/// Write every produced table to `sink`. Returns the number of tables written.
pub fn write_outputs(report: &RunReport, sink: &mut dyn RecordSink) -> Result<usize> {
    let mut written = 0;
    for output in &report.outputs {
        for table in &output.tables {
            sink.write_table(table)?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::sink::MemorySink;
    use crate::app::source::MemorySource;
    use crate::core::descriptor::load_builtin_descriptors;
    use crate::util::constants;
    use crate::util::error::{SourceError, TeleSiftError};

    fn decoder() -> Decoder {
        Decoder::from_labels(
            constants::DEFAULT_PRIMARY_ENCODING,
            constants::DEFAULT_FALLBACK_ENCODING,
        )
        .unwrap()
    }

    const SAMPLE: &str = "\
2024-03-05 12:00:01,123 [11] INFO - KDown att=1,2,3,4 level=5,6,7,8 lock=lck,lc,lck,lc
2024-03-05 12:00:02,123 [12] INFO --- FE: 2ghz1,2,3 22ghz4,5
garbage line

2024-03-05 12:00:03,123 [4] ERROR - VC: lost lock
";

    #[test]
    fn test_run_memory_to_memory() {
        let subsystems = load_builtin_descriptors();
        let mut source = MemorySource::new(SAMPLE.as_bytes().to_vec());
        let report = run(&mut source, &decoder(), &subsystems).unwrap();

        assert_eq!(report.entries, 3);
        assert_eq!(report.lines_skipped, 1);
        assert_eq!(report.decode_path, DecodePath::Primary);
        assert_eq!(report.outputs.len(), subsystems.len());

        let mut sink = MemorySink::new();
        let written = write_outputs(&report, &mut sink).unwrap();
        assert_eq!(written, report.table_count());

        let mut names: Vec<&str> = sink.tables.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["Event", "KDown", "frontend_22ghz", "frontend_2ghz"]
        );
        assert_eq!(sink.table("KDown").unwrap().cell(0, "K4LOCK"), Some("lc"));
    }

    #[test]
    fn test_outputs_follow_descriptor_order() {
        let subsystems = load_builtin_descriptors();
        let report = process_bytes("t".into(), SAMPLE.as_bytes(), &decoder(), &subsystems);
        let ids: Vec<&str> = report.outputs.iter().map(|o| o.subsystem_id.as_str()).collect();
        let expected: Vec<&str> = subsystems.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_select_subsystems_by_glob() {
        let selected = select_subsystems(
            load_builtin_descriptors(),
            &["*down".to_string(), "event".to_string()],
        )
        .unwrap();
        let ids: Vec<&str> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["kdown", "qdown", "sxdown", "event"]);
    }

    #[test]
    fn test_select_subsystems_bad_pattern() {
        assert!(matches!(
            select_subsystems(load_builtin_descriptors(), &["[".to_string()]).unwrap_err(),
            ConfigError::InvalidPattern { .. }
        ));
    }

    struct FailingSource;

    impl LogSource for FailingSource {
        fn fetch(&mut self) -> std::result::Result<Vec<u8>, SourceError> {
            Err(SourceError::TooLarge {
                address: "test".into(),
                max_bytes: 1,
            })
        }

        fn describe(&self) -> String {
            "failing".into()
        }
    }

    #[test]
    fn test_failed_transfer_yields_no_report() {
        let err = run(&mut FailingSource, &decoder(), &load_builtin_descriptors()).unwrap_err();
        assert!(matches!(err, TeleSiftError::Source(_)));
    }
}

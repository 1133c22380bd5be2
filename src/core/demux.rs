// TeleSift - core/demux.rs
//
// Channel demultiplexing: selects one subsystem's lane out of the
// interleaved entry stream. All active rules are AND-combined.
// Core layer: pure logic, no I/O.

use crate::core::model::{LaneFilter, LogEntry};

impl LaneFilter {
    /// Filter for a single channel id, any level.
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            channel: Some(id.into()),
            ..Default::default()
        }
    }

    /// Returns true if `entry` belongs to this lane.
    pub fn accepts(&self, entry: &LogEntry) -> bool {
        if let Some(ref channel) = self.channel {
            if entry.channel_id != *channel {
                return false;
            }
        }

        if !self.levels.is_empty()
            && !self
                .levels
                .iter()
                .any(|l| l.eq_ignore_ascii_case(&entry.level))
        {
            return false;
        }

        if self.require_data && entry.data.is_empty() {
            return false;
        }

        true
    }
}

/// Order-preserving subsequence of `entries` accepted by `filter`.
///
/// Rejected entries are dropped, not buffered for other lanes.
pub fn demux<'a>(entries: &'a [LogEntry], filter: &LaneFilter) -> Vec<&'a LogEntry> {
    entries.iter().filter(|e| filter.accepts(e)).collect()
}

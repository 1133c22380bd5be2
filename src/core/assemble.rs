// TeleSift - core/assemble.rs
//
// Row assembly and the per-subsystem lane run: demux, extract, map, and
// collect rows into tables. One call handles any subsystem; everything that
// differs between controllers comes from the `Subsystem` descriptor.

use crate::core::demux::demux;
use crate::core::extract::extract;
use crate::core::mapper::map_family;
use crate::core::model::{ColumnSchema, Extraction, FieldGroup, LogEntry, Row, Subsystem, Table};
use crate::util::constants;

/// Output of one subsystem lane.
#[derive(Debug, Clone)]
pub struct SubsystemOutput {
    pub subsystem_id: String,
    /// Non-empty tables only, in descriptor order.
    pub tables: Vec<Table>,
    /// Entries that passed the lane filter.
    pub entries_matched: usize,
}

impl SubsystemOutput {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows.len()).sum()
    }

    /// True when the lane produced nothing for the sink.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Build one row from an entry's header and its extracted groups.
///
/// For each family the last group with a matching key wins. The row is
/// always `HEADER_COLUMNS.len() + schema.width()` cells wide.
pub fn assemble_row(entry: &LogEntry, schema: &ColumnSchema, groups: &[FieldGroup]) -> Row {
    let mut cells = Vec::with_capacity(constants::HEADER_COLUMNS.len() + schema.width());
    cells.push(Some(entry.datetime.clone()));
    cells.push(Some(entry.code.clone()));
    cells.push(Some(entry.channel_id.clone()));
    cells.push(Some(entry.level.clone()));

    for family in &schema.families {
        let latest = groups
            .iter()
            .rev()
            .find(|g| g.key == family.key)
            .map(|g| &g.values);
        cells.extend(map_family(latest, family.slots()));
    }

    Row { cells }
}

/// Run one subsystem lane over the shared entry list.
pub fn run_subsystem(entries: &[LogEntry], subsystem: &Subsystem) -> SubsystemOutput {
    let lane = demux(entries, &subsystem.filter);

    let tables = match &subsystem.extraction {
        Extraction::KeyValue { table, schema, .. } | Extraction::Message { table, schema } => {
            let mut out = Table::new(table.clone(), schema.clone());
            for entry in &lane {
                let groups = extract(entry, &subsystem.extraction);
                out.rows.push(assemble_row(entry, schema, &groups));
            }
            vec![out]
        }
        Extraction::FrequencyBlock { bands } => {
            let mut outs: Vec<Table> = bands
                .iter()
                .map(|b| Table::new(b.table.clone(), b.schema.clone()))
                .collect();
            for entry in &lane {
                for group in extract(entry, &subsystem.extraction) {
                    let Some(idx) = bands.iter().position(|b| b.name == group.key) else {
                        tracing::trace!(
                            subsystem = %subsystem.id,
                            band = %group.key,
                            line = entry.line_number,
                            "Ignoring undeclared band"
                        );
                        continue;
                    };
                    let row = assemble_row(entry, &bands[idx].schema, std::slice::from_ref(&group));
                    outs[idx].rows.push(row);
                }
            }
            outs
        }
    };

    let tables: Vec<Table> = tables
        .into_iter()
        .filter(|t| {
            if t.rows.is_empty() {
                tracing::info!(subsystem = %subsystem.id, table = %t.name, "No data found");
            }
            !t.rows.is_empty()
        })
        .collect();

    let output = SubsystemOutput {
        subsystem_id: subsystem.id.clone(),
        tables,
        entries_matched: lane.len(),
    };

    tracing::debug!(
        subsystem = %subsystem.id,
        entries = output.entries_matched,
        rows = output.total_rows(),
        "Subsystem lane complete"
    );

    output
}

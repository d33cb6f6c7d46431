//! Drops rows that lack any of the five delay causes.
//!
//! Only the cause columns gate removal. Rows missing arrival delay or
//! taxi-out stay in, and those columns are filtered per statistic later.

use crate::flight::{DelayCause, FlightRecord, FlightTable};
use tracing::info;

/// A table in which every row carries all five delay causes.
///
/// Only [`clean`] constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable(FlightTable<FlightRecord>);

impl CleanTable {
    pub fn rows(&self) -> &[FlightRecord] {
        self.0.rows()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> FlightTable<FlightRecord> {
        self.0
    }

    /// Values of one cause column, in row order.
    pub fn cause_values(&self, cause: DelayCause) -> impl Iterator<Item = f64> + '_ {
        self.rows().iter().filter_map(move |r| r.cause(cause))
    }
}

/// Keeps only rows where all five delay causes are present.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn clean(table: FlightTable<FlightRecord>) -> CleanTable {
    let before = table.len();
    let (sources, rows) = table.into_parts();
    let kept: Vec<FlightRecord> = rows.into_iter().filter(FlightRecord::has_all_causes).collect();

    info!(kept = kept.len(), dropped = before - kept.len(), "Cleaning complete");
    CleanTable(FlightTable::new(sources, kept))
}

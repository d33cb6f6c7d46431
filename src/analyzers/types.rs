//! Data types produced by the aggregation pipeline.

use crate::analyzers::utility::mean;
use crate::flight::{DelayCause, FlightRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean minutes of each delay cause over some set of flights.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CauseMeans {
    pub avg_carrier_delay: f64,
    pub avg_weather_delay: f64,
    pub avg_nas_delay: f64,
    pub avg_security_delay: f64,
    pub avg_late_aircraft_delay: f64,
}

impl CauseMeans {
    /// Means over `rows`, skipping missing values. `None` if any cause has no
    /// values at all.
    pub fn from_rows(rows: &[&FlightRecord]) -> Option<Self> {
        let column = |cause: DelayCause| {
            let values: Vec<f64> = rows.iter().filter_map(|r| r.cause(cause)).collect();
            mean(&values)
        };

        Some(CauseMeans {
            avg_carrier_delay: column(DelayCause::Carrier)?,
            avg_weather_delay: column(DelayCause::Weather)?,
            avg_nas_delay: column(DelayCause::Nas)?,
            avg_security_delay: column(DelayCause::Security)?,
            avg_late_aircraft_delay: column(DelayCause::LateAircraft)?,
        })
    }

    pub fn get(&self, cause: DelayCause) -> f64 {
        match cause {
            DelayCause::Carrier => self.avg_carrier_delay,
            DelayCause::Weather => self.avg_weather_delay,
            DelayCause::Nas => self.avg_nas_delay,
            DelayCause::Security => self.avg_security_delay,
            DelayCause::LateAircraft => self.avg_late_aircraft_delay,
        }
    }

    /// `(cause, mean)` pairs in report order.
    pub fn iter(&self) -> impl Iterator<Item = (DelayCause, f64)> + '_ {
        DelayCause::ALL.into_iter().map(|c| (c, self.get(c)))
    }

    /// The cause with the highest mean; ties go to the earlier cause.
    pub fn max_cause(&self) -> DelayCause {
        let mut best = DelayCause::Carrier;
        for cause in DelayCause::ALL {
            if self.get(cause) > self.get(best) {
                best = cause;
            }
        }
        best
    }
}

/// Per-origin cause means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginDelays {
    pub origin: String,
    #[serde(flatten)]
    pub means: CauseMeans,
}

/// An airport or carrier code with its flight count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeCount {
    pub code: String,
    pub flights: usize,
}

/// An airport or carrier code with its mean arrival delay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeMean {
    pub code: String,
    pub avg_delay: f64,
}

/// Mean arrival delay for one day of the week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDelay {
    pub day: &'static str,
    pub avg_delay: f64,
}

/// Every statistic of one run.
///
/// `Option` marks figures that can be undefined even for a non-empty table:
/// arrival delay and taxi-out may be missing on every row, and the
/// correlation needs two non-constant columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub flights_analyzed: usize,

    pub avg_delays: CauseMeans,
    pub most_common_delay: DelayCause,
    /// Sorted by carrier delay, highest first; ties by origin code.
    pub origin_delays: Vec<OriginDelays>,
    pub busiest_airport: CodeCount,

    pub avg_arrival_delay: Option<f64>,
    pub highest_arrival_delay_airport: Option<CodeMean>,
    pub carrier_late_aircraft_correlation: Option<f64>,
    pub most_common_destination: CodeCount,
    /// Sorted by mean, lowest first; ties Monday first.
    pub delay_by_day_of_week: Vec<DayDelay>,
    pub highest_delay_carrier: Option<CodeMean>,
    pub avg_taxi_out: Option<f64>,
    pub percentage_delayed: f64,

    pub delay_by_month: BTreeMap<u32, f64>,
    pub delay_by_carrier: BTreeMap<String, f64>,
    pub top_carrier_delay_origins: Vec<OriginDelays>,
}

use crate::analyzers::group::{GroupKey, GroupValue, count_by, group_rows, max_entry, mean_by};
use crate::analyzers::types::{
    AggregateResult, CauseMeans, CodeCount, CodeMean, DayDelay, OriginDelays,
};
use crate::analyzers::utility::{mean, pct, pearson};
use crate::clean::CleanTable;
use crate::error::{PipelineError, Result};
use crate::flight::{DelayCause, FlightRecord, day_name};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Number of origins kept in the carrier-delay ranking.
pub const TOP_ORIGINS: usize = 10;

/// Computes every statistic over a cleaned table.
///
/// Arrival delay and taxi-out may still be missing on some rows; each
/// statistic over those columns skips the missing rows on its own.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyDataset`] if no rows survived cleaning.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn aggregate(table: &CleanTable) -> Result<AggregateResult> {
    if table.is_empty() {
        return Err(PipelineError::EmptyDataset);
    }
    let rows = table.rows();

    let all: Vec<&FlightRecord> = rows.iter().collect();
    let avg_delays = CauseMeans::from_rows(&all).ok_or(PipelineError::EmptyDataset)?;
    let most_common_delay = avg_delays.max_cause();

    let origin_delays = origin_delays(rows);
    let top_carrier_delay_origins = origin_delays.iter().take(TOP_ORIGINS).cloned().collect();

    let busiest_airport = most_frequent(rows, GroupKey::Origin)?;
    let most_common_destination = most_frequent(rows, GroupKey::Destination)?;

    let arrivals: Vec<f64> = rows.iter().filter_map(|r| r.arr_delay).collect();
    let avg_arrival_delay = mean(&arrivals);

    let origin_arrivals = mean_by(rows, GroupKey::Origin, |r| r.arr_delay);
    let highest_arrival_delay_airport = highest_mean(&origin_arrivals);

    let carrier_arrivals = mean_by(rows, GroupKey::Carrier, |r| r.arr_delay);
    let highest_delay_carrier = highest_mean(&carrier_arrivals);
    let delay_by_carrier = carrier_arrivals
        .iter()
        .filter_map(|(k, v)| Some((k.as_code()?.to_string(), *v)))
        .collect();

    let carrier: Vec<f64> = table.cause_values(DelayCause::Carrier).collect();
    let late_aircraft: Vec<f64> = table.cause_values(DelayCause::LateAircraft).collect();
    let carrier_late_aircraft_correlation = pearson(&carrier, &late_aircraft);

    let mut delay_by_day_of_week: Vec<DayDelay> =
        mean_by(rows, GroupKey::DayOfWeek, |r| r.arr_delay)
            .into_iter()
            .filter_map(|(k, v)| {
                Some(DayDelay {
                    day: day_name(k.as_day()?),
                    avg_delay: v,
                })
            })
            .collect();
    delay_by_day_of_week.sort_by(|a, b| a.avg_delay.total_cmp(&b.avg_delay));

    let delay_by_month = mean_by(rows, GroupKey::Month, |r| r.arr_delay)
        .into_iter()
        .filter_map(|(k, v)| Some((k.as_month()?, v)))
        .collect();

    let taxi_out: Vec<f64> = rows.iter().filter_map(|r| r.taxi_out).collect();
    let avg_taxi_out = mean(&taxi_out);

    let delayed = arrivals.iter().filter(|&&d| d > 0.0).count();
    let percentage_delayed = pct(delayed, rows.len());

    debug!(
        origins = origin_delays.len(),
        carriers = carrier_arrivals.len(),
        with_arrival_delay = arrivals.len(),
        "Group statistics computed"
    );
    info!(
        most_common_delay = %most_common_delay,
        busiest_airport = %busiest_airport.code,
        percentage_delayed,
        "Aggregation complete"
    );

    Ok(AggregateResult {
        flights_analyzed: rows.len(),
        avg_delays,
        most_common_delay,
        origin_delays,
        busiest_airport,
        avg_arrival_delay,
        highest_arrival_delay_airport,
        carrier_late_aircraft_correlation,
        most_common_destination,
        delay_by_day_of_week,
        highest_delay_carrier,
        avg_taxi_out,
        percentage_delayed,
        delay_by_month,
        delay_by_carrier,
        top_carrier_delay_origins,
    })
}

/// Cause means per origin, highest carrier delay first.
fn origin_delays(rows: &[FlightRecord]) -> Vec<OriginDelays> {
    let mut out: Vec<OriginDelays> = group_rows(rows, GroupKey::Origin)
        .into_iter()
        .filter_map(|(k, group)| {
            Some(OriginDelays {
                origin: k.as_code()?.to_string(),
                means: CauseMeans::from_rows(&group)?,
            })
        })
        .collect();

    // Stable sort: equal carrier delays stay in origin order.
    out.sort_by(|a, b| {
        b.means
            .avg_carrier_delay
            .total_cmp(&a.means.avg_carrier_delay)
    });
    out
}

fn most_frequent(rows: &[FlightRecord], key: GroupKey) -> Result<CodeCount> {
    let counts = count_by(rows, key);
    let (code, flights) = max_entry(&counts).ok_or(PipelineError::EmptyDataset)?;
    Ok(CodeCount {
        code: code.to_string(),
        flights,
    })
}

fn highest_mean(means: &BTreeMap<GroupValue<'_>, f64>) -> Option<CodeMean> {
    max_entry(means).map(|(code, avg_delay)| CodeMean {
        code: code.to_string(),
        avg_delay,
    })
}

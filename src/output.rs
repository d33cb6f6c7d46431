//! Output formatting and persistence for aggregate results.
//!
//! Supports a plain-text report, pretty JSON, and writing either to a file.

use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::types::{AggregateResult, CodeMean, OriginDelays};

/// Renders `result` as the human-readable report.
pub fn render_text(result: &AggregateResult) -> String {
    TextReport(result).to_string()
}

/// Serializes `result` as pretty-printed JSON.
pub fn to_json(result: &AggregateResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes a rendered report to `path`, replacing any existing file.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("writing report to {}", path.display()))?;
    info!(path = %path.display(), bytes = contents.len(), "Report written");
    Ok(())
}

/// Logs the result using Rust's debug pretty-print format.
pub fn print_pretty(result: &AggregateResult) {
    debug!("{:#?}", result);
}

struct TextReport<'a>(&'a AggregateResult);

fn minutes(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2} minutes"),
        None => "n/a".to_string(),
    }
}

fn code_mean(value: &Option<CodeMean>) -> String {
    match value {
        Some(cm) => format!("{} ({:.2} minutes)", cm.code, cm.avg_delay),
        None => "n/a".to_string(),
    }
}

fn origin_table(f: &mut fmt::Formatter<'_>, origins: &[OriginDelays]) -> fmt::Result {
    writeln!(
        f,
        "{:<8}{:>14}{:>14}{:>14}{:>14}{:>18}",
        "Origin", "CarrierDelay", "WeatherDelay", "NASDelay", "SecurityDelay", "LateAircraftDelay"
    )?;
    for o in origins {
        writeln!(
            f,
            "{:<8}{:>14.2}{:>14.2}{:>14.2}{:>14.2}{:>18.2}",
            o.origin,
            o.means.avg_carrier_delay,
            o.means.avg_weather_delay,
            o.means.avg_nas_delay,
            o.means.avg_security_delay,
            o.means.avg_late_aircraft_delay
        )?;
    }
    Ok(())
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;

        writeln!(f, "Flights Analyzed: {}", r.flights_analyzed)?;

        writeln!(f, "\nAverage Delays:")?;
        for (cause, avg) in r.avg_delays.iter() {
            writeln!(f, "{cause}: {avg:.2}")?;
        }
        writeln!(f, "\nMost Common Delay Type: {}", r.most_common_delay)?;

        writeln!(
            f,
            "\nBusiest Airport: {} ({} flights)",
            r.busiest_airport.code, r.busiest_airport.flights
        )?;
        writeln!(f, "\nAverage Arrival Delay: {}", minutes(r.avg_arrival_delay))?;
        writeln!(
            f,
            "\nAirport with Highest Average Arrival Delay: {}",
            code_mean(&r.highest_arrival_delay_airport)
        )?;

        match r.carrier_late_aircraft_correlation {
            Some(c) => writeln!(f, "\nCorrelation between Carrier Delay and Late Aircraft Delay: {c:.2}")?,
            None => writeln!(f, "\nCorrelation between Carrier Delay and Late Aircraft Delay: n/a")?,
        }

        writeln!(
            f,
            "\nMost Common Destination Airport: {} ({} flights)",
            r.most_common_destination.code, r.most_common_destination.flights
        )?;

        writeln!(f, "\nAverage Delay per Day of Week:")?;
        for d in &r.delay_by_day_of_week {
            writeln!(f, "{}: {:.2}", d.day, d.avg_delay)?;
        }

        writeln!(
            f,
            "\nCarrier with Highest Average Delay: {}",
            code_mean(&r.highest_delay_carrier)
        )?;
        writeln!(f, "\nAverage Taxi-Out Time: {}", minutes(r.avg_taxi_out))?;
        writeln!(f, "\nPercentage of Flights Delayed: {:.2}%", r.percentage_delayed)?;

        writeln!(f, "\nAverage Delay per Month:")?;
        for (month, avg) in &r.delay_by_month {
            writeln!(f, "{month}: {avg:.2}")?;
        }

        writeln!(f, "\nAverage Delay per Carrier:")?;
        for (carrier, avg) in &r.delay_by_carrier {
            writeln!(f, "{carrier}: {avg:.2}")?;
        }

        writeln!(
            f,
            "\nTop {} Origins with Highest Carrier Delay:",
            r.top_carrier_delay_origins.len()
        )?;
        origin_table(f, &r.top_carrier_delay_origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate;
    use crate::clean::clean;
    use crate::flight::FlightTable;
    use crate::test_support::{TempDir, date, flight};

    fn sample() -> AggregateResult {
        let table = clean(FlightTable::from_rows(vec![
            flight(date(2024, 1, 1), "JFK", "LAX", "AA", [10.0, 0.0, 0.0, 0.0, 5.0], Some(20.0), Some(15.0)),
            flight(date(2024, 1, 8), "LAX", "JFK", "DL", [20.0, 5.0, 0.0, 0.0, 15.0], Some(-5.0), None),
        ]));
        aggregate(&table).unwrap()
    }

    #[test]
    fn test_render_text_contains_every_section() {
        let text = render_text(&sample());

        assert!(text.contains("avg_carrier_delay: 15.00"));
        assert!(text.contains("Most Common Delay Type: avg_carrier_delay"));
        assert!(text.contains("Busiest Airport: JFK (1 flights)"));
        assert!(text.contains("Average Arrival Delay: 7.50 minutes"));
        assert!(text.contains("Airport with Highest Average Arrival Delay: JFK (20.00 minutes)"));
        assert!(text.contains("Correlation between Carrier Delay and Late Aircraft Delay: 1.00"));
        assert!(text.contains("Monday: 7.50"));
        assert!(text.contains("Carrier with Highest Average Delay: AA (20.00 minutes)"));
        assert!(text.contains("Average Taxi-Out Time: 15.00 minutes"));
        assert!(text.contains("Percentage of Flights Delayed: 50.00%"));
        assert!(text.contains("Average Delay per Month:\n1: 7.50"));
        assert!(text.contains("DL: -5.00"));
        assert!(text.contains("Top 2 Origins with Highest Carrier Delay:"));
    }

    #[test]
    fn test_render_text_undefined_values() {
        let mut result = sample();
        result.avg_taxi_out = None;
        result.carrier_late_aircraft_correlation = None;

        let text = render_text(&result);
        assert!(text.contains("Average Taxi-Out Time: n/a"));
        assert!(text.contains("Late Aircraft Delay: n/a"));
    }

    #[test]
    fn test_to_json_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["most_common_delay"], "avg_carrier_delay");
        assert_eq!(value["avg_delays"]["avg_carrier_delay"], 15.0);
        assert_eq!(value["busiest_airport"]["code"], "JFK");
        assert_eq!(value["delay_by_month"]["1"], 7.5);
        assert_eq!(value["top_carrier_delay_origins"][0]["origin"], "LAX");
        assert_eq!(value["top_carrier_delay_origins"][0]["avg_carrier_delay"], 20.0);
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample());
    }

    #[test]
    fn test_write_report_creates_file() {
        let dir = TempDir::new("write_report");
        let path = dir.path().join("reports").join("summary.txt");

        write_report(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");

        write_report(&path, "replaced").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "replaced");
    }
}

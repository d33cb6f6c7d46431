//! Turns raw rows into [`FlightRecord`]s by parsing the flight date and
//! deriving day of week and month from it.

use crate::error::{PipelineError, Result};
use crate::flight::{FlightRecord, FlightTable, RawFlight};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

// Older BTS exports stamp a midnight time on every date.
static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%m/%d/%Y %I:%M:%S %p"];

/// Parses a flight date in any of the accepted layouts.
pub fn parse_flight_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Normalizes every row of `table`, keeping order and sources.
///
/// # Errors
///
/// Fails on the first row whose date cannot be parsed, naming its file and line.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn normalize(table: FlightTable<RawFlight>) -> Result<FlightTable<FlightRecord>> {
    let rows = table
        .rows()
        .iter()
        .map(|raw| {
            let date =
                parse_flight_date(&raw.flight_date).ok_or_else(|| PipelineError::MalformedDate {
                    path: table.source_path(raw.row).to_path_buf(),
                    line: raw.row.line,
                    value: raw.flight_date.clone(),
                })?;
            Ok(to_record(date, raw))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(rows = rows.len(), "Normalization complete");
    let (sources, _) = table.into_parts();
    Ok(FlightTable::new(sources, rows))
}

fn to_record(date: NaiveDate, raw: &RawFlight) -> FlightRecord {
    FlightRecord {
        carrier_delay: raw.carrier_delay,
        weather_delay: raw.weather_delay,
        nas_delay: raw.nas_delay,
        security_delay: raw.security_delay,
        late_aircraft_delay: raw.late_aircraft_delay,
        arr_delay: raw.arr_delay,
        taxi_out: raw.taxi_out,
        row: raw.row,
        ..FlightRecord::new(date, raw.origin.as_str(), raw.dest.as_str(), raw.carrier.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::flight::RowRef;
    use crate::test_support::date;
    use chrono::Weekday;
    use std::path::PathBuf;

    fn raw(flight_date: &str, line: u64) -> RawFlight {
        RawFlight {
            flight_date: flight_date.to_string(),
            origin: "JFK".to_string(),
            dest: "LAX".to_string(),
            carrier: "AA".to_string(),
            carrier_delay: Some(10.0),
            weather_delay: None,
            nas_delay: Some(0.0),
            security_delay: Some(0.0),
            late_aircraft_delay: Some(5.0),
            arr_delay: Some(20.0),
            taxi_out: None,
            row: RowRef { file: 0, line },
        }
    }

    #[test]
    fn test_parse_flight_date_formats() {
        assert_eq!(parse_flight_date("2024-01-08"), Some(date(2024, 1, 8)));
        assert_eq!(parse_flight_date("1/8/2024"), Some(date(2024, 1, 8)));
        assert_eq!(parse_flight_date("2024-01-08 00:00:00"), Some(date(2024, 1, 8)));
        assert_eq!(
            parse_flight_date("1/8/2024 12:00:00 AM"),
            Some(date(2024, 1, 8))
        );
        assert_eq!(parse_flight_date("2024-02-30"), None);
        assert_eq!(parse_flight_date("yesterday"), None);
        assert_eq!(parse_flight_date(""), None);
    }

    #[test]
    fn test_normalize_derives_day_and_month() {
        let table = FlightTable::new(
            vec![PathBuf::from("2024_01.csv")],
            vec![raw("2024-01-01", 2), raw("2024-03-16", 3)],
        );

        let out = normalize(table).unwrap();
        assert_eq!(out.sources(), &[PathBuf::from("2024_01.csv")]);

        let first = &out.rows()[0];
        assert_eq!(first.day_of_week, Weekday::Mon);
        assert_eq!(first.day_name(), "Monday");
        assert_eq!(first.month, 1);
        assert_eq!(first.carrier_delay, Some(10.0));
        assert_eq!(first.weather_delay, None);
        assert_eq!(first.row.line, 2);

        let second = &out.rows()[1];
        assert_eq!(second.day_name(), "Saturday");
        assert_eq!(second.month, 3);
    }

    #[test]
    fn test_normalize_malformed_date() {
        let table = FlightTable::new(
            vec![PathBuf::from("Dataset/2024_01.csv")],
            vec![raw("2024-01-01", 2), raw("01-2024-99", 3)],
        );

        let err = normalize(table).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDate);
        match err {
            PipelineError::MalformedDate { path, line, value } => {
                assert_eq!(path, PathBuf::from("Dataset/2024_01.csv"));
                assert_eq!(line, 3);
                assert_eq!(value, "01-2024-99");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_keeps_rows_missing_causes() {
        let mut missing = raw("2024-01-02", 2);
        missing.carrier_delay = None;
        let out = normalize(FlightTable::from_rows(vec![missing])).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.rows()[0].day_name(), "Tuesday");
    }
}

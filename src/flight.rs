//! Row and table types shared by every pipeline stage.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the five delay causes reported per flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DelayCause {
    #[serde(rename = "avg_carrier_delay")]
    Carrier,
    #[serde(rename = "avg_weather_delay")]
    Weather,
    #[serde(rename = "avg_nas_delay")]
    Nas,
    #[serde(rename = "avg_security_delay")]
    Security,
    #[serde(rename = "avg_late_aircraft_delay")]
    LateAircraft,
}

impl DelayCause {
    /// All causes, in report order. Ties between causes resolve to the earliest entry.
    pub const ALL: [DelayCause; 5] = [
        DelayCause::Carrier,
        DelayCause::Weather,
        DelayCause::Nas,
        DelayCause::Security,
        DelayCause::LateAircraft,
    ];

    /// CSV header of the column holding this cause.
    pub fn column(self) -> &'static str {
        match self {
            DelayCause::Carrier => "CarrierDelay",
            DelayCause::Weather => "WeatherDelay",
            DelayCause::Nas => "NASDelay",
            DelayCause::Security => "SecurityDelay",
            DelayCause::LateAircraft => "LateAircraftDelay",
        }
    }

    /// Key used for this cause in reports.
    pub fn report_key(self) -> &'static str {
        match self {
            DelayCause::Carrier => "avg_carrier_delay",
            DelayCause::Weather => "avg_weather_delay",
            DelayCause::Nas => "avg_nas_delay",
            DelayCause::Security => "avg_security_delay",
            DelayCause::LateAircraft => "avg_late_aircraft_delay",
        }
    }
}

impl fmt::Display for DelayCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.report_key())
    }
}

/// Full English weekday name, independent of locale.
pub fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Where a row came from: index into [`FlightTable::sources`] plus the CSV line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowRef {
    pub file: usize,
    pub line: u64,
}

/// A single row deserialized from an input CSV file, before normalization.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFlight {
    #[serde(rename = "FlightDate")]
    pub flight_date: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Dest")]
    pub dest: String,
    #[serde(rename = "Reporting_Airline")]
    pub carrier: String,

    #[serde(rename = "CarrierDelay", deserialize_with = "nullable_minutes")]
    pub carrier_delay: Option<f64>,
    #[serde(rename = "WeatherDelay", deserialize_with = "nullable_minutes")]
    pub weather_delay: Option<f64>,
    #[serde(rename = "NASDelay", deserialize_with = "nullable_minutes")]
    pub nas_delay: Option<f64>,
    #[serde(rename = "SecurityDelay", deserialize_with = "nullable_minutes")]
    pub security_delay: Option<f64>,
    #[serde(rename = "LateAircraftDelay", deserialize_with = "nullable_minutes")]
    pub late_aircraft_delay: Option<f64>,

    #[serde(rename = "ArrDelay", deserialize_with = "nullable_minutes")]
    pub arr_delay: Option<f64>,
    #[serde(rename = "TaxiOut", deserialize_with = "nullable_minutes")]
    pub taxi_out: Option<f64>,

    #[serde(skip)]
    pub row: RowRef,
}

/// Markers the BTS exports use for a missing number.
const NULL_MARKERS: &[&str] = &["na", "nan", "null"];

/// Parses a minutes column: empty cells, null markers and any spelling of NaN
/// become `None`. Infinite values are rejected, anything else must be a float.
fn nullable_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw else {
        return Ok(None);
    };

    let value = raw.trim();
    if value.is_empty() || NULL_MARKERS.iter().any(|m| value.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }

    let minutes = value
        .parse::<f64>()
        .map_err(|_| D::Error::custom(format!("expected a number of minutes, found {value:?}")))?;

    if minutes.is_nan() {
        Ok(None)
    } else if minutes.is_infinite() {
        Err(D::Error::custom(format!("expected a finite number of minutes, found {value:?}")))
    } else {
        Ok(Some(minutes))
    }
}

/// A normalized flight leg with its calendar fields derived.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub date: NaiveDate,
    pub day_of_week: Weekday,
    pub month: u32,

    pub origin: String,
    pub dest: String,
    pub carrier: String,

    pub carrier_delay: Option<f64>,
    pub weather_delay: Option<f64>,
    pub nas_delay: Option<f64>,
    pub security_delay: Option<f64>,
    pub late_aircraft_delay: Option<f64>,

    /// Minutes late on arrival; negative when early.
    pub arr_delay: Option<f64>,
    pub taxi_out: Option<f64>,

    pub row: RowRef,
}

impl FlightRecord {
    /// Creates a record with no delay data. Day of week and month are derived
    /// from `date` here, so they can never disagree with it.
    pub fn new(
        date: NaiveDate,
        origin: impl Into<String>,
        dest: impl Into<String>,
        carrier: impl Into<String>,
    ) -> Self {
        FlightRecord {
            date,
            day_of_week: date.weekday(),
            month: date.month(),
            origin: origin.into(),
            dest: dest.into(),
            carrier: carrier.into(),
            carrier_delay: None,
            weather_delay: None,
            nas_delay: None,
            security_delay: None,
            late_aircraft_delay: None,
            arr_delay: None,
            taxi_out: None,
            row: RowRef::default(),
        }
    }

    pub fn cause(&self, cause: DelayCause) -> Option<f64> {
        match cause {
            DelayCause::Carrier => self.carrier_delay,
            DelayCause::Weather => self.weather_delay,
            DelayCause::Nas => self.nas_delay,
            DelayCause::Security => self.security_delay,
            DelayCause::LateAircraft => self.late_aircraft_delay,
        }
    }

    /// True when all five delay causes are present.
    pub fn has_all_causes(&self) -> bool {
        DelayCause::ALL.iter().all(|&c| self.cause(c).is_some())
    }

    pub fn day_name(&self) -> &'static str {
        day_name(self.day_of_week)
    }
}

/// Ordered rows plus the files they were read from.
///
/// Row order is file discovery order, then line order within each file.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightTable<R> {
    sources: Vec<PathBuf>,
    rows: Vec<R>,
}

impl<R> FlightTable<R> {
    pub fn new(sources: Vec<PathBuf>, rows: Vec<R>) -> Self {
        Self { sources, rows }
    }

    /// A table with no source files, for rows built in memory.
    pub fn from_rows(rows: Vec<R>) -> Self {
        Self::new(Vec::new(), rows)
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Path of the file a [`RowRef`] points into, or an empty path for
    /// in-memory rows.
    pub fn source_path(&self, row: RowRef) -> &Path {
        self.sources
            .get(row.file)
            .map(PathBuf::as_path)
            .unwrap_or_else(|| Path::new(""))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_parts(self) -> (Vec<PathBuf>, Vec<R>) {
        (self.sources, self.rows)
    }
}

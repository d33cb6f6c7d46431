//! Shared helpers for unit tests.

use crate::flight::FlightRecord;
use chrono::NaiveDate;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub const HEADER: &str = "FlightDate,Origin,Dest,Reporting_Airline,CarrierDelay,WeatherDelay,NASDelay,SecurityDelay,LateAircraftDelay,ArrDelay,TaxiOut";

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Scratch directory under the system temp dir, removed on drop.
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    pub fn new(name: &str) -> Self {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = env::temp_dir().join(format!(
            "flight_delay_stats_{}_{}_{}",
            name,
            std::process::id(),
            n
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path.join(name);
        fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A record with every delay cause set, the usual shape after cleaning.
pub fn flight(
    day: NaiveDate,
    origin: &str,
    dest: &str,
    carrier: &str,
    causes: [f64; 5],
    arr_delay: Option<f64>,
    taxi_out: Option<f64>,
) -> FlightRecord {
    let [carrier_delay, weather, nas, security, late_aircraft] = causes;
    FlightRecord {
        carrier_delay: Some(carrier_delay),
        weather_delay: Some(weather),
        nas_delay: Some(nas),
        security_delay: Some(security),
        late_aircraft_delay: Some(late_aircraft),
        arr_delay,
        taxi_out,
        ..FlightRecord::new(day, origin, dest, carrier)
    }
}

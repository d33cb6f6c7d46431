use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::AggregateResult;
use crate::clean::clean;
use crate::error::Result;
use crate::flight::{FlightTable, RawFlight};
use crate::loader::{LoadOptions, load_dir};
use crate::normalize::normalize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Rows contributed by one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Row accounting for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub files: Vec<FileSummary>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub rows_analyzed: usize,
}

/// Loads every matching file in `dir` and runs the full pipeline over it.
pub async fn analyze_dir(
    dir: &Path,
    options: &LoadOptions,
) -> Result<(AggregateResult, PipelineSummary)> {
    let table = load_dir(dir, options).await?;
    analyze_table(table)
}

/// Normalizes, cleans and aggregates an already loaded table.
pub fn analyze_table(table: FlightTable<RawFlight>) -> Result<(AggregateResult, PipelineSummary)> {
    let files = file_summaries(&table);
    let rows_loaded = table.len();

    let normalized = normalize(table)?;
    let cleaned = clean(normalized);
    let result = aggregate(&cleaned)?;

    let summary = PipelineSummary {
        files,
        rows_loaded,
        rows_dropped: rows_loaded - cleaned.len(),
        rows_analyzed: cleaned.len(),
    };
    info!(
        files = summary.files.len(),
        rows_loaded = summary.rows_loaded,
        rows_dropped = summary.rows_dropped,
        "Pipeline complete"
    );

    Ok((result, summary))
}

fn file_summaries(table: &FlightTable<RawFlight>) -> Vec<FileSummary> {
    let mut counts = vec![0usize; table.sources().len()];
    for raw in table.rows() {
        if let Some(count) = counts.get_mut(raw.row.file) {
            *count += 1;
        }
    }

    table
        .sources()
        .iter()
        .zip(counts)
        .map(|(path, rows)| FileSummary {
            path: path.clone(),
            rows,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::loader::FileMatcher;
    use crate::test_support::{HEADER, TempDir};

    #[tokio::test]
    async fn test_analyze_dir_end_to_end() {
        let dir = TempDir::new("analyze_dir");
        dir.write(
            "2024_01.csv",
            &format!(
                "{HEADER}\n\
                 2024-01-01,JFK,LAX,AA,10,0,0,0,5,20,15\n\
                 2024-01-02,JFK,ORD,AA,,,,,,40,10\n"
            ),
        );
        dir.write(
            "2024_02.csv",
            &format!("{HEADER}\n2024-01-08,LAX,JFK,DL,20,5,0,0,15,-5,11\n"),
        );
        dir.write("2023_12.csv", &format!("{HEADER}\nnot-a-date,X,Y,Z,1,1,1,1,1,1,1\n"));

        let options = LoadOptions {
            matcher: FileMatcher::for_year(2024),
            concurrency: 2,
        };
        let (result, summary) = analyze_dir(dir.path(), &options).await.unwrap();

        assert_eq!(summary.rows_loaded, 3);
        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(summary.rows_analyzed, 2);
        let per_file: Vec<_> = summary.files.iter().map(|f| f.rows).collect();
        assert_eq!(per_file, vec![2, 1]);

        assert_eq!(result.flights_analyzed, 2);
        assert_eq!(result.avg_delays.avg_carrier_delay, 15.0);
        assert_eq!(result.percentage_delayed, 50.0);
    }

    #[tokio::test]
    async fn test_analyze_dir_malformed_date_aborts() {
        let dir = TempDir::new("analyze_bad_date");
        dir.write(
            "2024_01.csv",
            &format!("{HEADER}\n2024-01-01,JFK,LAX,AA,10,0,0,0,5,20,15\n2024/99/99,JFK,LAX,AA,10,0,0,0,5,20,15\n"),
        );

        let err = analyze_dir(dir.path(), &LoadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDate);
    }

    #[tokio::test]
    async fn test_analyze_dir_nan_cause_is_dropped_as_missing() {
        let dir = TempDir::new("analyze_nan_cause");
        dir.write(
            "2024_01.csv",
            &format!(
                "{HEADER}\n\
                 2024-01-01,JFK,LAX,AA,-nan,0,0,0,5,20,1\n\
                 2024-01-02,JFK,LAX,AA,10,0,0,0,6,20,1\n\
                 2024-01-03,JFK,LAX,AA,20,0,0,0,9,30,1\n"
            ),
        );

        let (result, summary) = analyze_dir(dir.path(), &LoadOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.rows_dropped, 1);
        assert_eq!(result.flights_analyzed, 2);
        assert_eq!(result.avg_delays.avg_carrier_delay, 15.0);
        let r = result.carrier_late_aircraft_correlation.unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_analyze_dir_infinite_cause_is_parse_error() {
        let dir = TempDir::new("analyze_inf_cause");
        dir.write(
            "2024_01.csv",
            &format!("{HEADER}\n2024-01-01,JFK,LAX,AA,inf,0,0,0,5,20,1\n"),
        );

        let err = analyze_dir(dir.path(), &LoadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_analyze_table_all_rows_dropped() {
        let raw = RawFlight {
            flight_date: "2024-01-01".to_string(),
            origin: "JFK".to_string(),
            dest: "LAX".to_string(),
            carrier: "AA".to_string(),
            carrier_delay: None,
            weather_delay: None,
            nas_delay: None,
            security_delay: None,
            late_aircraft_delay: None,
            arr_delay: Some(12.0),
            taxi_out: Some(9.0),
            row: Default::default(),
        };

        let err = analyze_table(FlightTable::from_rows(vec![raw])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyDataset);
    }
}

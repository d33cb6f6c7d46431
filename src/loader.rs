//! Discovers dated flight files in a directory and reads them into one table.
//!
//! Files are read on blocking worker tasks, at most `concurrency` at a time,
//! and stitched back together in discovery order so the resulting table does
//! not depend on which worker finished first.

use crate::error::{PipelineError, Result};
use crate::flight::{DelayCause, FlightTable, RawFlight, RowRef};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const KEY_COLUMNS: [&str; 4] = ["FlightDate", "Origin", "Dest", "Reporting_Airline"];
const TIMING_COLUMNS: [&str; 2] = ["ArrDelay", "TaxiOut"];

/// Header names every input file must carry, in file order. Extra columns
/// are ignored.
pub fn required_columns() -> impl Iterator<Item = &'static str> {
    KEY_COLUMNS
        .into_iter()
        .chain(DelayCause::ALL.map(DelayCause::column))
        .chain(TIMING_COLUMNS)
}

/// Tabular extensions we know how to read, with their field delimiter.
static DELIMITERS: &[(&str, u8)] = &[("csv", b','), ("tsv", b'\t')];

/// Selects input files named `YYYY_<anything>.<csv|tsv>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMatcher {
    year: Option<u16>,
}

impl FileMatcher {
    /// Accepts any four-digit year prefix.
    pub fn any_year() -> Self {
        Self { year: None }
    }

    /// Accepts only files whose prefix is exactly `year`.
    pub fn for_year(year: u16) -> Self {
        Self { year: Some(year) }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        let bytes = file_name.as_bytes();
        if bytes.len() < 5 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'_' {
            return false;
        }

        if let Some(year) = self.year {
            if file_name[..4] != format!("{year:04}") {
                return false;
            }
        }

        delimiter_for(Path::new(file_name)).is_some()
    }

    /// Human readable form of the pattern, used in errors and logs.
    pub fn describe(&self) -> String {
        let prefix = match self.year {
            Some(year) => format!("{year:04}"),
            None => "YYYY".to_string(),
        };
        let exts: Vec<&str> = DELIMITERS.iter().map(|(ext, _)| *ext).collect();
        format!("{prefix}_*.{{{}}}", exts.join(","))
    }
}

/// Loader settings.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub matcher: FileMatcher,
    /// Maximum number of files read at the same time.
    pub concurrency: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            matcher: FileMatcher::any_year(),
            concurrency: 4,
        }
    }
}

fn delimiter_for(path: &Path) -> Option<u8> {
    let ext = path.extension()?.to_str()?;
    DELIMITERS
        .iter()
        .find(|(known, _)| ext.eq_ignore_ascii_case(known))
        .map(|(_, delimiter)| *delimiter)
}

/// Lists the files in `dir` accepted by `matcher`, sorted by file name.
///
/// # Errors
///
/// Fails if `dir` is not a directory, cannot be listed, or holds no
/// matching file.
pub fn discover_files(dir: &Path, matcher: &FileMatcher) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(PipelineError::MissingDirectory(dir.to_path_buf()));
    }

    let io_err = |source: std::io::Error| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if !entry.file_type().map_err(io_err)?.is_file() {
            continue;
        }

        if let Some(name) = entry.file_name().to_str() {
            if matcher.matches(name) {
                files.push(entry.path());
            } else {
                debug!(file = name, "Skipping unmatched file");
            }
        }
    }

    if files.is_empty() {
        return Err(PipelineError::NoMatchingFiles {
            dir: dir.to_path_buf(),
            pattern: matcher.describe(),
        });
    }

    files.sort();
    Ok(files)
}

/// Reads one file into raw rows, tagging each with `file_index` and its line.
///
/// # Errors
///
/// Returns a parse error if the header lacks a required column or a row
/// cannot be decoded, and an ingest error if the file cannot be read.
pub fn load_file(path: &Path, file_index: usize) -> Result<Vec<RawFlight>> {
    let delimiter = delimiter_for(path).unwrap_or(b',');
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(file);

    let headers = rdr.headers().map_err(|e| csv_error(path, e))?.clone();
    let missing: Vec<String> = required_columns()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingColumns {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr
        .read_record(&mut record)
        .map_err(|e| csv_error(path, e))?
    {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let mut raw: RawFlight =
            record
                .deserialize(Some(&headers))
                .map_err(|e| PipelineError::Row {
                    path: path.to_path_buf(),
                    line,
                    message: e.to_string(),
                })?;
        raw.row = RowRef {
            file: file_index,
            line,
        };
        rows.push(raw);
    }

    debug!(file = %path.display(), rows = rows.len(), "File parsed");
    Ok(rows)
}

fn csv_error(path: &Path, err: csv::Error) -> PipelineError {
    let line = err.position().map(|p| p.line()).unwrap_or_default();
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PipelineError::Io {
            path: path.to_path_buf(),
            source,
        },
        _ => PipelineError::Row {
            path: path.to_path_buf(),
            line,
            message,
        },
    }
}

/// Reads every matching file in `dir` into a single table.
///
/// Rows keep file discovery order, then in-file order. The first file that
/// fails (in discovery order) aborts the load.
#[tracing::instrument(skip(dir, options), fields(dir = %dir.display(), pattern = %options.matcher.describe()))]
pub async fn load_dir(dir: &Path, options: &LoadOptions) -> Result<FlightTable<RawFlight>> {
    let files = discover_files(dir, &options.matcher)?;
    info!(file_count = files.len(), "Input files discovered");

    let batch_size = options.concurrency.max(1);
    let mut rows = Vec::new();

    for (batch_index, batch) in files.chunks(batch_size).enumerate() {
        let mut tasks = Vec::with_capacity(batch.len());

        for (offset, path) in batch.iter().enumerate() {
            let file_index = batch_index * batch_size + offset;
            let worker_path = path.clone();
            let task =
                tokio::task::spawn_blocking(move || load_file(&worker_path, file_index));
            tasks.push((path, task));
        }

        for (path, task) in tasks {
            let file_rows = task.await.map_err(|source| PipelineError::LoaderTask {
                path: path.clone(),
                source,
            })??;
            info!(file = %path.display(), rows = file_rows.len(), "File loaded");
            rows.extend(file_rows);
        }
    }

    info!(rows = rows.len(), "Load complete");
    Ok(FlightTable::new(files, rows))
}

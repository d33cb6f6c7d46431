//! Error types for the delay pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Coarse classification of a [`PipelineError`], one per failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Ingest,
    Parse,
    MalformedDate,
    EmptyDataset,
}

/// Every way a run can fail. Each message names the stage and, where one is
/// involved, the file and line.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("ingest error: input directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("ingest error: no files in {} match {pattern}", dir.display())]
    NoMatchingFiles { dir: PathBuf, pattern: String },

    #[error("ingest error: failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ingest error: loader task for {} failed: {source}", path.display())]
    LoaderTask {
        path: PathBuf,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("parse error: {} is missing required columns: {}", path.display(), missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("parse error: {} line {line}: {message}", path.display())]
    Row {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("normalize error: malformed date {value:?} in {} line {line}", path.display())]
    MalformedDate {
        path: PathBuf,
        line: u64,
        value: String,
    },

    #[error("aggregate error: no flights remain after cleaning")]
    EmptyDataset,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MissingDirectory(_)
            | PipelineError::NoMatchingFiles { .. }
            | PipelineError::Io { .. }
            | PipelineError::LoaderTask { .. } => ErrorKind::Ingest,
            PipelineError::MissingColumns { .. } | PipelineError::Row { .. } => ErrorKind::Parse,
            PipelineError::MalformedDate { .. } => ErrorKind::MalformedDate,
            PipelineError::EmptyDataset => ErrorKind::EmptyDataset,
        }
    }
}

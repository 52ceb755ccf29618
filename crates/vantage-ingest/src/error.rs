//! Error types for `vantage-ingest`.

use std::path::PathBuf;

use thiserror::Error;

/// Why an object could not be fetched from the data lake.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("object not found: {0}")]
  NotFound(String),

  #[error("permission denied: {0}")]
  PermissionDenied(String),

  #[error("fetch failed: {0}")]
  Other(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("csv error in {path}: {source}")]
  Csv {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("{dataset} file is missing column {column:?}")]
  MissingColumn {
    dataset: &'static str,
    column:  &'static str,
  },

  #[error("unknown dataset: {0:?}")]
  UnknownDataset(String),

  #[error("reader task failed: {0}")]
  Reader(#[from] tokio::task::JoinError),

  #[error(transparent)]
  Core(#[from] vantage_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

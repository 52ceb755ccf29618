//! Error type for `vantage-registry`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("registry returned {status} for {path}")]
  Status {
    status: reqwest::StatusCode,
    path:   String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

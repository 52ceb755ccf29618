//! Error types for `vantage-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("unknown energy rating band: {0:?}")]
  UnknownRatingBand(String),

  #[error("invalid postcode: {0:?}")]
  InvalidPostcode(String),
}

impl Error {
  /// Box a backend error raised through one of the store traits.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

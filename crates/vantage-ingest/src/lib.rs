//! Dataset ingestion for Vantage.
//!
//! Fetches raw files through an [`ObjectStore`] and loads them, in batches
//! of [`BATCH_SIZE`] rows, into any [`PropertyStore`]. Every write is
//! idempotent, so a file can be loaded twice without duplicating anything.
//!
//! [`PropertyStore`]: vantage_core::store::PropertyStore

pub mod dataset;
pub mod error;
pub mod lake;
mod pipeline;
mod reader;

pub use dataset::DatasetKind;
pub use error::{Error, FetchError, Result};
pub use lake::{LocalLake, ObjectStore};
pub use pipeline::Pipeline;
pub use reader::{BATCH_SIZE, Columns, Dataset, IngestSummary, load};

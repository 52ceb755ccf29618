//! Core types and trait definitions for the Vantage property graph.
//!
//! This crate has no HTTP or database dependencies. It owns
//! the record-linkage logic (normalisation, similarity scoring, match
//! strategies, the batch linker and the comparable-sales valuer) and the
//! abstractions the storage and registry crates implement.

pub mod address;
pub mod enrichment;
pub mod error;
pub mod geo;
pub mod linkage;
pub mod model;
pub mod registry;
pub mod similarity;
pub mod store;
pub mod valuation;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;

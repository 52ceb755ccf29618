//! HTTP client for the Companies House public data API.
//!
//! [`CompaniesHouseClient`] implements
//! [`CompanyRegistry`](vantage_core::registry::CompanyRegistry). Every call is
//! fail-soft: errors are logged at `warn` and surface as `None` or an empty
//! list.

mod client;
mod wire;

pub mod error;

pub use client::{CompaniesHouseClient, DEFAULT_BASE_URL, RegistryConfig};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;

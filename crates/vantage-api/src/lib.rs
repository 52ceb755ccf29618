//! Read-only JSON API for Vantage.
//!
//! Exposes an axum [`Router`] backed by any [`PropertyStore`]. Transport
//! concerns (binding, tracing layers) are the caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/` | Liveness and version |
//! | `GET` | `/distressed-assets` | `?limit=` (default 50) |
//! | `GET` | `/search` | `?query=` (required), `?limit=` (default 10) |
//! | `GET` | `/company/{id}/structure` | 404 if unknown |
//! | `GET` | `/company/{id}/charges` | 404 if unknown |
//! | `GET` | `/comps/{postcode}` | Comparable sales |

pub mod assets;
pub mod company;
pub mod comps;
pub mod error;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use serde::{Deserialize, Serialize};
use vantage_core::store::PropertyStore;

pub use error::ApiError;

/// Upper bound on any `?limit=`.
pub const MAX_LIMIT: usize = 1_000;

/// Response envelope for list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Listing<T> {
  pub count: usize,
  pub data:  Vec<T>,
}

impl<T> From<Vec<T>> for Listing<T> {
  fn from(data: Vec<T>) -> Self {
    Self {
      count: data.len(),
      data,
    }
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
  pub status:  String,
  pub version: String,
}

/// `GET /`
pub async fn root() -> Json<Status> {
  Json(Status {
    status:  "Vantage System Online".to_owned(),
    version: env!("CARGO_PKG_VERSION").to_owned(),
  })
}

/// Build the API router for `store`.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PropertyStore + 'static,
{
  Router::new()
    .route("/", get(root))
    // Assets
    .route("/distressed-assets", get(assets::distressed::<S>))
    .route("/search", get(assets::search::<S>))
    // Companies
    .route("/company/{id}/structure", get(company::structure::<S>))
    .route("/company/{id}/charges", get(company::charges::<S>))
    // Valuation
    .route("/comps/{postcode}", get(comps::handler::<S>))
    .with_state(store)
}

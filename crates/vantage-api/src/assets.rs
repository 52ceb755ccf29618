//! Handlers for property-level reads.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use vantage_core::{
  model::{DistressedAsset, Property},
  store::PropertyStore,
};

use crate::{ApiError, Listing, MAX_LIMIT};

const DEFAULT_DISTRESSED_LIMIT: usize = 50;
const DEFAULT_SEARCH_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct DistressedParams {
  pub limit: Option<usize>,
}

/// `GET /distressed-assets[?limit=<n>]`
///
/// Worst-rated first; unlinked assets carry no ownership fields.
pub async fn distressed<S: PropertyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<DistressedParams>,
) -> Result<Json<Listing<DistressedAsset>>, ApiError> {
  let limit = params
    .limit
    .unwrap_or(DEFAULT_DISTRESSED_LIMIT)
    .min(MAX_LIMIT);
  let assets = store
    .distressed_assets(limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(assets.into()))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  pub query: Option<String>,
  pub limit: Option<usize>,
}

/// `GET /search?query=<text>[&limit=<n>]`
pub async fn search<S: PropertyStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SearchParams>,
) -> Result<Json<Listing<Property>>, ApiError> {
  let query = params.query.as_deref().map(str::trim).unwrap_or_default();
  if query.is_empty() {
    return Err(ApiError::BadRequest("query must not be empty".into()));
  }
  let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_LIMIT);

  let properties = store
    .search_properties(query, limit)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(properties.into()))
}

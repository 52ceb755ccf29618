//! Handler for `GET /comps/{postcode}`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use vantage_core::{
  store::PropertyStore,
  valuation::{CompsReport, ValuationConfig, comparable_sales},
};

use crate::ApiError;

/// Recent sales in `postcode`, each sized against the energy assessments
/// in the same postcode where an address match is found.
pub async fn handler<S: PropertyStore>(
  State(store): State<Arc<S>>,
  Path(postcode): Path<String>,
) -> Result<Json<CompsReport>, ApiError> {
  let report = comparable_sales(store.as_ref(), &postcode, &ValuationConfig::default()).await?;
  Ok(Json(report))
}

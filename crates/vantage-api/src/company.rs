//! Handlers for `/company/{id}/…`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use vantage_core::{
  model::{Charge, CompanyStructure},
  store::PropertyStore,
};

use crate::{ApiError, Listing};

fn unknown(id: &str) -> ApiError { ApiError::NotFound(format!("company {id}")) }

/// `GET /company/{id}/structure`
pub async fn structure<S: PropertyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<CompanyStructure>, ApiError> {
  store
    .company_structure(&id)
    .await
    .map_err(ApiError::store)?
    .map(Json)
    .ok_or_else(|| unknown(&id))
}

/// `GET /company/{id}/charges`
pub async fn charges<S: PropertyStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Listing<Charge>>, ApiError> {
  store
    .company_charges(&id)
    .await
    .map_err(ApiError::store)?
    .map(|charges| Json(charges.into()))
    .ok_or_else(|| unknown(&id))
}

//! Comparable-sales valuation.
//!
//! Sales carry a price but no size. Each recent sale in a postcode is matched
//! at read time against the energy assessments in the same postcode to borrow
//! a floor area, giving a price per square foot. Nothing is written back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  address::normalize_address,
  linkage::{MatchStrategy, Selection},
  model::canonical_postcode,
  similarity::similarity,
  store::PropertyStore,
};

/// Square feet in one square metre.
pub const SQ_FT_PER_SQ_M: f64 = 10.764;

/// Default number of recent sales considered.
pub const COMPARABLE_SALES_LIMIT: usize = 20;

/// Price per square foot, or `None` when the floor area cannot size a sale
/// (missing, zero, negative or not finite).
pub fn price_per_sqft(price: i64, floor_area_sqm: f64) -> Option<f64> {
  if !floor_area_sqm.is_finite() || floor_area_sqm <= 0.0 {
    return None;
  }
  Some(price as f64 / floor_area_sqm / SQ_FT_PER_SQ_M)
}

/// Arithmetic mean over the sales that produced a price per square foot.
pub fn mean_price_per_sqft(sales: &[ComparableSale]) -> Option<f64> {
  let values: Vec<f64> = sales.iter().filter_map(|s| s.price_per_sqft).collect();
  if values.is_empty() {
    None
  } else {
    Some(values.iter().sum::<f64>() / values.len() as f64)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationConfig {
  pub strategy:   MatchStrategy,
  pub sale_limit: usize,
}

impl Default for ValuationConfig {
  fn default() -> Self {
    Self {
      strategy:   MatchStrategy::valuation(),
      sale_limit: COMPARABLE_SALES_LIMIT,
    }
  }
}

/// One sale, sized where a matching assessment was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableSale {
  pub transaction_id:      String,
  pub transfer_date:       NaiveDate,
  pub address:             String,
  pub price_paid:          i64,
  pub property_type:       Option<String>,
  /// Certificate of the assessment the sale was matched to.
  pub matched_certificate: Option<String>,
  pub match_score:         Option<f64>,
  pub floor_area_sqm:      Option<f64>,
  /// `None` for sales without a usable match; such sales are excluded from
  /// the average.
  pub price_per_sqft:      Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompsReport {
  pub postcode:               String,
  pub sales:                  Vec<ComparableSale>,
  pub matched:                usize,
  pub average_price_per_sqft: Option<f64>,
}

/// Build a comparable-sales report for `postcode`.
///
/// The assessment candidates depend only on the postcode, so they are
/// fetched once and normalised once for every sale.
pub async fn comparable_sales<S: PropertyStore>(
  store: &S,
  postcode: &str,
  config: &ValuationConfig,
) -> Result<CompsReport> {
  let postcode =
    canonical_postcode(postcode).ok_or_else(|| Error::InvalidPostcode(postcode.to_owned()))?;

  let sales = store
    .recent_sales(&postcode, config.sale_limit)
    .await
    .map_err(Error::store)?;

  if sales.is_empty() {
    info!(%postcode, "no recent sales to build comparables from");
    return Ok(CompsReport {
      postcode,
      sales: Vec::new(),
      matched: 0,
      average_price_per_sqft: None,
    });
  }

  let candidates = store
    .area_candidates(&postcode)
    .await
    .map_err(Error::store)?;
  let normalized_candidates: Vec<String> = candidates
    .iter()
    .map(|c| normalize_address(Some(&c.address)))
    .collect();

  let comps: Vec<ComparableSale> = sales
    .into_iter()
    .map(|sale| {
      let normalized = normalize_address(Some(&sale.full_address));
      let mut comp = ComparableSale {
        transaction_id:      sale.transaction_id,
        transfer_date:       sale.transfer_date,
        address:             sale.full_address,
        price_paid:          sale.price_paid,
        property_type:       sale.property_type,
        matched_certificate: None,
        match_score:         None,
        floor_area_sqm:      None,
        price_per_sqft:      None,
      };
      if normalized.is_empty() {
        return comp;
      }

      let scored = candidates
        .iter()
        .zip(&normalized_candidates)
        .map(|(c, n)| (c, similarity(&normalized, n)));
      if let Selection::Accepted(m) = config.strategy.select_scored(scored) {
        comp.matched_certificate = Some(m.candidate.certificate_id.clone());
        comp.match_score = Some(m.score);
        comp.floor_area_sqm = m.candidate.floor_area;
        comp.price_per_sqft = m
          .candidate
          .floor_area
          .and_then(|area| price_per_sqft(comp.price_paid, area));
        if comp.price_per_sqft.is_none() {
          debug!(
            transaction = %comp.transaction_id,
            certificate = %m.candidate.certificate_id,
            "matched assessment has no usable floor area"
          );
        }
      }
      comp
    })
    .collect();

  let matched = comps.iter().filter(|c| c.price_per_sqft.is_some()).count();
  let average_price_per_sqft = mean_price_per_sqft(&comps);
  info!(%postcode, sales = comps.len(), matched, "comparable sales valued");

  Ok(CompsReport {
    postcode,
    sales: comps,
    matched,
    average_price_per_sqft,
  })
}

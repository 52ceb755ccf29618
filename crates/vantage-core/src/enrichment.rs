//! Owner enrichment: resolve the companies behind distressed properties
//! against a corporate registry and record what it knows about them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  Error, Result,
  model::{CompanyUpdate, EnrichmentTarget},
  registry::{CompanyRegistry, REGISTRY_COUNTRY},
  store::PropertyStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentConfig {
  pub target_limit:  usize,
  /// Pause between targets, to stay inside the registry's rate limit.
  pub request_delay: Duration,
}

impl Default for EnrichmentConfig {
  fn default() -> Self {
    Self {
      target_limit:  10,
      request_delay: Duration::from_millis(600),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentReport {
  pub scanned:   usize,
  pub enriched:  usize,
  pub not_found: usize,
  pub failed:    usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichOutcome {
  Enriched { registry_number: String },
  NotFound,
}

pub struct OwnerEnricher<'a, S, R> {
  store:    &'a S,
  registry: &'a R,
  config:   EnrichmentConfig,
}

impl<'a, S: PropertyStore, R: CompanyRegistry> OwnerEnricher<'a, S, R> {
  pub fn new(store: &'a S, registry: &'a R, config: EnrichmentConfig) -> Self {
    Self {
      store,
      registry,
      config,
    }
  }

  pub async fn run(&self) -> Result<EnrichmentReport> {
    let targets = self
      .store
      .enrichment_targets(self.config.target_limit)
      .await
      .map_err(Error::store)?;
    info!(targets = targets.len(), "enriching corporate owners");

    let mut report = EnrichmentReport::default();
    for (n, target) in targets.iter().enumerate() {
      if n > 0 && !self.config.request_delay.is_zero() {
        tokio::time::sleep(self.config.request_delay).await;
      }
      report.scanned += 1;
      match self.enrich_one(target).await {
        Ok(EnrichOutcome::Enriched { .. }) => report.enriched += 1,
        Ok(EnrichOutcome::NotFound) => report.not_found += 1,
        Err(e) => {
          warn!(company = %target.company_number, error = %e, "enrichment failed; continuing");
          report.failed += 1;
        }
      }
    }

    info!(
      scanned = report.scanned,
      enriched = report.enriched,
      not_found = report.not_found,
      failed = report.failed,
      "owner enrichment complete"
    );
    Ok(report)
  }

  pub async fn enrich_one(&self, target: &EnrichmentTarget) -> Result<EnrichOutcome> {
    let Some(hit) = self.registry.search_by_name(&target.name).await else {
      debug!(company = %target.company_number, name = %target.name, "no registry match");
      self
        .store
        .record_registry_miss(&target.company_number)
        .await
        .map_err(Error::store)?;
      return Ok(EnrichOutcome::NotFound);
    };

    let number = hit.company_number.as_str();
    let profile = self.registry.get_profile(number).await;
    let officers = self
      .registry
      .get_officers(number)
      .await
      .into_iter()
      .filter(|o| o.is_active())
      .collect();
    let controllers = self.registry.get_controllers(number).await;
    let charges = self.registry.get_charges(number).await;

    let status = profile
      .as_ref()
      .and_then(|p| p.company_status.clone())
      .or_else(|| hit.company_status.clone())
      .unwrap_or_else(|| "active".to_owned());
    let official_name = profile
      .as_ref()
      .map(|p| p.company_name.clone())
      .unwrap_or_else(|| hit.title.clone());

    let update = CompanyUpdate {
      official_name: Some(official_name),
      status: Some(status),
      incorporation_country: Some(REGISTRY_COUNTRY.to_owned()),
      registry_number: Some(hit.company_number.clone()),
      officers,
      controllers,
      charges,
    };

    let applied = self
      .store
      .apply_company_update(&target.company_number, update)
      .await
      .map_err(Error::store)?;
    if !applied {
      return Ok(EnrichOutcome::NotFound);
    }

    info!(
      company = %target.company_number,
      registry_number = %hit.company_number,
      title = %hit.title,
      "company enriched"
    );
    Ok(EnrichOutcome::Enriched {
      registry_number: hit.company_number,
    })
  }
}

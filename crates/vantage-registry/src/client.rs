//! [`CompaniesHouseClient`]: the registry implementation of
//! [`CompanyRegistry`].

use std::{future::Future, time::Duration};

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use vantage_core::{
  model::{Charge, Controller, Officer},
  registry::{CompanyMatch, CompanyProfile, CompanyRegistry},
};

use crate::{
  Error, Result,
  wire::{ChargeItem, Items, OfficerItem, Profile, PscItem, SearchItem},
};

pub const DEFAULT_BASE_URL: &str = "https://api.company-information.service.gov.uk";

/// Connection settings for the registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
  pub base_url: String,
  /// Sent as the Basic-auth username with an empty password. With no key
  /// the client never makes a request.
  pub api_key:  Option<String>,
  pub timeout:  Duration,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_BASE_URL.to_owned(),
      api_key:  None,
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async client for the Companies House REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct CompaniesHouseClient {
  client: Client,
  config: RegistryConfig,
}

impl CompaniesHouseClient {
  pub fn new(config: RegistryConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    if config.api_key.is_none() {
      warn!("no Companies House API key configured; registry lookups are disabled");
    }
    Ok(Self { client, config })
  }

  pub fn has_key(&self) -> bool { self.config.api_key.is_some() }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET path` and decode the body. `Ok(None)` when no key is configured.
  async fn get<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<Option<T>> {
    let Some(key) = self.config.api_key.as_deref() else {
      return Ok(None);
    };

    let resp = self
      .client
      .get(self.url(path))
      .basic_auth(key, None::<&str>)
      .header(reqwest::header::ACCEPT, "application/json")
      .query(query)
      .send()
      .await?;

    match resp.status() {
      StatusCode::OK => Ok(Some(resp.json().await?)),
      status => Err(Error::Status {
        status,
        path: path.to_owned(),
      }),
    }
  }

  /// Run a lookup, logging and swallowing any failure.
  async fn soft<T, F>(&self, what: &str, id: &str, call: F) -> Option<T>
  where
    F: Future<Output = Result<Option<T>>>,
  {
    match call.await {
      Ok(found) => found,
      Err(Error::Status {
        status: StatusCode::NOT_FOUND,
        ..
      }) => {
        debug!(lookup = what, id, "not found in registry");
        None
      }
      Err(e) => {
        warn!(lookup = what, id, error = %e, "registry lookup failed");
        None
      }
    }
  }

  async fn list<T, U>(&self, what: &str, company_number: &str, suffix: &str) -> Vec<U>
  where
    T: DeserializeOwned,
    U: From<T>,
  {
    let path = format!("/company/{company_number}{suffix}");
    self
      .soft(what, company_number, self.get::<Items<T>>(&path, &[]))
      .await
      .map(|page| page.items.into_iter().map(U::from).collect())
      .unwrap_or_default()
  }
}

impl CompanyRegistry for CompaniesHouseClient {
  async fn search_by_name(&self, name: &str) -> Option<CompanyMatch> {
    let query = [("q", name), ("items_per_page", "1")];
    let page = self
      .soft(
        "search",
        name,
        self.get::<Items<SearchItem>>("/search/companies", &query),
      )
      .await?;
    page.items.into_iter().next().map(CompanyMatch::from)
  }

  async fn get_profile(&self, company_number: &str) -> Option<CompanyProfile> {
    let path = format!("/company/{company_number}");
    self
      .soft("profile", company_number, self.get::<Profile>(&path, &[]))
      .await
      .map(CompanyProfile::from)
  }

  async fn get_officers(&self, company_number: &str) -> Vec<Officer> {
    self
      .list::<OfficerItem, _>("officers", company_number, "/officers")
      .await
  }

  async fn get_controllers(&self, company_number: &str) -> Vec<Controller> {
    self
      .list::<PscItem, _>("psc", company_number, "/persons-with-significant-control")
      .await
  }

  async fn get_charges(&self, company_number: &str) -> Vec<Charge> {
    self
      .list::<ChargeItem, _>("charges", company_number, "/charges")
      .await
  }
}

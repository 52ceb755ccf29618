//! The `CompanyRegistry` trait.
//!
//! A corporate registry resolves a proprietor name to an official company and
//! supplies its officers, controllers and charges. Implementations are
//! fail-soft: transport and HTTP failures surface as `None` or an empty list,
//! never as an error, so one unreachable company cannot stop an enrichment
//! run.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Charge, Controller, Officer};

/// Top hit of a name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyMatch {
  pub company_number:  String,
  pub title:           String,
  pub company_status:  Option<String>,
  pub address_snippet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
  pub company_number:   String,
  pub company_name:     String,
  pub company_status:   Option<String>,
  /// Registry jurisdiction code, e.g. `england-wales`.
  pub jurisdiction:     Option<String>,
  pub date_of_creation: Option<NaiveDate>,
}

pub trait CompanyRegistry: Send + Sync {
  /// The single best match for `name`, if any.
  fn search_by_name<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Option<CompanyMatch>> + Send + 'a;

  fn get_profile<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Option<CompanyProfile>> + Send + 'a;

  fn get_officers<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Vec<Officer>> + Send + 'a;

  /// Persons with significant control.
  fn get_controllers<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Vec<Controller>> + Send + 'a;

  fn get_charges<'a>(
    &'a self,
    company_number: &'a str,
  ) -> impl Future<Output = Vec<Charge>> + Send + 'a;
}

/// Country of incorporation recorded for every registry hit. The registry
/// only holds UK-incorporated companies, so its jurisdiction codes are not
/// consulted.
pub const REGISTRY_COUNTRY: &str = "United Kingdom";

//! JSON shapes returned by the registry, and their conversion into domain
//! types. Only the fields we keep are declared.

use chrono::NaiveDate;
use serde::Deserialize;
use vantage_core::{
  model::{Charge, Controller, Officer},
  registry::{CompanyMatch, CompanyProfile},
};

/// Every list endpoint wraps its rows in `items`.
#[derive(Debug, Deserialize)]
pub struct Items<T> {
  #[serde(default = "Vec::new")]
  pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct SearchItem {
  pub company_number:  String,
  pub title:           String,
  pub company_status:  Option<String>,
  pub address_snippet: Option<String>,
}

impl From<SearchItem> for CompanyMatch {
  fn from(item: SearchItem) -> Self {
    Self {
      company_number:  item.company_number,
      title:           item.title,
      company_status:  item.company_status,
      address_snippet: item.address_snippet,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct Profile {
  pub company_number:   String,
  pub company_name:     String,
  pub company_status:   Option<String>,
  pub jurisdiction:     Option<String>,
  pub date_of_creation: Option<NaiveDate>,
}

impl From<Profile> for CompanyProfile {
  fn from(p: Profile) -> Self {
    Self {
      company_number:   p.company_number,
      company_name:     p.company_name,
      company_status:   p.company_status,
      jurisdiction:     p.jurisdiction,
      date_of_creation: p.date_of_creation,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct OfficerItem {
  pub name:         String,
  pub officer_role: Option<String>,
  pub appointed_on: Option<NaiveDate>,
  pub resigned_on:  Option<NaiveDate>,
}

impl From<OfficerItem> for Officer {
  fn from(o: OfficerItem) -> Self {
    Self {
      name:         o.name,
      role:         o.officer_role,
      appointed_on: o.appointed_on,
      resigned_on:  o.resigned_on,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct PscItem {
  /// Absent for some statement-only entries.
  #[serde(default)]
  pub name:               String,
  pub kind:               Option<String>,
  #[serde(default)]
  pub natures_of_control: Vec<String>,
  pub notified_on:        Option<NaiveDate>,
}

impl From<PscItem> for Controller {
  fn from(p: PscItem) -> Self {
    Self {
      name:               p.name,
      kind:               p.kind,
      natures_of_control: p.natures_of_control,
      notified_on:        p.notified_on,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ChargeItem {
  pub charge_code:      Option<String>,
  pub id:               Option<String>,
  pub charge_number:    Option<i64>,
  pub status:           Option<String>,
  pub created_on:       Option<NaiveDate>,
  #[serde(default)]
  pub persons_entitled: Vec<PersonEntitled>,
  pub particulars:      Option<Particulars>,
}

#[derive(Debug, Deserialize)]
pub struct PersonEntitled {
  pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Particulars {
  pub description: Option<String>,
}

impl From<ChargeItem> for Charge {
  fn from(c: ChargeItem) -> Self {
    let charge_id = c
      .charge_code
      .or(c.id)
      .or_else(|| c.charge_number.map(|n| n.to_string()))
      .unwrap_or_default();
    Self {
      charge_id,
      status: c.status,
      created_on: c.created_on,
      persons_entitled: c.persons_entitled.into_iter().map(|p| p.name).collect(),
      description: c.particulars.and_then(|p| p.description),
    }
  }
}

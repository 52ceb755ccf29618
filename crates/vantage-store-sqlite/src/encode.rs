//! Encoding and decoding helpers between domain types and the plain column
//! values stored in SQLite.
//!
//! Dates are stored as `YYYY-MM-DD` text so they sort lexically. Rating bands
//! are their single letter. List-valued registry fields are compact JSON.

use chrono::NaiveDate;
use vantage_core::model::{
  Charge, Controller, CorporateEntity, DistressedAsset, LinkTarget, Officer, OwnershipTitle,
  RatingBand, SaleTransaction,
};

use crate::{Error, Result};

// ─── Dates ───────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Bands & lists ───────────────────────────────────────────────────────────

pub fn decode_band(s: &str) -> Result<RatingBand> { Ok(s.parse()?) }

pub fn encode_list(items: &[String]) -> Result<String> { Ok(serde_json::to_string(items)?) }

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub struct RawLinkTarget {
  pub uprn:        String,
  pub address:     String,
  pub postcode:    String,
  pub rating_band: String,
}

impl RawLinkTarget {
  pub fn into_target(self) -> Result<LinkTarget> {
    Ok(LinkTarget {
      uprn:        self.uprn,
      address:     self.address,
      postcode:    self.postcode,
      rating_band: decode_band(&self.rating_band)?,
    })
  }
}

pub struct RawSale {
  pub transaction_id: String,
  pub price_paid:     i64,
  pub transfer_date:  String,
  pub postcode:       String,
  pub full_address:   String,
  pub property_type:  Option<String>,
}

impl RawSale {
  pub fn into_sale(self) -> Result<SaleTransaction> {
    Ok(SaleTransaction {
      transaction_id: self.transaction_id,
      price_paid:     self.price_paid,
      transfer_date:  decode_date(&self.transfer_date)?,
      postcode:       self.postcode,
      full_address:   self.full_address,
      property_type:  self.property_type,
    })
  }
}

/// A `properties ⋈ energy_assessments` row with its optional ownership join.
pub struct RawDistressed {
  pub uprn:                  String,
  pub address:               String,
  pub postcode:              Option<String>,
  pub rating_band:           String,
  pub property_type:         Option<String>,
  pub title_number:          Option<String>,
  pub proprietor_name:       Option<String>,
  pub registered_on:         Option<String>,
  pub company_number:        Option<String>,
  pub company_name:          Option<String>,
  pub incorporation_country: Option<String>,
}

impl RawDistressed {
  pub fn into_asset(self) -> Result<DistressedAsset> {
    Ok(DistressedAsset {
      uprn:                  self.uprn,
      address:               self.address,
      postcode:              self.postcode,
      rating_band:           decode_band(&self.rating_band)?,
      property_type:         self.property_type,
      title_number:          self.title_number,
      proprietor_name:       self.proprietor_name,
      registered_on:         decode_opt_date(self.registered_on)?,
      company_number:        self.company_number,
      company_name:          self.company_name,
      incorporation_country: self.incorporation_country,
    })
  }
}

pub fn company_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CorporateEntity> {
  Ok(CorporateEntity {
    company_number:        row.get(0)?,
    name:                  row.get(1)?,
    status:                row.get(2)?,
    incorporation_country: row.get(3)?,
    category:              row.get(4)?,
    registry_number:       row.get(5)?,
  })
}

pub struct RawTitle {
  pub title_number:       String,
  pub company_number:     Option<String>,
  pub proprietor_name:    Option<String>,
  pub proprietor_address: Option<String>,
  pub registered_on:      Option<String>,
  pub price_paid:         Option<i64>,
}

impl RawTitle {
  pub fn into_title(self) -> Result<OwnershipTitle> {
    Ok(OwnershipTitle {
      title_number:       self.title_number,
      company_number:     self.company_number,
      proprietor_name:    self.proprietor_name,
      proprietor_address: self.proprietor_address,
      registered_on:      decode_opt_date(self.registered_on)?,
      price_paid:         self.price_paid,
    })
  }
}

pub struct RawOfficer {
  pub name:         String,
  pub role:         Option<String>,
  pub appointed_on: Option<String>,
  pub resigned_on:  Option<String>,
}

impl RawOfficer {
  pub fn into_officer(self) -> Result<Officer> {
    Ok(Officer {
      name:         self.name,
      role:         self.role,
      appointed_on: decode_opt_date(self.appointed_on)?,
      resigned_on:  decode_opt_date(self.resigned_on)?,
    })
  }
}

pub struct RawController {
  pub name:               String,
  pub kind:               Option<String>,
  pub natures_of_control: String,
  pub notified_on:        Option<String>,
}

impl RawController {
  pub fn into_controller(self) -> Result<Controller> {
    Ok(Controller {
      name:               self.name,
      kind:               self.kind,
      natures_of_control: decode_list(&self.natures_of_control)?,
      notified_on:        decode_opt_date(self.notified_on)?,
    })
  }
}

pub struct RawCharge {
  pub charge_id:        String,
  pub status:           Option<String>,
  pub created_on:       Option<String>,
  pub persons_entitled: String,
  pub description:      Option<String>,
}

impl RawCharge {
  pub fn into_charge(self) -> Result<Charge> {
    Ok(Charge {
      charge_id:        self.charge_id,
      status:           self.status,
      created_on:       decode_opt_date(self.created_on)?,
      persons_entitled: decode_list(&self.persons_entitled)?,
      description:      self.description,
    })
  }
}

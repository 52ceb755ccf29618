//! Entity types shared by every crate in the workspace.
//!
//! Each entity is owned by the persistence layer. The linkage engine writes
//! exactly one field, [`Property::title_number`], and only through
//! [`PropertyStore::link_title`](crate::store::PropertyStore::link_title).

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Prefix for property references synthesised from ownership titles, which
/// carry no UPRN of their own.
pub const TITLE_REF_PREFIX: &str = "TITLE:";

/// Incorporation country recorded for proprietors the registry has not
/// resolved yet.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Status recorded for a company the registry search did not find.
pub const STATUS_NOT_FOUND: &str = "not_found";

// ─── Rating band ─────────────────────────────────────────────────────────────

/// Energy-efficiency rating band. Ordinal: `A` is best, `G` worst.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatingBand {
  A,
  B,
  C,
  D,
  E,
  F,
  G,
}

impl RatingBand {
  /// The bands that mark an asset as distressed.
  pub const DISTRESSED: [RatingBand; 2] = [RatingBand::F, RatingBand::G];

  pub fn is_distressed(self) -> bool { Self::DISTRESSED.contains(&self) }

  pub fn as_str(self) -> &'static str {
    match self {
      RatingBand::A => "A",
      RatingBand::B => "B",
      RatingBand::C => "C",
      RatingBand::D => "D",
      RatingBand::E => "E",
      RatingBand::F => "F",
      RatingBand::G => "G",
    }
  }
}

impl fmt::Display for RatingBand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RatingBand {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_uppercase().as_str() {
      "A" | "A+" => Ok(RatingBand::A),
      "B" => Ok(RatingBand::B),
      "C" => Ok(RatingBand::C),
      "D" => Ok(RatingBand::D),
      "E" => Ok(RatingBand::E),
      "F" => Ok(RatingBand::F),
      "G" => Ok(RatingBand::G),
      _ => Err(Error::UnknownRatingBand(s.to_owned())),
    }
  }
}

// ─── Postcodes ───────────────────────────────────────────────────────────────

/// Canonical form of a UK postcode: trimmed, uppercased, single inner space.
///
/// Returns `None` for blank input. Postcodes are the blocking key, so every
/// write and every query passes through here before an exact comparison.
pub fn canonical_postcode(raw: &str) -> Option<String> {
  let compact: Vec<char> = raw
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_uppercase)
    .collect();
  match compact.len() {
    0 => None,
    // Outward codes run 2–4 characters; the inward code is always 3.
    n if n > 3 => {
      let (outward, inward) = compact.split_at(n - 3);
      Some(format!(
        "{} {}",
        outward.iter().collect::<String>(),
        inward.iter().collect::<String>()
      ))
    }
    _ => Some(compact.into_iter().collect()),
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

/// A physical property, keyed by its UPRN-equivalent reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
  pub uprn:         String,
  pub address:      String,
  pub postcode:     Option<String>,
  /// The linkage edge. `None` until the batch linker (or the ownership
  /// dataset itself) supplies it.
  pub title_number: Option<String>,
  pub latitude:     Option<f64>,
  pub longitude:    Option<f64>,
}

impl Property {
  /// A property stub with no title and no coordinates.
  pub fn stub(uprn: impl Into<String>, address: impl Into<String>, postcode: Option<String>) -> Self {
    Self {
      uprn: uprn.into(),
      address: address.into(),
      postcode,
      title_number: None,
      latitude: None,
      longitude: None,
    }
  }

  /// Whether this row was contributed by the ownership dataset rather than
  /// by an energy assessment.
  pub fn is_ownership_stub(&self) -> bool { self.uprn.starts_with(TITLE_REF_PREFIX) }

  /// The stub an ownership title contributes to the property table.
  pub fn for_title(title_number: &str, address: impl Into<String>, postcode: Option<String>) -> Self {
    Self {
      uprn: format!("{TITLE_REF_PREFIX}{title_number}"),
      address: address.into(),
      postcode,
      title_number: Some(title_number.to_owned()),
      latitude: None,
      longitude: None,
    }
  }
}

/// An energy performance certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyAssessment {
  pub certificate_id:  String,
  pub uprn:            String,
  pub rating_band:     RatingBand,
  /// Square metres.
  pub floor_area:      Option<f64>,
  pub property_type:   Option<String>,
  pub inspection_date: Option<NaiveDate>,
  /// Always written as `true` by ingestion; never derived from
  /// `inspection_date`.
  pub is_latest:       bool,
}

/// A registered ownership title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipTitle {
  pub title_number:       String,
  pub company_number:     Option<String>,
  pub proprietor_name:    Option<String>,
  pub proprietor_address: Option<String>,
  pub registered_on:      Option<NaiveDate>,
  pub price_paid:         Option<i64>,
}

/// A corporate proprietor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateEntity {
  /// The reference the ownership dataset used; kept as the key even when
  /// the registry resolves to a different official number.
  pub company_number:        String,
  pub name:                  String,
  pub status:                Option<String>,
  pub incorporation_country: Option<String>,
  pub category:              Option<String>,
  /// Official registry number, once enrichment resolved one.
  pub registry_number:       Option<String>,
}

/// A company officer (director, secretary, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Officer {
  pub name:         String,
  pub role:         Option<String>,
  pub appointed_on: Option<NaiveDate>,
  pub resigned_on:  Option<NaiveDate>,
}

impl Officer {
  pub fn is_active(&self) -> bool { self.resigned_on.is_none() }
}

/// A person or entity with significant control over a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
  pub name:               String,
  pub kind:               Option<String>,
  pub natures_of_control: Vec<String>,
  pub notified_on:        Option<NaiveDate>,
}

/// A charge (mortgage/debenture) registered against a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
  pub charge_id:        String,
  pub status:           Option<String>,
  pub created_on:       Option<NaiveDate>,
  pub persons_entitled: Vec<String>,
  pub description:      Option<String>,
}

/// A price-paid transaction. Never linked to a property by a persisted edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleTransaction {
  pub transaction_id: String,
  pub price_paid:     i64,
  pub transfer_date:  NaiveDate,
  pub postcode:       String,
  pub full_address:   String,
  pub property_type:  Option<String>,
}

/// One row of the postcode geocoding index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcodeLocation {
  pub postcode:      String,
  pub eastings:      i64,
  pub northings:     i64,
  pub latitude:      f64,
  pub longitude:     f64,
  pub district_code: Option<String>,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// An unlinked distressed property the batch linker will try to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkTarget {
  pub uprn:        String,
  pub address:     String,
  pub postcode:    String,
  pub rating_band: RatingBand,
}

/// A property in the target's postcode that already carries a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleCandidate {
  pub uprn:         String,
  pub address:      String,
  pub title_number: String,
}

/// An energy assessment joined to its property, used to size a sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaCandidate {
  pub certificate_id: String,
  pub uprn:           String,
  pub address:        String,
  pub floor_area:     Option<f64>,
}

/// A row of the distressed-asset scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistressedAsset {
  pub uprn:                  String,
  pub address:               String,
  pub postcode:              Option<String>,
  pub rating_band:           RatingBand,
  pub property_type:         Option<String>,
  pub title_number:          Option<String>,
  pub proprietor_name:       Option<String>,
  pub registered_on:         Option<NaiveDate>,
  pub company_number:        Option<String>,
  pub company_name:          Option<String>,
  pub incorporation_country: Option<String>,
}

/// The ownership structure behind a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyStructure {
  pub company:     CorporateEntity,
  pub officers:    Vec<Officer>,
  pub controllers: Vec<Controller>,
  pub titles:      Vec<OwnershipTitle>,
}

/// A company the owner-enrichment job should resolve against the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentTarget {
  pub company_number: String,
  pub name:           String,
}

/// Everything the registry told us about a company, written in one go.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompanyUpdate {
  pub official_name:         Option<String>,
  pub status:                Option<String>,
  pub incorporation_country: Option<String>,
  pub registry_number:       Option<String>,
  pub officers:              Vec<Officer>,
  pub controllers:           Vec<Controller>,
  pub charges:               Vec<Charge>,
}

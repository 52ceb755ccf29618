//! The dataset layouts that feed the property graph.

mod codepoint;
mod energy;
mod ownership;
mod price_paid;

use std::{fmt, str::FromStr};

pub use codepoint::PostcodeIndex;
pub use energy::EnergyRatings;
pub use ownership::{OwnershipRow, OwnershipTitles};
pub use price_paid::PricePaid;

use crate::Error;

/// The datasets `vantage ingest` knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
  /// Non-domestic energy performance certificates.
  Epc,
  /// Corporate and commercial ownership titles.
  Ccod,
  /// Price-paid sale transactions.
  Ppd,
  /// Code-Point Open postcode centroids.
  Codepoint,
}

impl DatasetKind {
  pub fn as_str(self) -> &'static str {
    match self {
      DatasetKind::Epc => "epc",
      DatasetKind::Ccod => "ccod",
      DatasetKind::Ppd => "ppd",
      DatasetKind::Codepoint => "codepoint",
    }
  }
}

impl fmt::Display for DatasetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for DatasetKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Error> {
    match s.trim().to_ascii_lowercase().as_str() {
      "epc" => Ok(DatasetKind::Epc),
      "ccod" => Ok(DatasetKind::Ccod),
      "ppd" => Ok(DatasetKind::Ppd),
      "codepoint" | "code-point" => Ok(DatasetKind::Codepoint),
      _ => Err(Error::UnknownDataset(s.to_owned())),
    }
  }
}

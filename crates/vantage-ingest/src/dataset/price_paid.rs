use chrono::Datelike;
use csv::StringRecord;
use vantage_core::{
  model::{SaleTransaction, canonical_postcode},
  store::PropertyStore,
};

use crate::{
  Result,
  reader::{Columns, Dataset, field, parse_date, parse_price},
};

// Headerless 16-column layout.
const ID: usize = 0;
const PRICE: usize = 1;
const DATE: usize = 2;
const POSTCODE: usize = 3;
const PROPERTY_TYPE: usize = 4;
const PAON: usize = 7;
const SAON: usize = 8;
const STREET: usize = 9;

/// Price-paid sale transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PricePaid {
  /// Drop sales transferred before this calendar year.
  pub since_year: Option<i32>,
}

impl PricePaid {
  pub fn since(year: i32) -> Self {
    Self {
      since_year: Some(year),
    }
  }
}

/// PAON, SAON and street, blanks dropped, uppercased.
fn full_address(record: &StringRecord) -> String {
  [PAON, SAON, STREET]
    .iter()
    .filter_map(|&i| field(record, i))
    .collect::<Vec<_>>()
    .join(" ")
    .to_uppercase()
}

impl Dataset for PricePaid {
  type Row = SaleTransaction;

  const HAS_HEADERS: bool = false;
  const NAME: &'static str = "price paid";

  fn decode(&self, record: &StringRecord, _columns: &Columns) -> Option<SaleTransaction> {
    let transfer_date = parse_date(field(record, DATE)?)?;
    if let Some(year) = self.since_year
      && transfer_date.year() < year
    {
      return None;
    }

    Some(SaleTransaction {
      transaction_id: field(record, ID)?.to_owned(),
      price_paid: parse_price(field(record, PRICE)?)?,
      transfer_date,
      postcode: canonical_postcode(field(record, POSTCODE)?)?,
      full_address: full_address(record),
      property_type: field(record, PROPERTY_TYPE).map(str::to_owned),
    })
  }

  async fn write<S: PropertyStore>(store: &S, rows: Vec<SaleTransaction>) -> Result<usize> {
    let written = store
      .upsert_sales(rows)
      .await
      .map_err(vantage_core::Error::store)?;
    Ok(written)
  }
}

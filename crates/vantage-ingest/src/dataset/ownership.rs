use csv::StringRecord;
use vantage_core::{
  model::{CorporateEntity, OwnershipTitle, Property, UNKNOWN_COUNTRY, canonical_postcode},
  store::PropertyStore,
};

use crate::{
  Result,
  reader::{Columns, Dataset, parse_date, parse_price},
};

/// Commercial and corporate ownership titles. Only the first proprietor of
/// each title is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipTitles;

/// What one ownership row contributes to the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnershipRow {
  /// `None` when the proprietor has no company registration number.
  pub company:  Option<CorporateEntity>,
  /// A `TITLE:` stub carrying the title reference.
  pub property: Property,
  pub title:    OwnershipTitle,
}

const PROPRIETOR_ADDRESS: [&str; 3] = [
  "proprietor (1) address (1)",
  "proprietor (1) address (2)",
  "proprietor (1) address (3)",
];

impl Dataset for OwnershipTitles {
  type Row = OwnershipRow;

  const HAS_HEADERS: bool = true;
  const NAME: &'static str = "ownership";
  const REQUIRED: &'static [&'static str] = &["title number", "property address"];

  fn decode(&self, record: &StringRecord, columns: &Columns) -> Option<OwnershipRow> {
    let title_number = columns.get(record, "title number")?;
    let company_number = columns.get(record, "company registration no. (1)");
    let proprietor_name = columns.get(record, "proprietor name (1)");

    let company = company_number.map(|number| CorporateEntity {
      company_number:        number.to_owned(),
      name:                  proprietor_name.unwrap_or(number).to_owned(),
      status:                None,
      incorporation_country: Some(UNKNOWN_COUNTRY.to_owned()),
      category:              columns
        .get(record, "proprietorship category (1)")
        .map(str::to_owned),
      registry_number:       None,
    });

    let proprietor_address = PROPRIETOR_ADDRESS
      .iter()
      .filter_map(|c| columns.get(record, c))
      .collect::<Vec<_>>()
      .join(" ");

    let property = Property::for_title(
      title_number,
      columns.get(record, "property address").unwrap_or_default(),
      columns.get(record, "postcode").and_then(canonical_postcode),
    );

    let title = OwnershipTitle {
      title_number:       title_number.to_owned(),
      company_number:     company_number.map(str::to_owned),
      proprietor_name:    proprietor_name.map(str::to_owned),
      proprietor_address: Some(proprietor_address).filter(|a| !a.is_empty()),
      registered_on:      columns.get(record, "date proprietor added").and_then(parse_date),
      price_paid:         columns.get(record, "price paid").and_then(parse_price),
    };

    Some(OwnershipRow {
      company,
      property,
      title,
    })
  }

  async fn write<S: PropertyStore>(store: &S, rows: Vec<OwnershipRow>) -> Result<usize> {
    let mut companies = Vec::new();
    let mut properties = Vec::with_capacity(rows.len());
    let mut titles = Vec::with_capacity(rows.len());
    for row in rows {
      companies.extend(row.company);
      properties.push(row.property);
      titles.push(row.title);
    }

    store
      .insert_companies(companies)
      .await
      .map_err(vantage_core::Error::store)?;
    store
      .insert_properties(properties)
      .await
      .map_err(vantage_core::Error::store)?;
    let written = store
      .upsert_titles(titles)
      .await
      .map_err(vantage_core::Error::store)?;
    Ok(written)
  }
}

use csv::StringRecord;
use vantage_core::{
  model::{EnergyAssessment, Property, RatingBand, canonical_postcode},
  store::PropertyStore,
};

use crate::{
  Result,
  reader::{Columns, Dataset, parse_date},
};

/// Energy performance certificates, one per row, with lowercase headers.
///
/// Each row contributes a property stub (kept if the UPRN already exists)
/// and an assessment keyed by its certificate id. Rows without a UPRN, a
/// certificate id or a recognisable band are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyRatings;

impl Dataset for EnergyRatings {
  type Row = (Property, EnergyAssessment);

  const HAS_HEADERS: bool = true;
  const NAME: &'static str = "energy ratings";
  const REQUIRED: &'static [&'static str] = &["uprn", "lmk_key", "asset_rating_band"];

  fn decode(&self, record: &StringRecord, columns: &Columns) -> Option<Self::Row> {
    let uprn = columns.get(record, "uprn")?;
    let certificate_id = columns.get(record, "lmk_key")?;
    let rating_band: RatingBand = columns.get(record, "asset_rating_band")?.parse().ok()?;

    let postcode = columns.get(record, "postcode").and_then(canonical_postcode);
    let address = columns.get(record, "address").unwrap_or_default();

    let assessment = EnergyAssessment {
      certificate_id: certificate_id.to_owned(),
      uprn: uprn.to_owned(),
      rating_band,
      floor_area: columns
        .get(record, "floor_area")
        .and_then(|a| a.parse::<f64>().ok())
        .filter(|a| a.is_finite()),
      property_type: columns.get(record, "property_type").map(str::to_owned),
      inspection_date: columns.get(record, "inspection_date").and_then(parse_date),
      is_latest: true,
    };
    Some((Property::stub(uprn, address, postcode), assessment))
  }

  async fn write<S: PropertyStore>(store: &S, rows: Vec<Self::Row>) -> Result<usize> {
    let (properties, assessments): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    store
      .insert_properties(properties)
      .await
      .map_err(vantage_core::Error::store)?;
    let written = store
      .upsert_assessments(assessments)
      .await
      .map_err(vantage_core::Error::store)?;
    Ok(written)
  }
}

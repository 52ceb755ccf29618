use csv::StringRecord;
use vantage_core::{
  geo::osgb36_to_wgs84,
  model::{PostcodeLocation, canonical_postcode},
  store::PropertyStore,
};

use crate::{
  Result,
  reader::{Columns, Dataset, field},
};

// Headerless; positional quality indicator and health codes sit between.
const POSTCODE: usize = 0;
const EASTINGS: usize = 2;
const NORTHINGS: usize = 3;
const DISTRICT: usize = 8;

/// Postcode centroids on the British National Grid, converted to WGS84 on
/// the way in.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostcodeIndex;

impl Dataset for PostcodeIndex {
  type Row = PostcodeLocation;

  const HAS_HEADERS: bool = false;
  const NAME: &'static str = "postcode index";

  fn decode(&self, record: &StringRecord, _columns: &Columns) -> Option<PostcodeLocation> {
    let postcode = canonical_postcode(field(record, POSTCODE)?)?;
    let eastings: i64 = field(record, EASTINGS)?.parse().ok()?;
    let northings: i64 = field(record, NORTHINGS)?.parse().ok()?;
    // Postcodes without a surveyed position are published at 0,0.
    if eastings == 0 && northings == 0 {
      return None;
    }

    let (latitude, longitude) = osgb36_to_wgs84(eastings as f64, northings as f64);
    Some(PostcodeLocation {
      postcode,
      eastings,
      northings,
      latitude,
      longitude,
      district_code: field(record, DISTRICT).map(str::to_owned),
    })
  }

  async fn write<S: PropertyStore>(store: &S, rows: Vec<PostcodeLocation>) -> Result<usize> {
    let written = store
      .upsert_postcodes(rows)
      .await
      .map_err(vantage_core::Error::store)?;
    Ok(written)
  }
}

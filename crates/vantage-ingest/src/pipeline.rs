//! Fetch a dataset file from the lake and load it into the store.

use std::path::{Path, PathBuf};

use tracing::info;
use vantage_core::store::PropertyStore;

use crate::{
  Result,
  dataset::{DatasetKind, EnergyRatings, OwnershipTitles, PostcodeIndex, PricePaid},
  lake::ObjectStore,
  reader::{IngestSummary, load},
};

/// One fetch-and-load run against a store.
pub struct Pipeline<'a, S, O> {
  store:        &'a S,
  lake:         &'a O,
  download_dir: PathBuf,
}

impl<'a, S, O> Pipeline<'a, S, O>
where
  S: PropertyStore,
  O: ObjectStore,
{
  pub fn new(store: &'a S, lake: &'a O, download_dir: impl Into<PathBuf>) -> Self {
    Self {
      store,
      lake,
      download_dir: download_dir.into(),
    }
  }

  /// Download `remote_key` and load it as `kind`. `since_year` only applies
  /// to price-paid files.
  ///
  /// Loads that add properties or postcode centroids are followed by a
  /// geocoding pass.
  pub async fn run(
    &self,
    kind: DatasetKind,
    remote_key: &str,
    since_year: Option<i32>,
  ) -> Result<IngestSummary> {
    let path = self.lake.download(remote_key, &self.download_dir).await?;
    let summary = self.load_file(kind, &path, since_year).await?;

    if matches!(
      kind,
      DatasetKind::Epc | DatasetKind::Ccod | DatasetKind::Codepoint
    ) {
      let geocoded = self
        .store
        .geocode_properties()
        .await
        .map_err(vantage_core::Error::store)?;
      info!(geocoded, "geocoding pass complete");
    }
    Ok(summary)
  }

  /// Load an already-local file.
  pub async fn load_file(
    &self,
    kind: DatasetKind,
    path: &Path,
    since_year: Option<i32>,
  ) -> Result<IngestSummary> {
    match kind {
      DatasetKind::Epc => load(self.store, path, EnergyRatings).await,
      DatasetKind::Ccod => load(self.store, path, OwnershipTitles).await,
      DatasetKind::Ppd => load(self.store, path, PricePaid { since_year }).await,
      DatasetKind::Codepoint => load(self.store, path, PostcodeIndex).await,
    }
  }
}

//! Batched CSV reading.
//!
//! Parsing is synchronous, so a blocking task reads the file and hands
//! decoded batches over a bounded channel while the async side writes the
//! previous batch to the store.

use std::{
  collections::HashMap,
  future::Future,
  path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::StringRecord;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use vantage_core::store::PropertyStore;

use crate::{Error, Result};

/// Rows per store write.
pub const BATCH_SIZE: usize = 5_000;

/// Counts reported by every loader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
  pub rows_read:    usize,
  pub rows_written: usize,
  pub rows_skipped: usize,
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// Header name → position, matched case-insensitively.
#[derive(Debug, Default, Clone)]
pub struct Columns {
  index: HashMap<String, usize>,
}

impl Columns {
  pub(crate) fn from_headers(headers: &StringRecord) -> Self {
    let index = headers
      .iter()
      .enumerate()
      .map(|(i, h)| (h.trim().trim_start_matches('\u{feff}').to_lowercase(), i))
      .collect();
    Self { index }
  }

  pub(crate) fn require(&self, dataset: &'static str, required: &[&'static str]) -> Result<()> {
    match required.iter().find(|c| !self.index.contains_key(**c)) {
      Some(column) => Err(Error::MissingColumn { dataset, column }),
      None => Ok(()),
    }
  }

  /// The trimmed, non-empty value of `column` in `record`.
  pub fn get<'r>(&self, record: &'r StringRecord, column: &str) -> Option<&'r str> {
    self.index.get(column).and_then(|&i| field(record, i))
  }
}

/// The trimmed, non-empty value at `index`.
pub fn field(record: &StringRecord, index: usize) -> Option<&str> {
  record.get(index).map(str::trim).filter(|s| !s.is_empty())
}

/// Dates appear as `2024-01-31`, `2024-01-31 00:00` or `31-01-2024`
/// depending on the dataset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
  let raw = raw.trim();
  let head = raw.get(..10).unwrap_or(raw);
  ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"]
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(head, fmt).ok())
}

/// Prices are whole pounds, occasionally written with a decimal part or
/// thousands separators.
pub fn parse_price(raw: &str) -> Option<i64> {
  let cleaned: String = raw.chars().filter(|c| !matches!(c, ',' | '£')).collect();
  let cleaned = cleaned.trim();
  cleaned
    .parse::<i64>()
    .ok()
    .or_else(|| cleaned.parse::<f64>().ok().filter(|p| p.is_finite()).map(|p| p.round() as i64))
}

// ─── Datasets ────────────────────────────────────────────────────────────────

/// A CSV layout and how its rows reach the store.
pub trait Dataset: Send + 'static {
  type Row: Send + 'static;

  const NAME: &'static str;
  /// Whether the first line is a header row.
  const HAS_HEADERS: bool;
  /// Header names (lowercase) that must be present.
  const REQUIRED: &'static [&'static str] = &[];

  /// Decode one record. `None` skips it.
  fn decode(&self, record: &StringRecord, columns: &Columns) -> Option<Self::Row>;

  /// Persist a batch, returning the number of primary records written.
  fn write<S: PropertyStore>(
    store: &S,
    rows: Vec<Self::Row>,
  ) -> impl Future<Output = Result<usize>> + Send;
}

struct Batch<T> {
  rows:    Vec<T>,
  read:    usize,
  skipped: usize,
}

impl<T> Batch<T> {
  fn new() -> Self {
    Self {
      rows:    Vec::with_capacity(BATCH_SIZE),
      read:    0,
      skipped: 0,
    }
  }
}

fn csv_error(path: &Path, source: csv::Error) -> Error {
  Error::Csv {
    path: path.to_path_buf(),
    source,
  }
}

/// Read `path` to the end, sending a batch every [`BATCH_SIZE`] rows.
/// Stops quietly if the receiver goes away.
fn read_batches<D: Dataset>(
  path: &Path,
  dataset: &D,
  tx: &mpsc::Sender<Result<Batch<D::Row>>>,
) -> Result<()> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(D::HAS_HEADERS)
    .flexible(true)
    .from_path(path)
    .map_err(|e| csv_error(path, e))?;

  let columns = if D::HAS_HEADERS {
    let columns = Columns::from_headers(reader.headers().map_err(|e| csv_error(path, e))?);
    columns.require(D::NAME, D::REQUIRED)?;
    columns
  } else {
    Columns::default()
  };

  let mut batch = Batch::new();
  let mut record = StringRecord::new();
  loop {
    match reader.read_record(&mut record) {
      Ok(false) => break,
      Ok(true) => {
        batch.read += 1;
        match dataset.decode(&record, &columns) {
          Some(row) => batch.rows.push(row),
          None => batch.skipped += 1,
        }
      }
      Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
      Err(e) => {
        warn!(dataset = D::NAME, error = %e, "skipping unreadable record");
        batch.read += 1;
        batch.skipped += 1;
      }
    }

    if batch.read == BATCH_SIZE {
      let full = std::mem::replace(&mut batch, Batch::new());
      if tx.blocking_send(Ok(full)).is_err() {
        return Ok(());
      }
    }
  }

  if batch.read > 0 {
    let _ = tx.blocking_send(Ok(batch));
  }
  Ok(())
}

/// Load the file at `path` into `store` as dataset `D`.
pub async fn load<S, D>(store: &S, path: &Path, dataset: D) -> Result<IngestSummary>
where
  S: PropertyStore,
  D: Dataset,
{
  let (tx, mut rx) = mpsc::channel::<Result<Batch<D::Row>>>(2);
  let owned: PathBuf = path.to_path_buf();
  let reader = tokio::task::spawn_blocking(move || {
    if let Err(e) = read_batches(&owned, &dataset, &tx) {
      let _ = tx.blocking_send(Err(e));
    }
  });

  let mut summary = IngestSummary::default();
  while let Some(batch) = rx.recv().await {
    let batch = batch?;
    summary.rows_read += batch.read;
    summary.rows_skipped += batch.skipped;
    if !batch.rows.is_empty() {
      summary.rows_written += D::write(store, batch.rows).await?;
    }
    debug!(dataset = D::NAME, rows_read = summary.rows_read, "batch written");
  }
  reader.await?;

  info!(
    dataset = D::NAME,
    path = %path.display(),
    rows_read = summary.rows_read,
    rows_written = summary.rows_written,
    rows_skipped = summary.rows_skipped,
    "ingest complete"
  );
  Ok(summary)
}

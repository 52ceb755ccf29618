//! One function per subcommand. Each prints its summary to stdout.

use std::sync::Arc;

use anyhow::{Context as _, bail};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use vantage_core::{
  enrichment::OwnerEnricher,
  linkage::BatchLinker,
  store::PropertyStore,
  valuation::{ValuationConfig, comparable_sales},
};
use vantage_ingest::{DatasetKind, LocalLake, Pipeline};
use vantage_registry::CompaniesHouseClient;
use vantage_store_sqlite::SqliteStore;

use crate::settings::ServerConfig;

fn or_dash<T: ToString>(value: Option<T>) -> String {
  value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

pub async fn serve(store: SqliteStore, config: &ServerConfig) -> anyhow::Result<()> {
  let app = vantage_api::api_router(Arc::new(store)).layer(TraceLayer::new_for_http());
  let address = config.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

pub async fn link(
  store: &SqliteStore,
  config: &ServerConfig,
  threshold: Option<f64>,
  limit: Option<usize>,
) -> anyhow::Result<()> {
  let mut linker = config.linker();
  if let Some(t) = threshold {
    if !(0.0..=1.0).contains(&t) {
      bail!("threshold must be between 0 and 1, got {t}");
    }
    linker.threshold = t;
  }
  if let Some(l) = limit {
    linker.target_limit = l;
  }

  let report = BatchLinker::new(store, linker)
    .run()
    .await
    .context("linkage run failed")?;

  println!("run {}", report.run_id);
  println!("  scanned          {}", report.scanned);
  println!("  linked           {}", report.linked);
  println!("  below threshold  {}", report.below_threshold);
  println!("  no candidates    {}", report.no_candidates);
  println!("  empty address    {}", report.empty_address);
  println!("  already linked   {}", report.already_linked);
  println!("  failed           {}", report.failed);
  Ok(())
}

pub async fn comps(store: &SqliteStore, postcode: &str) -> anyhow::Result<()> {
  let report = comparable_sales(store, postcode, &ValuationConfig::default())
    .await
    .with_context(|| format!("comparable sales for {postcode:?}"))?;

  println!("comparable sales in {}", report.postcode);
  for sale in &report.sales {
    println!(
      "  {}  £{:>10}  {:<40}  {:>8} m²  {:>9} £/ft²",
      sale.transfer_date,
      sale.price_paid,
      sale.address,
      or_dash(sale.floor_area_sqm.map(|a| format!("{a:.1}"))),
      or_dash(sale.price_per_sqft.map(|p| format!("{p:.0}"))),
    );
  }
  println!(
    "{} of {} sales sized; average {} £/ft²",
    report.matched,
    report.sales.len(),
    or_dash(report.average_price_per_sqft.map(|p| format!("{p:.0}"))),
  );
  Ok(())
}

pub async fn distress(store: &SqliteStore, limit: usize) -> anyhow::Result<()> {
  let assets = store
    .distressed_assets(limit)
    .await
    .context("distressed-asset scan failed")?;

  for a in &assets {
    println!(
      "  {}  {:<12}  {:<40}  {:<9}  {:<10}  {}",
      a.rating_band,
      a.uprn,
      a.address,
      or_dash(a.postcode.as_deref()),
      or_dash(a.title_number.as_deref()),
      or_dash(a.company_name.as_deref().or(a.proprietor_name.as_deref())),
    );
  }
  println!("{} distressed assets", assets.len());
  Ok(())
}

pub async fn enrich_owners(
  store: &SqliteStore,
  config: &ServerConfig,
  limit: usize,
) -> anyhow::Result<()> {
  let client = CompaniesHouseClient::new(config.registry()).context("failed to build registry client")?;
  if !client.has_key() {
    bail!("no Companies House API key: set COMPANIES_HOUSE_KEY or companies_house_key");
  }

  let report = OwnerEnricher::new(store, &client, config.enrichment(limit))
    .run()
    .await
    .context("owner enrichment failed")?;

  println!("  scanned    {}", report.scanned);
  println!("  enriched   {}", report.enriched);
  println!("  not found  {}", report.not_found);
  println!("  failed     {}", report.failed);
  Ok(())
}

pub async fn ingest(
  store: &SqliteStore,
  config: &ServerConfig,
  kind: DatasetKind,
  remote_key: &str,
  since_year: Option<i32>,
) -> anyhow::Result<()> {
  let lake = LocalLake::new(&config.data_lake_root);
  let summary = Pipeline::new(store, &lake, &config.download_dir)
    .run(kind, remote_key, since_year)
    .await
    .with_context(|| format!("failed to ingest {kind} from {remote_key}"))?;

  println!("{kind} {remote_key}");
  println!("  rows read     {}", summary.rows_read);
  println!("  rows written  {}", summary.rows_written);
  println!("  rows skipped  {}", summary.rows_skipped);
  Ok(())
}

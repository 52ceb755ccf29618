//! `vantage`: property-graph server and batch jobs.
//!
//! Reads `vantage.toml` (or the path given with `--config`) and `VANTAGE_*`
//! environment variables, opens the SQLite store, and runs one subcommand.
//!
//! ```text
//! vantage serve
//! vantage ingest epc raw/epc/certificates.csv
//! vantage link --threshold 0.9
//! vantage comps "SW1A 1AA"
//! ```

mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vantage_ingest::DatasetKind;
use vantage_store_sqlite::SqliteStore;

use settings::ServerConfig;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vantage", version, about = "UK property graph: ingest, link, value")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "vantage.toml", global = true)]
  config: PathBuf,

  /// Companies House API key; overrides the configuration file.
  #[arg(long, env = "COMPANIES_HOUSE_KEY", hide_env_values = true, global = true)]
  companies_house_key: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Serve the read-only JSON API.
  Serve,
  /// Link unlinked distressed properties to ownership titles.
  Link {
    /// Minimum similarity for a link (inclusive).
    #[arg(long)]
    threshold: Option<f64>,
    /// Maximum number of targets this run.
    #[arg(long)]
    limit:     Option<usize>,
  },
  /// Comparable-sales report for a postcode.
  Comps {
    postcode: String,
  },
  /// List distressed (F/G-rated) assets with their owners.
  Distress {
    #[arg(long, default_value_t = 50)]
    limit: usize,
  },
  /// Resolve distressed-asset owners against Companies House.
  EnrichOwners {
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },
  /// Fetch a dataset file from the data lake and load it.
  Ingest {
    /// One of `epc`, `ccod`, `ppd` or `codepoint`.
    #[arg(value_parser = parse_dataset)]
    dataset:    DatasetKind,
    /// Object key of the file in the data lake.
    remote_key: String,
    /// Price-paid only: skip sales before this year.
    #[arg(long)]
    since_year: Option<i32>,
  },
}

fn parse_dataset(s: &str) -> Result<DatasetKind, String> {
  s.parse::<DatasetKind>().map_err(|e| e.to_string())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut config = ServerConfig::load(&cli.config)?;
  if cli.companies_house_key.is_some() {
    config.companies_house_key = cli.companies_house_key;
  }

  let store = SqliteStore::open(&config.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", config.store_path))?;

  match cli.command {
    Command::Serve => commands::serve(store, &config).await,
    Command::Link { threshold, limit } => commands::link(&store, &config, threshold, limit).await,
    Command::Comps { postcode } => commands::comps(&store, &postcode).await,
    Command::Distress { limit } => commands::distress(&store, limit).await,
    Command::EnrichOwners { limit } => commands::enrich_owners(&store, &config, limit).await,
    Command::Ingest {
      dataset,
      remote_key,
      since_year,
    } => commands::ingest(&store, &config, dataset, &remote_key, since_year).await,
  }
}

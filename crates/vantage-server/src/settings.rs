//! Runtime configuration: an optional TOML file layered under `VANTAGE_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;
use vantage_core::{enrichment::EnrichmentConfig, linkage::LinkerConfig};
use vantage_registry::{DEFAULT_BASE_URL, RegistryConfig};

/// Every field has a default, so an empty environment is a valid config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Root of the local data-lake mirror that object keys resolve against.
  pub data_lake_root:      PathBuf,
  /// Where fetched dataset files are kept between runs.
  pub download_dir:        PathBuf,
  pub companies_house_key: Option<String>,
  pub registry_base_url:   String,
  pub registry_delay_ms:   u64,
  pub link_threshold:      f64,
  pub link_target_limit:   usize,
  pub candidate_limit:     usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    let linker = LinkerConfig::default();
    Self {
      host:                "127.0.0.1".to_owned(),
      port:                8000,
      store_path:          PathBuf::from("vantage.db"),
      data_lake_root:      PathBuf::from("lake"),
      download_dir:        PathBuf::from("data"),
      companies_house_key: None,
      registry_base_url:   DEFAULT_BASE_URL.to_owned(),
      registry_delay_ms:   600,
      link_threshold:      linker.threshold,
      link_target_limit:   linker.target_limit,
      candidate_limit:     linker.candidate_limit,
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and then the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let mut config: ServerConfig = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("VANTAGE").try_parsing(true))
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;

    config.store_path = expand_tilde(&config.store_path);
    config.data_lake_root = expand_tilde(&config.data_lake_root);
    config.download_dir = expand_tilde(&config.download_dir);
    Ok(config)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn linker(&self) -> LinkerConfig {
    LinkerConfig {
      threshold:       self.link_threshold,
      target_limit:    self.link_target_limit,
      candidate_limit: self.candidate_limit,
    }
  }

  pub fn registry(&self) -> RegistryConfig {
    RegistryConfig {
      base_url: self.registry_base_url.clone(),
      api_key: self
        .companies_house_key
        .clone()
        .filter(|k| !k.trim().is_empty()),
      ..Default::default()
    }
  }

  pub fn enrichment(&self, target_limit: usize) -> EnrichmentConfig {
    EnrichmentConfig {
      target_limit,
      request_delay: Duration::from_millis(self.registry_delay_ms),
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConciergeError, Result};
use crate::models::RankingWeights;
use crate::ranking::BudgetPolicy;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "CONCIERGE_CONFIG";

/// What replaces data from a source that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
  /// Deterministic offline dataset
  #[default]
  Mock,
  /// Nothing; the category stays empty
  Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum EmbeddingBackend {
  Disabled,
  Mock {
    #[serde(default = "default_dimension")]
    dimension: usize,
  },
  Remote {
    endpoint: String,
    model: String,
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
    #[serde(default = "default_dimension")]
    dimension: usize,
    #[serde(default = "default_embedding_timeout_secs")]
    timeout_secs: u64,
  },
}

impl Default for EmbeddingBackend {
  fn default() -> Self {
    EmbeddingBackend::Mock { dimension: default_dimension() }
  }
}

fn default_dimension() -> usize {
  crate::embedding::mock::DEFAULT_DIMENSION
}

fn default_api_key_env() -> String {
  "CONCIERGE_EMBEDDING_API_KEY".to_string()
}

fn default_embedding_timeout_secs() -> u64 {
  10
}

fn default_fetch_timeout_secs() -> u64 {
  30
}

fn default_similar_trip_limit() -> usize {
  5
}

fn default_index_attractions() -> bool {
  true
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConciergeConfig {
  /// Upper bound for each individual source fetch
  #[serde(default = "default_fetch_timeout_secs")]
  pub fetch_timeout_secs: u64,
  /// Upper bound for a whole retrieval; caps every fetch timeout when set
  #[serde(default)]
  pub request_deadline_secs: Option<u64>,
  #[serde(default)]
  pub fallback: FallbackMode,
  #[serde(default)]
  pub embedding: EmbeddingBackend,
  #[serde(default)]
  pub weights: RankingWeights,
  #[serde(default)]
  pub budget_policy: BudgetPolicy,
  #[serde(default = "default_similar_trip_limit")]
  pub similar_trip_limit: usize,
  /// Store ranked attractions in the vector index after each retrieval
  #[serde(default = "default_index_attractions")]
  pub index_attractions: bool,
}

impl Default for ConciergeConfig {
  fn default() -> Self {
    Self {
      fetch_timeout_secs: default_fetch_timeout_secs(),
      request_deadline_secs: None,
      fallback: FallbackMode::default(),
      embedding: EmbeddingBackend::default(),
      weights: RankingWeights::default(),
      budget_policy: BudgetPolicy::default(),
      similar_trip_limit: default_similar_trip_limit(),
      index_attractions: default_index_attractions(),
    }
  }
}

fn is_yaml(path: &Path) -> bool {
  matches!(path.extension().and_then(|e| e.to_str()), Some("yaml") | Some("yml"))
}

impl ConciergeConfig {
  /// Load configuration from a JSON or YAML file, chosen by extension
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: ConciergeConfig =
      if is_yaml(path) { serde_yaml::from_str(&content)? } else { serde_json::from_str(&content)? };
    config.validate()?;
    Ok(config)
  }

  /// Load from `CONCIERGE_CONFIG`, the working directory, the user config dir, or defaults
  pub fn load() -> Result<Self> {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
      if !path.trim().is_empty() {
        return Self::load_from_file(path);
      }
    }

    for path in Self::candidate_paths() {
      if path.exists() {
        return Self::load_from_file(path);
      }
    }

    // No config file found, use defaults
    Ok(ConciergeConfig::default())
  }

  fn candidate_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> =
      ["concierge.yaml", "concierge.json", ".concierge/config.yaml"].iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::config_dir() {
      paths.push(dir.join("concierge").join("config.yaml"));
    }
    paths
  }

  /// Save configuration, JSON or YAML by extension
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let path = path.as_ref();
    let content =
      if is_yaml(path) { serde_yaml::to_string(self)? } else { serde_json::to_string_pretty(self)? };
    std::fs::write(path, content)?;
    Ok(())
  }

  pub fn validate(&self) -> Result<()> {
    if self.fetch_timeout_secs == 0 {
      return Err(ConciergeError::configuration("fetch_timeout_secs must be greater than zero"));
    }
    if self.request_deadline_secs == Some(0) {
      return Err(ConciergeError::configuration("request_deadline_secs must be greater than zero"));
    }
    self.weights.validate()?;
    self.budget_policy.validate()?;
    Ok(())
  }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }

  pub fn request_deadline(&self) -> Option<Duration> {
    self.request_deadline_secs.map(Duration::from_secs)
  }
}

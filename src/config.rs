use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub query: QueryConfig,
    pub collections: Vec<CollectionConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_max_limit")]
    pub max_limit: i64,
    /// When false, attribute filters are not checked against the schema;
    /// unknown categories simply match nothing.
    #[serde(default = "default_enforce_schema")]
    pub enforce_schema: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            enforce_schema: default_enforce_schema(),
        }
    }
}

fn default_limit() -> i64 {
    20
}
fn default_max_limit() -> i64 {
    100
}
fn default_enforce_schema() -> bool {
    true
}

/// One gallery collection: a contract address and the snapshot file the
/// ingestion job maintains for it.
#[derive(Debug, Deserialize, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub chain: String,
    pub contract_address: String,
    pub snapshot: PathBuf,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.collections.is_empty() {
        anyhow::bail!("at least one [[collections]] entry is required");
    }

    let mut seen = std::collections::HashSet::new();
    for collection in &config.collections {
        if !seen.insert(collection.contract_address.to_lowercase()) {
            anyhow::bail!(
                "duplicate contract address in [[collections]]: '{}'",
                collection.contract_address
            );
        }
    }

    if config.query.default_limit < 1 {
        anyhow::bail!("query.default_limit must be >= 1");
    }

    if config.query.max_limit < config.query.default_limit {
        anyhow::bail!("query.max_limit must be >= query.default_limit");
    }

    Ok(config)
}

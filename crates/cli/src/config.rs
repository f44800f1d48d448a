//! Application settings.

use std::path::{Path, PathBuf};
use anyhow::Context;
use expdj_turk::MarketplaceConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the `--config` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where batteries, workers and results are stored
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Marketplace settings
    #[serde(default)]
    pub marketplace: MarketplaceConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".expdj")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            marketplace: MarketplaceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

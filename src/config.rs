//! Service configuration: TOML file with env-var path override and
//! baked-in defaults. A missing file means defaults; a present but
//! broken file is an error.

use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_PATH: &str = "config/tour_insight.toml";
pub const ENV_CONFIG_PATH: &str = "TOUR_INSIGHT_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// The API is consumed by a browser frontend served from elsewhere.
    #[serde(default = "default_true")]
    pub permissive_cors: bool,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_catalog_path() -> String {
    "config/catalog.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            catalog_path: default_catalog_path(),
            permissive_cors: true,
        }
    }
}

impl ServiceConfig {
    /// Resolve the config path (env override first) and load it.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)
                .with_context(|| format!("invalid service config at {}", path.display())),
            Err(_) => {
                info!("no config file at {}; using defaults", path.display());
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

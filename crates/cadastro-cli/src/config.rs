//! Configuration management for the Cadastro CLI
//!
//! Stores the API location and listing preferences in
//! ~/.config/cadastro/config.toml

use anyhow::{Context, Result};
use cadastro::config::{
    ClientConfig, DEFAULT_BASE_URL, DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, DEFAULT_POSTAL_LOOKUP_URL,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const CONFIG_DIR: &str = "cadastro";
const CONFIG_FILE: &str = "config.toml";
const REPORT_FILE: &str = "report_url";

/// Overrides `base_url` (also read from `.env`)
pub const API_URL_ENV: &str = "CADASTRO_API_URL";

/// CLI Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_postal_lookup_url")]
    pub postal_lookup_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_postal_lookup_url() -> String {
    DEFAULT_POSTAL_LOOKUP_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            postal_lookup_url: default_postal_lookup_url(),
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join(CONFIG_DIR);
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Where the location of the last generated report is kept
    pub fn report_store_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Could not determine data directory")?
            .join(CONFIG_DIR);
        Ok(data_dir.join(REPORT_FILE))
    }

    /// Load config from file (or defaults), then apply the environment
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = Self::load_from(&path)?.with_env_override(std::env::var(API_URL_ENV).ok());
        debug!(path = ?path, base_url = %config.base_url, "Configuration loaded");
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file")?;

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory {:?}", dir))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        Ok(())
    }

    /// A non-empty `CADASTRO_API_URL` wins over the file
    pub fn with_env_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Library-level configuration for the controllers and adapters
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
            .with_page_size(self.page_size)
            .with_debounce(Duration::from_millis(self.debounce_ms))
            .with_postal_lookup_url(self.postal_lookup_url.clone())
    }
}

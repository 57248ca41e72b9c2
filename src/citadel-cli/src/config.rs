//! Configuration management for citadel CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// Decompiled game data
    pub data_dir: Option<PathBuf>,
    /// Where generated JSON and wikitext go
    pub output_dir: Option<PathBuf>,
    /// MediaWiki `api.php` endpoint
    pub wiki_api: Option<String>,
    pub wiki_user: Option<String>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("citadel");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Command-line value, falling back to the configured one
    pub fn data_dir(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.data_dir.clone())
            .context("No data directory. Pass --data-dir or run `citadel configure --data-dir DIR`")
    }

    pub fn output_dir(&self, flag: Option<PathBuf>) -> Result<PathBuf> {
        flag.or_else(|| self.output_dir.clone())
            .context("No output directory. Pass --output-dir or run `citadel configure --output-dir DIR`")
    }

    pub fn wiki_api(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| self.wiki_api.clone())
            .context("No wiki API endpoint. Pass --api or run `citadel configure --wiki-api URL`")
    }

    pub fn wiki_user(&self, flag: Option<String>) -> Result<String> {
        flag.or_else(|| self.wiki_user.clone())
            .context("No wiki user. Pass --user or run `citadel configure --wiki-user NAME`")
    }
}

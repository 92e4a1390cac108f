//! Configuration storage operations

use crate::{models::ConsoleConfig, Result};
use std::path::PathBuf;
use tracing::debug;

pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    pub fn load(&self) -> Result<ConsoleConfig> {
        let config_path = self.path();

        if !config_path.exists() {
            debug!(path = %config_path.display(), "No config file, writing defaults");
            let config = ConsoleConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;

        // Handle empty file case
        if content.trim().is_empty() {
            debug!(path = %config_path.display(), "Config file is empty, writing defaults");
            let config = ConsoleConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let config: ConsoleConfig = serde_json::from_str(&content)?;
        debug!(path = %config_path.display(), endpoint = %config.endpoint, "Loaded config");
        Ok(config)
    }

    pub fn save(&self, config: &ConsoleConfig) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.path(), content)?;
        debug!(path = %self.path().display(), "Saved config");

        Ok(())
    }
}

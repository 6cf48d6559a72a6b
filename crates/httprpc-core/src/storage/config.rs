//! Configuration storage operations

use crate::{models::ClientConfig, Result};
use std::path::PathBuf;

const CONFIG_FILE: &str = "config.json";

pub struct ConfigStorage {
    config_dir: PathBuf,
}

impl ConfigStorage {
    pub fn new(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// Load the configuration, writing a default file when none exists yet.
    pub fn load(&self) -> Result<ClientConfig> {
        let config_path = self.path();

        if !config_path.exists() {
            let config = ClientConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;

        // Handle empty file case
        if content.trim().is_empty() {
            let config = ClientConfig::default();
            self.save(&config)?;
            return Ok(config);
        }

        let config: ClientConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;

        let content = serde_json::to_string_pretty(config)?;
        std::fs::write(self.path(), content)?;

        Ok(())
    }
}

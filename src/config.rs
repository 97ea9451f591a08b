use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

use crate::clip::DEFAULT_MAX_RECENT_CLIPS;
use crate::utils::paths::get_config_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,

    /// How often the clipboard change counter is checked.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_save_debounce_ms")]
    pub save_debounce_ms: u64,

    /// Settle time between detecting new clipboard text and recording it.
    #[serde(default = "default_ingest_delay_ms")]
    pub ingest_delay_ms: u64,

    #[serde(default = "default_max_recent_clips")]
    pub max_recent_clips: usize,
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_save_debounce_ms() -> u64 {
    500
}

fn default_ingest_delay_ms() -> u64 {
    50
}

fn default_max_recent_clips() -> usize {
    DEFAULT_MAX_RECENT_CLIPS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            poll_interval_ms: default_poll_interval_ms(),
            save_debounce_ms: default_save_debounce_ms(),
            ingest_delay_ms: default_ingest_delay_ms(),
            max_recent_clips: default_max_recent_clips(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;

        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn ingest_delay(&self) -> Duration {
        Duration::from_millis(self.ingest_delay_ms)
    }
}

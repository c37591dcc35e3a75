//! Demo configuration
//!
//! Loaded from statecell-counter.toml in the working directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "statecell-counter.toml";

/// Counter demo configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CounterConfig {
    /// Value the counter starts at
    #[serde(default)]
    pub initial_count: i64,

    /// Amount added or removed by increment/decrement
    #[serde(default = "default_step")]
    pub step: i64,

    /// Log every dispatched action
    #[serde(default = "default_log_actions")]
    pub log_actions: bool,

    /// Number of recent action types kept in the history slice
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_step() -> i64 {
    1
}

fn default_log_actions() -> bool {
    true
}

fn default_history_limit() -> usize {
    10
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            initial_count: 0,
            step: default_step(),
            log_actions: default_log_actions(),
            history_limit: default_history_limit(),
        }
    }
}

impl CounterConfig {
    /// Load config from the working directory, or use defaults
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
        };

        match toml::from_str(&content) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }
}

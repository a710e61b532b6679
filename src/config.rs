use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::WeekStart;
use crate::error::{Error, Result};
use crate::models::DEFAULT_CATEGORY;

/// Returns the path to the configuration file (`config.json`).
///
/// The path is determined in the following order:
/// 1. `TASKAL_CONFIG` environment variable.
/// 2. `~/.config/taskal/config.json` (on Linux).
/// 3. `./config.json` (fallback).
pub fn config_path() -> PathBuf {
    std::env::var("TASKAL_CONFIG").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("taskal");
        p.push("config.json");
        p
    })
}

/// Returns the default directory for log files.
///
/// `~/.local/share/taskal` on Linux, `./` when no data directory is known.
pub fn default_log_dir() -> PathBuf {
    let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    p.push("taskal");
    p
}

fn default_categories() -> Vec<String> {
    vec![
        DEFAULT_CATEGORY.into(),
        "Billing".into(),
        "Client request".into(),
        "Paperwork".into(),
        "Follow-up".into(),
    ]
}

fn default_log_level() -> String {
    "info".into()
}

fn default_true() -> bool {
    true
}

/// User settings. Every field has a default, so a partial file is fine.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Category proposed when adding a task.
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Categories offered in the picker besides those already in use.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub week_start: WeekStart,
    /// Whether reminders may alert (ring the terminal bell).
    #[serde(default = "default_true")]
    pub notifications: bool,
    /// Default log filter when `TASKAL_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_category: default_category(),
            categories: default_categories(),
            week_start: WeekStart::default(),
            notifications: true,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Loads the configuration file, falling back to defaults when it is absent.
    pub fn load() -> Result<Config> {
        let path = config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }
        let s = fs::read_to_string(&path)?;
        serde_json::from_str(&s).map_err(|source| Error::ConfigParse { path, source })
    }

    /// Directory where log files are written.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(default_log_dir)
    }
}

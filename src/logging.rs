//! File-backed `tracing` setup.
//!
//! The TUI owns the terminal, so events go to `<log_dir>/taskal.log` instead of
//! stderr. The filter comes from `TASKAL_LOG`, else from the configured level.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::Result;

const LOG_FILE_NAME: &str = "taskal.log";

/// Installs the global subscriber. Returns the log file path.
///
/// A second call is harmless: the already-installed subscriber stays.
pub fn init(level: &str, log_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_env("TASKAL_LOG")
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging started");
    }
    Ok(path)
}

/// Like [`init`], but a log file that cannot be opened is reported on stderr
/// and the program carries on without file logging.
pub fn init_or_report(level: &str, log_dir: &Path) -> Option<PathBuf> {
    match init(level, log_dir) {
        Ok(path) => Some(path),
        Err(e) => {
            eprintln!("Warning: logging disabled, cannot write to {}: {}", log_dir.display(), e);
            None
        }
    }
}

//! Bootstrap utilities for the pxf-cli binary.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ConfigError, LoggingConfig, LOG_ENV_VAR};

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Resolve the audit log directory.
///
/// Uses the configured directory, else `$HOME/gpAdminLogs`.
pub fn log_dir(config: &LoggingConfig) -> Result<PathBuf, ConfigError> {
    match &config.dir {
        Some(dir) => Ok(dir.clone()),
        None => dirs::home_dir()
            .map(|home| home.join("gpAdminLogs"))
            .ok_or(ConfigError::NoLogDirectory),
    }
}

/// `<dir>/<program>_<YYYYMMDD>.log`
pub fn log_file_path(dir: &Path, program: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.log", program, date.format("%Y%m%d")))
}

/// Filter directive for a configured level name. Unknown names mean `info`.
pub fn level_directive(level: &str) -> &'static str {
    let level = level.trim().to_ascii_lowercase();
    LEVELS
        .into_iter()
        .find(|known| *known == level)
        .unwrap_or("info")
}

fn ensure_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.exists() && !dir.is_dir() {
        return Err(ConfigError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|source| ConfigError::LogDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Initialize tracing with an audit log file.
///
/// The level comes from `config`; `PXF_CLI_LOG` overrides it with a full
/// filter directive. Returns the path of the log file.
pub fn init_logging(program: &str, config: &LoggingConfig) -> Result<PathBuf, ConfigError> {
    let dir = log_dir(config)?;
    ensure_dir(&dir)?;

    let path = log_file_path(&dir, program, Local::now().date_naive());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| ConfigError::LogFile {
            path: path.clone(),
            source,
        })?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(level_directive(&config.level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| ConfigError::Subscriber(e.to_string()))?;

    Ok(path)
}

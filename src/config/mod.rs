//! CLI configuration.
//!
//! Loaded from YAML files and `PXF_CLI__*` environment variables, then
//! overlaid with the legacy `PXF_LOGDIR` and `PXF_LOG_LEVEL` variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::command::{EnvVar, Environment};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "pxf-cli.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "PXF_CLI_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "PXF_CLI";
/// Environment variable holding a full tracing filter directive.
pub const LOG_ENV_VAR: &str = "PXF_CLI_LOG";
/// Legacy log directory root; logs go to its `admin` subdirectory.
pub const LOG_DIR_ENV_VAR: &str = "PXF_LOGDIR";
/// Legacy log level.
pub const LOG_LEVEL_ENV_VAR: &str = "PXF_LOG_LEVEL";

/// Topology file location relative to `PXF_BASE`.
pub const DEFAULT_TOPOLOGY_FILE: &str = "conf/cluster-topology.yaml";

/// Errors from loading configuration or setting up logging.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("cannot create log directory {path}: {source}")]
    LogDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("log path {0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("could not determine a log directory: neither PXF_LOGDIR nor HOME is set")]
    NoLogDirectory,

    #[error("cannot open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Subscriber(String),

    #[error("no topology file configured and PXF_BASE is not set")]
    NoTopologyFile,
}

/// Audit log settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the audit log. Defaults to `$HOME/gpAdminLogs`.
    pub dir: Option<PathBuf>,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            level: "info".to_string(),
        }
    }
}

/// Where the cluster topology is read from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub file: Option<PathBuf>,
}

/// Settings for the process-backed fleet executor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum hosts contacted at once.
    pub concurrency: usize,
    pub ssh: String,
    pub ssh_options: Vec<String>,
    /// Shell used for commands that run on this machine.
    pub shell: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            concurrency: 32,
            ssh: "ssh".to_string(),
            ssh_options: ["-o", "StrictHostKeyChecking=no", "-o", "BatchMode=yes"]
                .into_iter()
                .map(String::from)
                .collect(),
            shell: "bash".to_string(),
        }
    }
}

/// Main CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub logging: LoggingConfig,
    pub topology: TopologyConfig,
    pub executor: ExecutorConfig,
}

impl CliConfig {
    /// Load configuration from files and environment.
    ///
    /// Sources in order of priority, later overrides earlier:
    /// 1. `pxf-cli.yaml` in the current directory (if exists)
    /// 2. File given by `path` (if provided)
    /// 3. File named by `PXF_CLI_CONFIG` (if set)
    /// 4. `PXF_CLI__*` environment variables
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment as EnvSource, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::from(config_path).format(FileFormat::Yaml));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                EnvSource::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Overlay the legacy log variables. Blank values are ignored.
    pub fn apply_legacy_env(&mut self, env: &dyn Environment) {
        if let Some(dir) = non_blank(env, LOG_DIR_ENV_VAR) {
            self.logging.dir = Some(PathBuf::from(dir).join("admin"));
        }
        if let Some(level) = non_blank(env, LOG_LEVEL_ENV_VAR) {
            self.logging.level = level.trim().to_ascii_lowercase();
        }
    }

    /// The configured topology file, else the default under `PXF_BASE`.
    pub fn topology_file(&self, env: &dyn Environment) -> Result<PathBuf, ConfigError> {
        if let Some(file) = &self.topology.file {
            return Ok(file.clone());
        }
        non_blank(env, EnvVar::PxfBase.name())
            .map(|base| PathBuf::from(base).join(DEFAULT_TOPOLOGY_FILE))
            .ok_or(ConfigError::NoTopologyFile)
    }
}

fn non_blank(env: &dyn Environment, name: &str) -> Option<String> {
    env.get(name).filter(|v| !v.trim().is_empty())
}

//! Environment preconditions for cluster commands.

use std::collections::HashMap;

use crate::error::{ClusterError, Result};

/// Environment variables a command may require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvVar {
    GpHome,
    PxfHome,
    PxfBase,
    JavaHome,
    /// Configuration directory of a pre-6.x installation, read by `migrate`.
    PxfConf,
}

impl EnvVar {
    pub const fn name(self) -> &'static str {
        match self {
            EnvVar::GpHome => "GPHOME",
            EnvVar::PxfHome => "PXF_HOME",
            EnvVar::PxfBase => "PXF_BASE",
            EnvVar::JavaHome => "JAVA_HOME",
            EnvVar::PxfConf => "PXF_CONF",
        }
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Read access to environment variables.
pub trait Environment: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment, used by tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment(HashMap<String, String>);

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, var: EnvVar, value: impl Into<String>) -> Self {
        self.0.insert(var.name().to_string(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Environment for MapEnvironment {
    fn get(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }
}

/// Values of a command's required variables, all present and non-blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedEnv(HashMap<EnvVar, String>);

impl ValidatedEnv {
    pub fn get(&self, var: EnvVar) -> Option<&str> {
        self.0.get(&var).map(String::as_str)
    }
}

/// Check `required` in order, failing on the first unset or blank variable.
pub fn validate(required: &[EnvVar], env: &dyn Environment) -> Result<ValidatedEnv> {
    let mut values = HashMap::with_capacity(required.len());
    for &var in required {
        let value = env.get(var.name()).ok_or(ClusterError::MissingEnvironment {
            variable: var.name(),
            reason: "must be set",
        })?;
        if value.trim().is_empty() {
            return Err(ClusterError::MissingEnvironment {
                variable: var.name(),
                reason: "cannot be blank",
            });
        }
        values.insert(var, value);
    }
    Ok(ValidatedEnv(values))
}

//! Per-host command synthesis.

use super::catalog::{CommandDefinition, CommandName};
use super::env::{self, EnvVar, Environment, ValidatedEnv};
use crate::error::{ClusterError, Result};

/// Placeholder hostname used when logging a rendered command.
pub const HOSTNAME_PLACEHOLDER: &str = "HOSTNAME";

/// Options that come from command-line flags rather than the environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Delete extraneous files on the destination when syncing.
    pub delete_on_sync: bool,
}

/// The command string run for each target host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Same command for every host.
    Fixed(String),
    /// `rsync` of the base directory to each host.
    Sync { base: String, delete: bool },
}

impl HostCommand {
    pub fn for_host(&self, hostname: &str) -> String {
        match self {
            HostCommand::Fixed(command) => command.clone(),
            HostCommand::Sync { base, delete } => format!(
                "rsync -az{delete} -e 'ssh -o StrictHostKeyChecking=no' \
                 '{base}/conf' '{base}/lib' '{base}/servers' '{hostname}:{base}'",
                delete = if *delete { " --delete" } else { "" },
            ),
        }
    }
}

/// `PXF_BASE` when present, otherwise `PXF_HOME`.
pub fn effective_base(env: &ValidatedEnv) -> Option<&str> {
    env.get(EnvVar::PxfBase).or_else(|| env.get(EnvVar::PxfHome))
}

/// Validate the environment, apply command guards and build the host command.
///
/// Nothing is contacted here; every failure happens before dispatch.
pub fn build(
    definition: &CommandDefinition,
    environment: &dyn Environment,
    options: BuildOptions,
) -> Result<HostCommand> {
    let inputs = env::validate(definition.required_env, environment)?;
    let base = effective_base(&inputs);

    match definition.name {
        CommandName::Sync => {
            let base = base.ok_or(ClusterError::MissingEnvironment {
                variable: EnvVar::PxfBase.name(),
                reason: "must be set",
            })?;
            return Ok(HostCommand::Sync {
                base: base.to_string(),
                delete: options.delete_on_sync,
            });
        }
        CommandName::Prepare if inputs.get(EnvVar::PxfHome) == base => {
            return Err(ClusterError::InvalidConfiguration(
                "the PXF_BASE value must be different from your PXF installation directory"
                    .to_string(),
            ));
        }
        CommandName::Migrate if inputs.get(EnvVar::PxfConf) == base => {
            return Err(ClusterError::InvalidConfiguration(
                "your target PXF_BASE directory must be different from your existing PXF_CONF directory"
                    .to_string(),
            ));
        }
        _ => {}
    }

    let mut command = String::new();
    for var in [EnvVar::GpHome, EnvVar::PxfConf, EnvVar::PxfBase, EnvVar::JavaHome] {
        if let Some(value) = inputs.get(var) {
            command.push_str(&format!("{}={} ", var, value));
        }
    }
    let home = inputs.get(EnvVar::PxfHome).unwrap_or_default();
    command.push_str(&format!("{}/bin/pxf {}", home, definition.name));
    if definition.name == CommandName::Reset {
        // the local reset prompts too; the operator already confirmed once
        command.push_str(" --force");
    }

    Ok(HostCommand::Fixed(command))
}

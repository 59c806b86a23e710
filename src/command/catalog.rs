//! The fixed set of `pxf cluster` commands.
//!
//! Message templates use named placeholders, filled in by the report module:
//! - `status`: `{clause}` (standby wording, only when `standby_clause` is
//!   set), `{count}`, `{plural}`
//! - `success`: `{succeeded}`, `{total}`, `{plural}`
//! - `failure`: `{failed}`, `{total}`, `{plural}`

use super::env::EnvVar;
use crate::scope::Scope;

/// Names of the supported cluster commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Init,
    Start,
    Stop,
    Sync,
    Status,
    Reset,
    Register,
    Restart,
    Prepare,
    Migrate,
}

impl CommandName {
    pub const ALL: [CommandName; 10] = [
        CommandName::Init,
        CommandName::Start,
        CommandName::Stop,
        CommandName::Sync,
        CommandName::Status,
        CommandName::Reset,
        CommandName::Register,
        CommandName::Restart,
        CommandName::Prepare,
        CommandName::Migrate,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CommandName::Init => "init",
            CommandName::Start => "start",
            CommandName::Stop => "stop",
            CommandName::Sync => "sync",
            CommandName::Status => "status",
            CommandName::Reset => "reset",
            CommandName::Register => "register",
            CommandName::Restart => "restart",
            CommandName::Prepare => "prepare",
            CommandName::Migrate => "migrate",
        }
    }

    pub fn definition(self) -> &'static CommandDefinition {
        match self {
            CommandName::Init => &INIT,
            CommandName::Start => &START,
            CommandName::Stop => &STOP,
            CommandName::Sync => &SYNC,
            CommandName::Status => &STATUS,
            CommandName::Reset => &RESET,
            CommandName::Register => &REGISTER,
            CommandName::Restart => &RESTART,
            CommandName::Prepare => &PREPARE,
            CommandName::Migrate => &MIGRATE,
        }
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CommandName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown cluster command: {}", s))
    }
}

/// Operator-facing message templates for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Messages {
    pub status: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
    /// Standby wording spliced into `status` at `{clause}`. When absent the
    /// status template carries no `{clause}` and is not standby aware.
    pub standby_clause: Option<&'static str>,
    /// Confirmation prompt shown before anything runs.
    pub warning: Option<&'static str>,
}

/// Immutable description of one cluster command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: CommandName,
    pub required_env: &'static [EnvVar],
    pub scope: Scope,
    pub messages: Messages,
}

/// Scope shared by every command that runs the pxf script on each host.
const EVERY_HOST: Scope = Scope::remote()
    .on_hosts()
    .include_coordinator()
    .include_mirrors();

const STANDBY_CLAUSE: &str = ", standby coordinator host,";

pub static INIT: CommandDefinition = CommandDefinition {
    name: CommandName::Init,
    required_env: &[EnvVar::GpHome, EnvVar::PxfHome, EnvVar::JavaHome],
    scope: EVERY_HOST,
    messages: Messages {
        status: "*****************************************************************************\n\
                 * DEPRECATION NOTICE:\n\
                 * The \"pxf cluster init\" command is deprecated and will be removed\n\
                 * in a future release of PXF.\n\
                 *\n\
                 * Use the \"pxf cluster register\" command instead.\n\
                 *\n\
                 *****************************************************************************\n\n\
                 Initializing PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF initialized successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to initialize on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static START: CommandDefinition = CommandDefinition {
    name: CommandName::Start,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Starting PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF started successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to start on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static STOP: CommandDefinition = CommandDefinition {
    name: CommandName::Stop,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Stopping PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF stopped successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to stop on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

/// Pushes configuration from the coordinator with rsync, so the coordinator
/// itself is excluded while the standby is included.
pub static SYNC: CommandDefinition = CommandDefinition {
    name: CommandName::Sync,
    required_env: &[EnvVar::PxfBase],
    scope: Scope::local()
        .on_hosts()
        .exclude_coordinator()
        .include_mirrors(),
    messages: Messages {
        status: "Syncing PXF configuration files from coordinator host to{clause} {count} segment host{plural}...",
        success: "PXF configs synced successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF configs failed to sync on {failed} out of {total} host{plural}",
        standby_clause: Some(" standby coordinator host and"),
        warning: None,
    },
};

pub static STATUS: CommandDefinition = CommandDefinition {
    name: CommandName::Status,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Checking status of PXF servers on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF is running on {succeeded} out of {total} host{plural}",
        failure: "PXF is not running on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static REGISTER: CommandDefinition = CommandDefinition {
    name: CommandName::Register,
    required_env: &[EnvVar::GpHome, EnvVar::PxfHome],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Installing PXF extension on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF extension has been installed on {succeeded} out of {total} host{plural}",
        failure: "Failed to install PXF extension on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static RESET: CommandDefinition = CommandDefinition {
    name: CommandName::Reset,
    required_env: &[EnvVar::PxfHome],
    scope: EVERY_HOST,
    messages: Messages {
        status: "*****************************************************************************\n\
                 * DEPRECATION NOTICE:\n\
                 * The \"pxf cluster reset\" command is deprecated and will be removed\n\
                 * in a future release of PXF.\n\
                 *****************************************************************************\n\n\
                 Resetting PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF has been reset on {succeeded} out of {total} host{plural}",
        failure: "Failed to reset PXF on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: Some(
            "Ensure your PXF cluster is stopped before continuing. \
             This is a destructive action. Press y to continue:\n",
        ),
    },
};

pub static RESTART: CommandDefinition = CommandDefinition {
    name: CommandName::Restart,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Restarting PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF restarted successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to restart on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static PREPARE: CommandDefinition = CommandDefinition {
    name: CommandName::Prepare,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Preparing PXF on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF prepared successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to prepare on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

pub static MIGRATE: CommandDefinition = CommandDefinition {
    name: CommandName::Migrate,
    required_env: &[EnvVar::PxfHome, EnvVar::PxfConf, EnvVar::PxfBase],
    scope: EVERY_HOST,
    messages: Messages {
        status: "Migrating PXF configuration on coordinator host{clause} and {count} segment host{plural}...",
        success: "PXF configuration migrated successfully on {succeeded} out of {total} host{plural}",
        failure: "PXF failed to migrate configuration on {failed} out of {total} host{plural}",
        standby_clause: Some(STANDBY_CLAUSE),
        warning: None,
    },
};

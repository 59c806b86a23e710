//! Fleet executor backed by child processes.
//!
//! Remote scopes run each host's command through `ssh`; local scopes run it
//! through a shell on this machine. Concurrency is bounded by a semaphore.

use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn};

use super::{CommandFn, ExecutionResult, FleetExecutor};
use crate::config::ExecutorConfig;
use crate::scope::Scope;

/// Runs host commands as child processes.
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    ssh: String,
    ssh_options: Vec<String>,
    shell: String,
    permits: Arc<Semaphore>,
}

impl ShellExecutor {
    pub fn from_config(config: &ExecutorConfig) -> Self {
        Self {
            ssh: config.ssh.clone(),
            ssh_options: config.ssh_options.clone(),
            shell: config.shell.clone(),
            permits: Arc::new(Semaphore::new(config.concurrency.max(1))),
        }
    }

    /// Build the process for one host.
    ///
    /// No stdin is attached; a command that prompts fails instead of hanging.
    fn command_for(&self, scope: &Scope, host: &str, command_string: &str) -> Command {
        let mut cmd = if scope.runs_locally() {
            let mut cmd = Command::new(&self.shell);
            cmd.arg("-c").arg(command_string);
            cmd
        } else {
            let mut cmd = Command::new(&self.ssh);
            cmd.args(&self.ssh_options).arg(host).arg(command_string);
            cmd
        };
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run_one(&self, scope: &Scope, host: &str, command_string: String) -> ExecutionResult {
        let mut result = ExecutionResult {
            host: host.to_string(),
            command_string,
            ..Default::default()
        };

        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                result.error = Some(e.to_string());
                return result;
            }
        };

        debug!(host = %host, command = %result.command_string, "Running host command");
        let output = match self
            .command_for(scope, host, &result.command_string)
            .output()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                error!(host = %host, error = %e, "Failed to spawn host command");
                result.error = Some(e.to_string());
                return result;
            }
        };

        result.stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        result.stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            let error = match output.status.code() {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            };
            warn!(host = %host, error = %error, "Host command failed");
            result.error = Some(error);
        }
        result
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::from_config(&ExecutorConfig::default())
    }
}

#[async_trait]
impl FleetExecutor for ShellExecutor {
    async fn execute(
        &self,
        scope: &Scope,
        hosts: &[String],
        command: &CommandFn<'_>,
    ) -> Vec<ExecutionResult> {
        let runs = hosts
            .iter()
            .map(|host| self.run_one(scope, host, command(host)));
        join_all(runs).await
    }
}

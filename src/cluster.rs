//! Runs one `pxf cluster` command end to end.
//!
//! Every step before dispatch fails without touching a host. Once dispatch
//! starts, every selected host is attempted and reported.

use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, info};

use crate::command::{self, BuildOptions, CommandDefinition, Environment};
use crate::dispatch::{Dispatcher, FleetExecutor};
use crate::error::{ClusterError, Result};
use crate::report::{self, Console};
use crate::scope;
use crate::topology::source::TopologySource;

/// Read one line of confirmation. Only `y` or `Y` continues.
pub fn confirm(input: &mut dyn BufRead) -> std::io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y"))
}

/// Collaborators shared by every cluster command.
pub struct ClusterRunner {
    env: Arc<dyn Environment>,
    topology: Arc<dyn TopologySource>,
    executor: Arc<dyn FleetExecutor>,
}

impl ClusterRunner {
    pub fn new(
        env: Arc<dyn Environment>,
        topology: Arc<dyn TopologySource>,
        executor: Arc<dyn FleetExecutor>,
    ) -> Self {
        Self {
            env,
            topology,
            executor,
        }
    }

    /// Run `definition` and write its report to `console`.
    ///
    /// Returns the success message, or the error that ended the run. Errors
    /// are already written to the console when this returns.
    pub async fn run(
        &self,
        definition: &CommandDefinition,
        options: BuildOptions,
        input: &mut (dyn BufRead + Send),
        console: &mut Console<'_>,
    ) -> Result<String> {
        let result = self.execute(definition, options, input, console).await;
        if let Err(err) = &result {
            // the failure report was written during the run
            if !matches!(err, ClusterError::ExecutionFailed { .. }) {
                console.error(err)?;
            }
        }
        result
    }

    async fn execute(
        &self,
        definition: &CommandDefinition,
        options: BuildOptions,
        input: &mut (dyn BufRead + Send),
        console: &mut Console<'_>,
    ) -> Result<String> {
        info!(command = %definition.name, "Running pxf cluster command");

        let host_command = command::build(definition, self.env.as_ref(), options)?;

        let topology = self.topology.load().await?;
        let selection = scope::resolve(&topology, &definition.scope)?;

        if let Some(warning) = definition.messages.warning {
            console.prompt(warning)?;
            if !confirm(input)? {
                return Err(ClusterError::Cancelled {
                    command: definition.name.as_str(),
                });
            }
        }

        let total_hosts = selection.len();
        let standby_alone = topology.is_standby_alone_on_host()
            && topology
                .standby_host()
                .is_some_and(|host| selection.contains(host));
        debug!(
            hosts = total_hosts,
            standby_alone,
            includes_coordinator = selection.includes_coordinator(),
            "Resolved host selection"
        );
        console.status(&report::pre_run_status(
            definition,
            total_hosts,
            standby_alone,
            selection.includes_coordinator(),
        ))?;

        let output = Dispatcher::new(self.executor.as_ref())
            .run(&definition.scope, &selection, &host_command)
            .await;

        match report::final_report(definition, total_hosts, &output) {
            Ok(message) => {
                console.success(&message)?;
                Ok(message)
            }
            Err(failure) => {
                console.failure(&failure)?;
                Err(failure.into())
            }
        }
    }
}

/// Process exit status for a finished run.
pub fn exit_code<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::catalog;
    use crate::command::{EnvVar, MapEnvironment};
    use crate::test_utils::{MockExecutor, StaticTopology};
    use crate::topology::{Instance, Role, Topology};
    use std::io::Cursor;

    fn topology() -> Topology {
        Topology::new(vec![
            Instance::new(-1, Role::Primary, "mdw"),
            Instance::new(-1, Role::Mirror, "smdw"),
            Instance::new(0, Role::Primary, "sdw1"),
            Instance::new(1, Role::Primary, "sdw2"),
            Instance::new(2, Role::Primary, "sdw3"),
        ])
        .unwrap()
    }

    fn env() -> MapEnvironment {
        MapEnvironment::new()
            .with(EnvVar::PxfHome, "/usr/local/pxf")
            .with(EnvVar::PxfBase, "/home/gpadmin/pxf")
    }

    fn runner(env: MapEnvironment, executor: Arc<MockExecutor>) -> ClusterRunner {
        ClusterRunner::new(
            Arc::new(env),
            Arc::new(StaticTopology(topology())),
            executor,
        )
    }

    async fn run(
        runner: &ClusterRunner,
        definition: &CommandDefinition,
        answer: &str,
    ) -> (Result<String>, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let result = {
            let mut console = Console::new(&mut out, &mut err);
            runner
                .run(definition, BuildOptions::default(), &mut input, &mut console)
                .await
        };
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_confirm() {
        assert!(confirm(&mut Cursor::new("y\n")).unwrap());
        assert!(confirm(&mut Cursor::new("Y\n")).unwrap());
        assert!(!confirm(&mut Cursor::new("yes\n")).unwrap());
        assert!(!confirm(&mut Cursor::new("\n")).unwrap());
        assert!(!confirm(&mut Cursor::new("")).unwrap());
    }

    #[tokio::test]
    async fn test_start_success() {
        let executor = Arc::new(MockExecutor::new());
        let runner = runner(env(), executor.clone());

        let (result, out, err) = run(&runner, &catalog::START, "").await;

        assert_eq!(
            result.unwrap(),
            "PXF started successfully on 5 out of 5 hosts"
        );
        assert_eq!(
            out,
            "Starting PXF on coordinator host, standby coordinator host, and 3 segment hosts...\n\
             PXF started successfully on 5 out of 5 hosts\n"
        );
        assert!(err.is_empty());
        assert_eq!(exit_code(&Ok::<_, ClusterError>(())), 0);

        let invocations = executor.invocations().await;
        assert_eq!(invocations.len(), 1);
        assert_eq!(invocations[0].hosts, ["mdw", "smdw", "sdw1", "sdw2", "sdw3"]);
    }

    #[tokio::test]
    async fn test_partial_failure_reports_every_host() {
        let executor = Arc::new(
            MockExecutor::new()
                .fail_host("sdw1", "", "connection reset\nretry later\nmore\n")
                .fail_host("mdw", "PXF is not running\n", ""),
        );
        let runner = runner(env(), executor.clone());

        let (result, out, err) = run(&runner, &catalog::STATUS, "").await;

        let err_value = result.unwrap_err();
        assert!(matches!(err_value, ClusterError::ExecutionFailed { .. }));
        assert_eq!(exit_code(&Err::<(), _>(err_value)), 1);
        assert!(out.starts_with("Checking status of PXF servers"));
        assert_eq!(
            err,
            "ERROR: PXF is not running on 2 out of 5 hosts\n\
             mdw ==> PXF is not running\n\
             sdw1 ==> connection reset\nretry later...\n"
        );
    }

    #[tokio::test]
    async fn test_missing_environment_touches_no_host() {
        let executor = Arc::new(MockExecutor::new());
        let env = MapEnvironment::new().with(EnvVar::PxfHome, "/usr/local/pxf");
        let runner = runner(env, executor.clone());

        let (result, out, err) = run(&runner, &catalog::START, "").await;

        assert!(matches!(
            result,
            Err(ClusterError::MissingEnvironment {
                variable: "PXF_BASE",
                ..
            })
        ));
        assert!(out.is_empty());
        assert_eq!(err, "ERROR: PXF_BASE must be set\n");
        assert!(executor.invocations().await.is_empty());
    }

    #[tokio::test]
    async fn test_prepare_guard_touches_no_host() {
        let executor = Arc::new(MockExecutor::new());
        let env = MapEnvironment::new()
            .with(EnvVar::PxfHome, "/usr/local/pxf")
            .with(EnvVar::PxfBase, "/usr/local/pxf");
        let runner = runner(env, executor.clone());

        let (result, out, _) = run(&runner, &catalog::PREPARE, "").await;

        assert!(matches!(result, Err(ClusterError::InvalidConfiguration(_))));
        assert!(out.is_empty());
        assert!(executor.invocations().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_cancelled() {
        let executor = Arc::new(MockExecutor::new());
        let runner = runner(env(), executor.clone());

        let (result, out, err) = run(&runner, &catalog::RESET, "n\n").await;

        assert!(matches!(
            result,
            Err(ClusterError::Cancelled { command: "reset" })
        ));
        assert!(out.starts_with("Ensure your PXF cluster is stopped"));
        assert_eq!(err, "ERROR: pxf cluster reset cancelled\n");
        assert!(executor.invocations().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_confirmed_runs_forced() {
        let executor = Arc::new(MockExecutor::new());
        let runner = runner(env(), executor.clone());

        let (result, _, _) = run(&runner, &catalog::RESET, "y\n").await;

        assert_eq!(result.unwrap(), "PXF has been reset on 5 out of 5 hosts");
        let invocations = executor.invocations().await;
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0]
            .commands
            .iter()
            .all(|c| c == "/usr/local/pxf/bin/pxf reset --force"));
    }

    #[tokio::test]
    async fn test_sync_skips_coordinator() {
        let executor = Arc::new(MockExecutor::new());
        let runner = runner(env(), executor.clone());

        let (result, out, _) = run(&runner, &catalog::SYNC, "").await;

        assert_eq!(
            result.unwrap(),
            "PXF configs synced successfully on 4 out of 4 hosts"
        );
        assert!(out.starts_with(
            "Syncing PXF configuration files from coordinator host to standby coordinator host and 3 segment hosts..."
        ));
        let invocations = executor.invocations().await;
        assert_eq!(invocations[0].hosts, ["smdw", "sdw1", "sdw2", "sdw3"]);
        assert!(invocations[0].scope.runs_locally());
        assert!(invocations[0].commands[0].ends_with("'smdw:/home/gpadmin/pxf'"));
    }
}

//! Dispatch of host commands to the fleet executor.
//!
//! The executor owns parallelism and transport. The dispatcher adapts inputs
//! and outputs: it hands over the selection and the per-host command, then
//! lines results back up with the selection order.

pub mod shell;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::command::{HostCommand, HOSTNAME_PLACEHOLDER};
use crate::scope::{HostSelection, Scope};

pub use shell::ShellExecutor;

/// Maps a hostname to the command string to run for it.
pub type CommandFn<'a> = dyn Fn(&str) -> String + Send + Sync + 'a;

/// Outcome of running one host's command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionResult {
    pub host: String,
    pub command_string: String,
    pub stdout: String,
    pub stderr: String,
    /// Command or transport failure. `None` means the host succeeded.
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// A result for a host the executor never reported on.
    fn unreported(host: &str, command_string: String) -> Self {
        Self {
            host: host.to_string(),
            command_string,
            error: Some("no result reported by executor".to_string()),
            ..Default::default()
        }
    }
}

/// Runs commands across many hosts.
#[async_trait]
pub trait FleetExecutor: Send + Sync {
    /// Run `command(host)` for every host in `hosts`.
    ///
    /// Implementations return one result per host; order is not required to
    /// match `hosts`.
    async fn execute(
        &self,
        scope: &Scope,
        hosts: &[String],
        command: &CommandFn<'_>,
    ) -> Vec<ExecutionResult>;
}

/// Results of one dispatch, in selection order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionOutput {
    results: Vec<ExecutionResult>,
}

impl ExecutionOutput {
    pub fn new(results: Vec<ExecutionResult>) -> Self {
        Self { results }
    }

    pub fn results(&self) -> &[ExecutionResult] {
        &self.results
    }

    pub fn total_hosts(&self) -> usize {
        self.results.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }

    /// Failed results in selection order.
    pub fn failed(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| !r.succeeded())
    }
}

/// Adapter between a host selection and a fleet executor.
pub struct Dispatcher<'a> {
    executor: &'a dyn FleetExecutor,
}

impl<'a> Dispatcher<'a> {
    pub fn new(executor: &'a dyn FleetExecutor) -> Self {
        Self { executor }
    }

    /// Run `command` on every selected host.
    ///
    /// The executor is invoked exactly once. Every selected host gets exactly
    /// one result; hosts the executor did not report on are marked failed.
    /// A host reported more than once keeps its first failure, and results for
    /// hosts outside the selection are logged and set aside.
    pub async fn run(
        &self,
        scope: &Scope,
        selection: &HostSelection,
        command: &HostCommand,
    ) -> ExecutionOutput {
        debug!(
            command = %command.for_host(HOSTNAME_PLACEHOLDER),
            hosts = selection.len(),
            local = scope.runs_locally(),
            "Dispatching cluster command"
        );

        let render = |host: &str| command.for_host(host);
        let reported = self
            .executor
            .execute(scope, selection.hosts(), &render)
            .await;

        let selected: HashSet<&str> = selection.hosts().iter().map(String::as_str).collect();
        let mut by_host: HashMap<String, ExecutionResult> = HashMap::new();
        for result in reported {
            if !selected.contains(result.host.as_str()) {
                warn!(
                    host = %result.host,
                    error = ?result.error,
                    "Executor reported a host outside the selection"
                );
                continue;
            }
            match by_host.entry(result.host.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(result);
                }
                Entry::Occupied(mut slot) => {
                    warn!(host = %result.host, "Executor reported a host more than once");
                    // a failure always outranks an earlier success
                    if slot.get().succeeded() && !result.succeeded() {
                        slot.insert(result);
                    }
                }
            }
        }

        let results: Vec<ExecutionResult> = selection
            .hosts()
            .iter()
            .map(|host| {
                by_host
                    .remove(host)
                    .unwrap_or_else(|| ExecutionResult::unreported(host, command.for_host(host)))
            })
            .collect();

        for result in &results {
            debug!(
                host = %result.host,
                command = ?result.command_string,
                failed = !result.succeeded(),
                stdout = ?result.stdout,
                "Remote command output"
            );
            if !result.succeeded() {
                debug!(host = %result.host, stderr = ?result.stderr, "Remote command stderr");
            }
        }

        ExecutionOutput::new(results)
    }
}

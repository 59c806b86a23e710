//! Test utilities and mock implementations.
//!
//! Mock fleet executor and topology source for exercising the command flow
//! without touching real hosts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::dispatch::{CommandFn, ExecutionResult, FleetExecutor};
use crate::scope::Scope;
use crate::topology::source::TopologySource;
use crate::topology::{Topology, TopologyError};

/// One call into the mock executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub scope: Scope,
    pub hosts: Vec<String>,
    pub commands: Vec<String>,
}

/// Mock executor that records calls and reports scripted outcomes.
#[derive(Default)]
pub struct MockExecutor {
    invocations: RwLock<Vec<Invocation>>,
    failures: HashMap<String, (String, String)>,
    dropped: HashSet<String>,
    extra: Vec<(String, Option<String>)>,
    reversed: bool,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `host` with the given captured output.
    pub fn fail_host(mut self, host: &str, stdout: &str, stderr: &str) -> Self {
        self.failures
            .insert(host.to_string(), (stdout.to_string(), stderr.to_string()));
        self
    }

    /// Omit `host` from the returned results.
    pub fn drop_host(mut self, host: &str) -> Self {
        self.dropped.insert(host.to_string());
        self
    }

    /// Append one more result for `host` after the scripted ones.
    pub fn extra_result(mut self, host: &str, error: Option<&str>) -> Self {
        self.extra
            .push((host.to_string(), error.map(str::to_string)));
        self
    }

    /// Return results in reverse host order.
    pub fn reversed(mut self) -> Self {
        self.reversed = true;
        self
    }

    pub async fn invocations(&self) -> Vec<Invocation> {
        self.invocations.read().await.clone()
    }
}

#[async_trait]
impl FleetExecutor for MockExecutor {
    async fn execute(
        &self,
        scope: &Scope,
        hosts: &[String],
        command: &CommandFn<'_>,
    ) -> Vec<ExecutionResult> {
        let commands: Vec<String> = hosts.iter().map(|h| command(h)).collect();
        self.invocations.write().await.push(Invocation {
            scope: *scope,
            hosts: hosts.to_vec(),
            commands: commands.clone(),
        });

        let mut results: Vec<ExecutionResult> = hosts
            .iter()
            .zip(commands)
            .filter(|(host, _)| !self.dropped.contains(*host))
            .map(|(host, command_string)| match self.failures.get(host) {
                Some((stdout, stderr)) => ExecutionResult {
                    host: host.clone(),
                    command_string,
                    stdout: stdout.clone(),
                    stderr: stderr.clone(),
                    error: Some("exit status 1".to_string()),
                },
                None => ExecutionResult {
                    host: host.clone(),
                    command_string,
                    stdout: "ok".to_string(),
                    ..Default::default()
                },
            })
            .collect();
        if self.reversed {
            results.reverse();
        }
        results.extend(self.extra.iter().map(|(host, error)| ExecutionResult {
            host: host.clone(),
            command_string: command(host),
            error: error.clone(),
            ..Default::default()
        }));
        results
    }
}

/// Topology source returning a fixed snapshot.
pub struct StaticTopology(pub Topology);

#[async_trait]
impl TopologySource for StaticTopology {
    async fn load(&self) -> Result<Topology, TopologyError> {
        Ok(self.0.clone())
    }
}

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use pxf_cli::command::{BuildOptions, CommandDefinition, EnvVar, MapEnvironment};
use pxf_cli::dispatch::{CommandFn, ExecutionResult, FleetExecutor};
use pxf_cli::report::Console;
use pxf_cli::scope::Scope;
use pxf_cli::topology::source::TopologySource;
use pxf_cli::topology::{Instance, Role, Topology, TopologyError};
use pxf_cli::{ClusterRunner, Result};

/// What the executor was asked to run.
#[derive(Debug, Clone)]
pub struct Call {
    pub scope: Scope,
    pub hosts: Vec<String>,
    pub commands: Vec<String>,
}

/// Executor that records calls and fails the hosts it is told to.
#[derive(Default)]
pub struct MockExecutor {
    calls: RwLock<Vec<Call>>,
    stderr_by_host: HashMap<String, String>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, host: &str, stderr: &str) -> Self {
        self.stderr_by_host
            .insert(host.to_string(), stderr.to_string());
        self
    }

    pub async fn calls(&self) -> Vec<Call> {
        self.calls.read().await.clone()
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
        self.calls.write().await.push(Call {
            scope: *scope,
            hosts: hosts.to_vec(),
            commands: commands.clone(),
        });

        // completion order differs from request order
        hosts
            .iter()
            .zip(commands)
            .rev()
            .map(|(host, command_string)| {
                let stderr = self.stderr_by_host.get(host).cloned();
                ExecutionResult {
                    host: host.clone(),
                    command_string,
                    stdout: String::new(),
                    error: stderr.as_ref().map(|_| "exit status 1".to_string()),
                    stderr: stderr.unwrap_or_default(),
                }
            })
            .collect()
    }
}

pub struct FixedTopology(pub Topology);

#[async_trait]
impl TopologySource for FixedTopology {
    async fn load(&self) -> std::result::Result<Topology, TopologyError> {
        Ok(self.0.clone())
    }
}

/// Coordinator `mdw`, standby alone on `smdw`, primaries on `sdw1`-`sdw3`.
pub fn standby_alone_topology() -> Topology {
    Topology::new(vec![
        Instance::new(-1, Role::Primary, "mdw"),
        Instance::new(-1, Role::Mirror, "smdw"),
        Instance::new(0, Role::Primary, "sdw1"),
        Instance::new(1, Role::Primary, "sdw2"),
        Instance::new(2, Role::Primary, "sdw3"),
    ])
    .unwrap()
}

/// Coordinator `mdw`, standby sharing `sdw1` with a primary, mirrors spread.
pub fn shared_standby_topology() -> Topology {
    Topology::new(vec![
        Instance::new(-1, Role::Primary, "mdw"),
        Instance::new(-1, Role::Mirror, "sdw1"),
        Instance::new(0, Role::Primary, "sdw1"),
        Instance::new(0, Role::Mirror, "sdw2"),
        Instance::new(1, Role::Primary, "sdw2"),
        Instance::new(1, Role::Mirror, "sdw1"),
    ])
    .unwrap()
}

pub fn pxf_env() -> MapEnvironment {
    MapEnvironment::new()
        .with(EnvVar::GpHome, "/usr/local/greenplum-db")
        .with(EnvVar::PxfHome, "/usr/local/pxf")
        .with(EnvVar::PxfBase, "/home/gpadmin/pxf")
        .with(EnvVar::JavaHome, "/usr/lib/jvm/java-11")
        .with(EnvVar::PxfConf, "/home/gpadmin/pxf-conf")
}

pub fn runner(
    env: MapEnvironment,
    topology: Topology,
    executor: Arc<MockExecutor>,
) -> ClusterRunner {
    ClusterRunner::new(Arc::new(env), Arc::new(FixedTopology(topology)), executor)
}

/// Everything one run wrote.
pub struct Outcome {
    pub result: Result<String>,
    pub stdout: String,
    pub stderr: String,
}

pub async fn run(
    runner: &ClusterRunner,
    definition: &CommandDefinition,
    options: BuildOptions,
    answer: &str,
) -> Outcome {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut input = Cursor::new(answer.as_bytes().to_vec());
    let result = {
        let mut console = Console::new(&mut stdout, &mut stderr);
        runner.run(definition, options, &mut input, &mut console).await
    };
    Outcome {
        result,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

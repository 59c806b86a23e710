//! Command scope and host selection.
//!
//! A scope is a small set of composable predicates describing where a command
//! runs. Resolving a scope against a topology yields the ordered, de-duplicated
//! list of target hosts.

use std::collections::HashSet;

use crate::topology::{Instance, Role, Topology, TopologyError};

/// Where the command string is executed for each target host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Run on the target host itself (over ssh).
    #[default]
    Remote,
    /// Run on the local (coordinator) node once per target host, e.g. a push
    /// with rsync.
    Local,
}

/// Host-selection flags for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scope {
    pub execution: Execution,
    /// Segment hosts participate.
    pub targets_hosts: bool,
    pub include_coordinator: bool,
    /// Removes the coordinator host even when another rule selects it.
    pub exclude_coordinator: bool,
    /// The standby coordinator participates when present, as do hosts that
    /// carry only mirror instances.
    pub include_mirrors: bool,
}

impl Scope {
    /// Run on each target host.
    pub const fn remote() -> Self {
        Self {
            execution: Execution::Remote,
            targets_hosts: false,
            include_coordinator: false,
            exclude_coordinator: false,
            include_mirrors: false,
        }
    }

    /// Run from the local node once per target host.
    pub const fn local() -> Self {
        Self {
            execution: Execution::Local,
            ..Self::remote()
        }
    }

    pub const fn on_hosts(self) -> Self {
        Self {
            targets_hosts: true,
            ..self
        }
    }

    pub const fn include_coordinator(self) -> Self {
        Self {
            include_coordinator: true,
            ..self
        }
    }

    pub const fn exclude_coordinator(self) -> Self {
        Self {
            exclude_coordinator: true,
            ..self
        }
    }

    pub const fn include_mirrors(self) -> Self {
        Self {
            include_mirrors: true,
            ..self
        }
    }

    pub fn runs_locally(&self) -> bool {
        self.execution == Execution::Local
    }

    /// Whether the coordinator host ends up in the selection.
    pub fn selects_coordinator(&self) -> bool {
        self.include_coordinator && !self.exclude_coordinator
    }

    /// The coordinator role is named by this scope and must exist.
    fn requires_coordinator(&self) -> bool {
        self.include_coordinator || self.exclude_coordinator || self.runs_locally()
    }

    fn admits(&self, instance: &Instance) -> bool {
        if instance.is_coordinator() {
            self.selects_coordinator()
        } else if instance.is_standby() {
            self.include_mirrors
        } else if instance.role == Role::Mirror {
            self.targets_hosts && self.include_mirrors
        } else {
            self.targets_hosts
        }
    }
}

/// Ordered, de-duplicated target hosts for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostSelection {
    hosts: Vec<String>,
    includes_coordinator: bool,
}

impl HostSelection {
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.iter().any(|h| h == host)
    }

    /// Whether the coordinator host was selected.
    pub fn includes_coordinator(&self) -> bool {
        self.includes_coordinator
    }
}

/// Resolve `scope` against `topology`.
///
/// Hosts appear in topology order (coordinator, standby, then segments by
/// content id) and never more than once.
pub fn resolve(topology: &Topology, scope: &Scope) -> Result<HostSelection, TopologyError> {
    let coordinator = topology.coordinator_host();
    if scope.requires_coordinator() && coordinator.is_none() {
        return Err(TopologyError::MissingCoordinator);
    }

    let excluded = if scope.exclude_coordinator {
        coordinator
    } else {
        None
    };

    let mut seen = HashSet::new();
    let mut hosts = Vec::new();
    for instance in topology.instances() {
        let host = instance.hostname.as_str();
        if !scope.admits(instance) || Some(host) == excluded {
            continue;
        }
        if seen.insert(host) {
            hosts.push(host.to_string());
        }
    }

    let includes_coordinator = scope.selects_coordinator()
        && coordinator.is_some_and(|c| hosts.iter().any(|h| h == c));

    Ok(HostSelection {
        hosts,
        includes_coordinator,
    })
}

//! Cluster topology snapshot.
//!
//! A topology is the list of database instances that make up the fleet, each
//! tagged with its content id and role. Content `-1` is the coordinator
//! (primary) and its standby (mirror); every other content id is a segment.
//! Hosts are derived from the instances placed on them.

pub mod source;

use std::collections::HashSet;

use serde::Deserialize;

pub use source::{FileTopologySource, TopologySource};

/// Content id shared by the coordinator and its standby.
pub const COORDINATOR_CONTENT: i32 = -1;

/// Errors raised while building or querying a topology.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("the cluster topology has no coordinator; this command must be run from the coordinator host")]
    MissingCoordinator,

    #[error("instance with content {content} has a blank hostname")]
    BlankHostname { content: i32 },

    #[error("duplicate {role} instance for content {content}")]
    DuplicateInstance { content: i32, role: Role },

    #[error("failed to read topology from {path}: {message}")]
    Source { path: String, message: String },
}

/// Role of an instance within its content group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum Role {
    #[serde(rename = "p", alias = "primary")]
    Primary,
    #[serde(rename = "m", alias = "mirror")]
    Mirror,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Primary => write!(f, "primary"),
            Role::Mirror => write!(f, "mirror"),
        }
    }
}

/// A single database instance placed on a host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instance {
    pub content: i32,
    pub role: Role,
    pub hostname: String,
    /// Network address, when it differs from the hostname.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub datadir: Option<String>,
}

impl Instance {
    pub fn new(content: i32, role: Role, hostname: impl Into<String>) -> Self {
        Self {
            content,
            role,
            hostname: hostname.into(),
            address: None,
            port: None,
            datadir: None,
        }
    }

    pub fn is_coordinator(&self) -> bool {
        self.content == COORDINATOR_CONTENT && self.role == Role::Primary
    }

    pub fn is_standby(&self) -> bool {
        self.content == COORDINATOR_CONTENT && self.role == Role::Mirror
    }

    pub fn is_segment(&self) -> bool {
        self.content != COORDINATOR_CONTENT
    }
}

/// Immutable, validated snapshot of the fleet.
///
/// Instances are kept sorted by `(content, role)` with primaries first so
/// that every host-derived view is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topology {
    instances: Vec<Instance>,
}

impl Topology {
    /// Build a topology, rejecting blank hostnames and duplicate instances.
    pub fn new(mut instances: Vec<Instance>) -> Result<Self, TopologyError> {
        let mut seen = HashSet::new();
        for instance in &instances {
            if instance.hostname.trim().is_empty() {
                return Err(TopologyError::BlankHostname {
                    content: instance.content,
                });
            }
            if !seen.insert((instance.content, instance.role)) {
                return Err(TopologyError::DuplicateInstance {
                    content: instance.content,
                    role: instance.role,
                });
            }
        }
        instances.sort_by_key(|i| (i.content, i.role != Role::Primary));
        Ok(Self { instances })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn coordinator_host(&self) -> Option<&str> {
        self.host_for_content(COORDINATOR_CONTENT, Role::Primary)
    }

    pub fn standby_host(&self) -> Option<&str> {
        self.host_for_content(COORDINATOR_CONTENT, Role::Mirror)
    }

    /// Host carrying the instance with the given content id and role.
    pub fn host_for_content(&self, content: i32, role: Role) -> Option<&str> {
        self.instances
            .iter()
            .find(|i| i.content == content && i.role == role)
            .map(|i| i.hostname.as_str())
    }

    /// All instances placed on `host`, in topology order.
    pub fn instances_on_host<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a Instance> {
        self.instances.iter().filter(move |i| i.hostname == host)
    }

    /// Content ids of the instances placed on `host`, in topology order.
    pub fn contents_for_host(&self, host: &str) -> Vec<i32> {
        self.instances_on_host(host).map(|i| i.content).collect()
    }

    /// Every distinct hostname in topology order.
    pub fn hostnames(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.instances
            .iter()
            .map(|i| i.hostname.as_str())
            .filter(|h| seen.insert(*h))
            .collect()
    }

    /// True when a standby exists and its host carries nothing else.
    ///
    /// When true the standby is counted on its own in status messages instead
    /// of being folded into the segment host count.
    pub fn is_standby_alone_on_host(&self) -> bool {
        match self.standby_host() {
            Some(host) => self.instances_on_host(host).all(Instance::is_standby),
            None => false,
        }
    }
}

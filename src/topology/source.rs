//! Topology sources.
//!
//! The topology is loaded fresh for every command invocation. The file source
//! reads a YAML snapshot of the instance list, e.g.:
//!
//! ```yaml
//! instances:
//!   - { content: -1, role: p, hostname: mdw }
//!   - { content: -1, role: m, hostname: smdw }
//!   - { content: 0,  role: p, hostname: sdw1, port: 6000, datadir: /data/primary/gpseg0 }
//!   - { content: 0,  role: m, hostname: sdw2 }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use super::{Instance, Topology, TopologyError};

/// Source of the fleet topology.
#[async_trait]
pub trait TopologySource: Send + Sync {
    /// Load a fresh topology snapshot.
    async fn load(&self) -> Result<Topology, TopologyError>;
}

#[derive(Debug, Deserialize)]
struct TopologyFile {
    #[serde(default)]
    instances: Vec<Instance>,
}

/// Parse a YAML topology document.
pub fn parse_topology(yaml: &str) -> Result<Topology, TopologyError> {
    parse_from(yaml, "<inline>")
}

fn parse_from(yaml: &str, origin: &str) -> Result<Topology, TopologyError> {
    let file: TopologyFile = serde_yaml::from_str(yaml).map_err(|e| TopologyError::Source {
        path: origin.to_string(),
        message: e.to_string(),
    })?;
    Topology::new(file.instances)
}

/// Topology read from a YAML file on the coordinator.
#[derive(Debug, Clone)]
pub struct FileTopologySource {
    path: PathBuf,
}

impl FileTopologySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TopologySource for FileTopologySource {
    async fn load(&self) -> Result<Topology, TopologyError> {
        let path = self.path.display().to_string();
        debug!(path = %path, "Reading cluster topology");

        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| TopologyError::Source {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

        let topology = parse_from(&contents, &path)?;
        info!(
            path = %path,
            instances = topology.instances().len(),
            hosts = topology.hostnames().len(),
            "Loaded cluster topology"
        );
        Ok(topology)
    }
}

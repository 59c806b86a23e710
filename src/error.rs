//! Errors surfaced by `pxf cluster` commands.

use crate::topology::TopologyError;

/// Result type for cluster command operations.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Errors that end a cluster command.
///
/// Everything except `ExecutionFailed` is raised before any host is touched.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    #[error("{variable} {reason}")]
    MissingEnvironment {
        variable: &'static str,
        reason: &'static str,
    },

    #[error("{0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error("pxf cluster {command} cancelled")]
    Cancelled { command: &'static str },

    /// One or more hosts failed; carries the aggregated report.
    #[error("{report}")]
    ExecutionFailed { report: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}


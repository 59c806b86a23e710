//! pxf-cli - administrative commands for a PXF fleet
//!
//! Applies lifecycle commands (start, stop, sync, ...) across the hosts of a
//! Greenplum cluster and reports one aggregated outcome.

pub mod cluster;
pub mod command;
pub mod config;
pub mod deployment;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod scope;
pub mod topology;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use cluster::{exit_code, ClusterRunner};
pub use error::{ClusterError, Result};

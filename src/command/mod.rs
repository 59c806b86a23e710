//! Cluster command catalog and per-host command synthesis.

pub mod builder;
pub mod catalog;
pub mod env;

pub use builder::{build, BuildOptions, HostCommand, HOSTNAME_PLACEHOLDER};
pub use catalog::{CommandDefinition, CommandName, Messages};
pub use env::{EnvVar, Environment, MapEnvironment, ProcessEnvironment};

//! PXF deployment configuration and its validation rules.
//!
//! A deployment groups one or more PXF clusters. Each cluster is either
//! collocated with Greenplum or external, reachable through its hosts or an
//! endpoint, and serves one or more service groups.

mod parser;
pub mod rules;

use tracing::warn;

pub use parser::{parse_deployment, ParseError};
pub use rules::is_valid_address;

/// Rule violations, reported one at a time in rule order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("the name of the deployment cannot be empty string")]
    EmptyDeploymentName,

    #[error("there should be at least one PXF cluster in the PXF deployment `{deployment}`")]
    NoClusters { deployment: String },

    #[error("host `{hostname}` must belong to only one pxf cluster across the pxf deployment")]
    DuplicateHostname { hostname: String },

    #[error("PXF group name `{group}` must be unique across the pxf deployment")]
    DuplicateGroupName { group: String },

    #[error("there must be no more than one collocated PXF cluster")]
    MultipleCollocated,

    #[error("the name of the PXF cluster cannot be empty string")]
    EmptyClusterName,

    #[error("the host list and endpoint cannot be both empty for the external PXF cluster `{cluster}`")]
    NoHostsOrEndpoint { cluster: String },

    #[error("the endpoint `{endpoint}` of the PXF cluster `{cluster}` is not a valid IPv4 address or FQDN")]
    InvalidEndpoint { endpoint: String, cluster: String },

    #[error("there should be at least one service group in PXF cluster `{cluster}`")]
    NoServiceGroups { cluster: String },

    #[error("the name of the service group cannot be empty string")]
    EmptyGroupName,

    #[error("there should be at least one port in PXF service group `{group}`")]
    NoPorts { group: String },

    #[error(
        "invalid port number `{port}` under service group `{group}`, a port number must be between `1` - `65535`"
    )]
    InvalidPort { port: i64, group: String },

    #[error("the hostname `{hostname}` is not a valid IPv4 address or FQDN")]
    InvalidHostname { hostname: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PxfHost {
    pub hostname: String,
}

impl PxfHost {
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PxfServiceGroup {
    pub name: String,
    pub ports: Vec<i64>,
    pub is_ssl: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PxfCluster {
    pub name: String,
    /// Runs on the Greenplum hosts themselves.
    pub collocated: bool,
    pub hosts: Vec<PxfHost>,
    pub endpoint: Option<String>,
    pub groups: Vec<PxfServiceGroup>,
}

impl PxfCluster {
    /// The endpoint, treating an empty value as absent.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().filter(|e| !e.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PxfDeployment {
    pub name: String,
    pub clusters: Vec<PxfCluster>,
}

impl PxfDeployment {
    /// Apply every rule, stopping at the first violation.
    ///
    /// Returns the advisory warnings collected along the way; each is also
    /// logged.
    pub fn validate(&self) -> Result<Vec<String>, ValidationError> {
        let mut warnings = Vec::new();

        rules::deployment_name_not_empty(self)?;
        rules::deployment_at_least_one_cluster(self)?;
        rules::deployment_hostname_unique(self)?;
        rules::deployment_group_name_unique(self)?;
        rules::deployment_at_most_one_collocated(self)?;

        for cluster in &self.clusters {
            rules::cluster_name_not_empty(cluster)?;
            rules::cluster_collocated_hosts_ignored(cluster, &mut warnings);
            rules::cluster_collocated_endpoint_ignored(cluster, &mut warnings);
            rules::cluster_external_needs_hosts_or_endpoint(cluster)?;
            rules::cluster_valid_endpoint(cluster)?;
            rules::cluster_at_least_one_group(cluster)?;

            for group in &cluster.groups {
                rules::group_name_not_empty(group)?;
                rules::group_at_least_one_port(group)?;
                rules::group_valid_ports(group)?;
                rules::group_recommended_ports(group, &mut warnings);
            }

            for host in &cluster.hosts {
                rules::host_valid_hostname(host)?;
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, ports: &[i64]) -> PxfServiceGroup {
        PxfServiceGroup {
            name: name.to_string(),
            ports: ports.to_vec(),
            is_ssl: false,
        }
    }

    fn deployment() -> PxfDeployment {
        PxfDeployment {
            name: "test-deployment".to_string(),
            clusters: vec![
                PxfCluster {
                    name: "test-cluster-1".to_string(),
                    collocated: false,
                    hosts: vec![PxfHost::new("host1.test.com"), PxfHost::new("host2.test.com")],
                    endpoint: Some("endpoint1.test.com".to_string()),
                    groups: vec![
                        group("test-group-1", &[1111, 2222]),
                        group("test-group-2", &[3333, 4444]),
                    ],
                },
                PxfCluster {
                    name: "test-cluster-2".to_string(),
                    collocated: false,
                    hosts: vec![PxfHost::new("host3.test.com"), PxfHost::new("host4.test.com")],
                    endpoint: Some("endpoint2.test.com".to_string()),
                    groups: vec![
                        group("test-group-3", &[5555, 6666]),
                        group("test-group-4", &[7777, 8888]),
                    ],
                },
            ],
        }
    }

    fn error(d: &PxfDeployment) -> String {
        d.validate().unwrap_err().to_string()
    }

    #[test]
    fn test_valid_deployment() {
        assert_eq!(deployment().validate(), Ok(vec![]));
    }

    #[test]
    fn test_deployment_name_required() {
        let mut d = deployment();
        d.name.clear();
        assert_eq!(error(&d), "the name of the deployment cannot be empty string");
    }

    #[test]
    fn test_at_least_one_cluster() {
        let mut d = deployment();
        d.clusters.clear();
        assert_eq!(
            error(&d),
            "there should be at least one PXF cluster in the PXF deployment `test-deployment`"
        );
    }

    #[test]
    fn test_hostname_unique_within_cluster() {
        let mut d = deployment();
        d.clusters[0].hosts[0].hostname = "test-host".to_string();
        d.clusters[0].hosts[1].hostname = "test-host".to_string();
        assert_eq!(
            error(&d),
            "host `test-host` must belong to only one pxf cluster across the pxf deployment"
        );
    }

    #[test]
    fn test_hostname_unique_across_clusters() {
        let mut d = deployment();
        d.clusters[1].hosts[0].hostname = "host1.test.com".to_string();
        assert_eq!(
            error(&d),
            "host `host1.test.com` must belong to only one pxf cluster across the pxf deployment"
        );
    }

    #[test]
    fn test_group_name_unique_across_clusters() {
        let mut d = deployment();
        d.clusters[1].groups[0].name = "test-group-1".to_string();
        assert_eq!(
            error(&d),
            "PXF group name `test-group-1` must be unique across the pxf deployment"
        );
    }

    #[test]
    fn test_at_most_one_collocated() {
        let mut d = deployment();
        d.clusters[0].collocated = true;
        d.clusters[1].collocated = true;
        assert_eq!(error(&d), "there must be no more than one collocated PXF cluster");
    }

    #[test]
    fn test_cluster_name_required() {
        let mut d = deployment();
        d.clusters[1].name.clear();
        assert_eq!(error(&d), "the name of the PXF cluster cannot be empty string");
    }

    #[test]
    fn test_collocated_warnings() {
        let mut d = deployment();
        d.clusters[0].collocated = true;
        let warnings = d.validate().unwrap();
        assert_eq!(
            warnings,
            [
                "PXF host list of cluster `test-cluster-1` will be ignored, because cluster `test-cluster-1` is marked as collocated",
                "PXF endpoint `endpoint1.test.com` of cluster `test-cluster-1` will be ignored, because cluster `test-cluster-1` is marked as collocated",
            ]
        );
    }

    #[test]
    fn test_external_cluster_needs_hosts_or_endpoint() {
        let mut d = deployment();
        d.clusters[0].hosts.clear();
        d.clusters[0].endpoint = Some(String::new());
        assert_eq!(
            error(&d),
            "the host list and endpoint cannot be both empty for the external PXF cluster `test-cluster-1`"
        );

        d.clusters[0].endpoint = Some("endpoint1.test.com".to_string());
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut d = deployment();
        d.clusters[0].endpoint = Some("not_valid".to_string());
        assert_eq!(
            error(&d),
            "the endpoint `not_valid` of the PXF cluster `test-cluster-1` is not a valid IPv4 address or FQDN"
        );
    }

    #[test]
    fn test_at_least_one_group() {
        let mut d = deployment();
        d.clusters[0].groups.clear();
        assert_eq!(
            error(&d),
            "there should be at least one service group in PXF cluster `test-cluster-1`"
        );
    }

    #[test]
    fn test_group_name_required() {
        let mut d = deployment();
        d.clusters[0].groups[1].name.clear();
        assert_eq!(error(&d), "the name of the service group cannot be empty string");
    }

    #[test]
    fn test_at_least_one_port() {
        let mut d = deployment();
        d.clusters[0].groups[0].ports.clear();
        assert_eq!(
            error(&d),
            "there should be at least one port in PXF service group `test-group-1`"
        );
    }

    #[test]
    fn test_port_range() {
        for port in [0, -1, 65536] {
            let mut d = deployment();
            d.clusters[0].groups[0].ports = vec![port];
            assert_eq!(
                error(&d),
                format!(
                    "invalid port number `{}` under service group `test-group-1`, a port number must be between `1` - `65535`",
                    port
                )
            );
        }
    }

    #[test]
    fn test_port_outside_recommended_range_warns() {
        let mut d = deployment();
        d.clusters[1].groups[1].ports = vec![1023, 32768];
        let warnings = d.validate().unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("rather than `1023` under the service group `test-group-4`"));
    }

    #[test]
    fn test_invalid_hostname() {
        let mut d = deployment();
        d.clusters[1].hosts[1].hostname = "abc_test.com".to_string();
        assert_eq!(
            error(&d),
            "the hostname `abc_test.com` is not a valid IPv4 address or FQDN"
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let mut d = deployment();
        d.clusters[0].name.clear();
        d.clusters[0].groups.clear();
        assert_eq!(error(&d), "the name of the PXF cluster cannot be empty string");
    }
}

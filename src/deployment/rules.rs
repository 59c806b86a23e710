//! Individual deployment rules.
//!
//! Rules return `Err` for violations. Advisory findings are pushed onto the
//! warnings list and never fail validation.

use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::OnceLock;

use regex::Regex;

use super::{PxfCluster, PxfDeployment, PxfHost, PxfServiceGroup, ValidationError};

pub const MIN_PORT: i64 = 1;
pub const MAX_PORT: i64 = 65535;
pub const MIN_RECOMMENDED_PORT: i64 = 1024;
pub const MAX_RECOMMENDED_PORT: i64 = 32767;

/// True for an IPv4 literal or a fully qualified domain name.
///
/// IPv6 literals are rejected.
pub fn is_valid_address(address: &str) -> bool {
    static FQDN: OnceLock<Regex> = OnceLock::new();

    if address.parse::<Ipv4Addr>().is_ok() {
        return true;
    }
    FQDN.get_or_init(|| {
        Regex::new(r"^(?i)([a-z0-9]+(-[a-z0-9]+)*\.)+[a-z]{2,}$").expect("valid fqdn regex")
    })
    .is_match(address)
}

pub(super) fn deployment_name_not_empty(d: &PxfDeployment) -> Result<(), ValidationError> {
    if d.name.is_empty() {
        return Err(ValidationError::EmptyDeploymentName);
    }
    Ok(())
}

pub(super) fn deployment_at_least_one_cluster(d: &PxfDeployment) -> Result<(), ValidationError> {
    if d.clusters.is_empty() {
        return Err(ValidationError::NoClusters {
            deployment: d.name.clone(),
        });
    }
    Ok(())
}

pub(super) fn deployment_hostname_unique(d: &PxfDeployment) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for host in d.clusters.iter().flat_map(|c| &c.hosts) {
        if !seen.insert(host.hostname.as_str()) {
            return Err(ValidationError::DuplicateHostname {
                hostname: host.hostname.clone(),
            });
        }
    }
    Ok(())
}

pub(super) fn deployment_group_name_unique(d: &PxfDeployment) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for group in d.clusters.iter().flat_map(|c| &c.groups) {
        if !seen.insert(group.name.as_str()) {
            return Err(ValidationError::DuplicateGroupName {
                group: group.name.clone(),
            });
        }
    }
    Ok(())
}

pub(super) fn deployment_at_most_one_collocated(d: &PxfDeployment) -> Result<(), ValidationError> {
    if d.clusters.iter().filter(|c| c.collocated).count() > 1 {
        return Err(ValidationError::MultipleCollocated);
    }
    Ok(())
}

pub(super) fn cluster_name_not_empty(c: &PxfCluster) -> Result<(), ValidationError> {
    if c.name.is_empty() {
        return Err(ValidationError::EmptyClusterName);
    }
    Ok(())
}

pub(super) fn cluster_collocated_hosts_ignored(c: &PxfCluster, warnings: &mut Vec<String>) {
    if c.collocated && !c.hosts.is_empty() {
        warnings.push(format!(
            "PXF host list of cluster `{0}` will be ignored, because cluster `{0}` is marked as collocated",
            c.name
        ));
    }
}

pub(super) fn cluster_collocated_endpoint_ignored(c: &PxfCluster, warnings: &mut Vec<String>) {
    if let (true, Some(endpoint)) = (c.collocated, c.endpoint()) {
        warnings.push(format!(
            "PXF endpoint `{}` of cluster `{1}` will be ignored, because cluster `{1}` is marked as collocated",
            endpoint, c.name
        ));
    }
}

pub(super) fn cluster_external_needs_hosts_or_endpoint(
    c: &PxfCluster,
) -> Result<(), ValidationError> {
    if !c.collocated && c.endpoint().is_none() && c.hosts.is_empty() {
        return Err(ValidationError::NoHostsOrEndpoint {
            cluster: c.name.clone(),
        });
    }
    Ok(())
}

pub(super) fn cluster_valid_endpoint(c: &PxfCluster) -> Result<(), ValidationError> {
    match c.endpoint() {
        Some(endpoint) if !is_valid_address(endpoint) => Err(ValidationError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            cluster: c.name.clone(),
        }),
        _ => Ok(()),
    }
}

pub(super) fn cluster_at_least_one_group(c: &PxfCluster) -> Result<(), ValidationError> {
    if c.groups.is_empty() {
        return Err(ValidationError::NoServiceGroups {
            cluster: c.name.clone(),
        });
    }
    Ok(())
}

pub(super) fn group_name_not_empty(g: &PxfServiceGroup) -> Result<(), ValidationError> {
    if g.name.is_empty() {
        return Err(ValidationError::EmptyGroupName);
    }
    Ok(())
}

pub(super) fn group_at_least_one_port(g: &PxfServiceGroup) -> Result<(), ValidationError> {
    if g.ports.is_empty() {
        return Err(ValidationError::NoPorts {
            group: g.name.clone(),
        });
    }
    Ok(())
}

pub(super) fn group_valid_ports(g: &PxfServiceGroup) -> Result<(), ValidationError> {
    match g.ports.iter().find(|p| !(MIN_PORT..=MAX_PORT).contains(*p)) {
        Some(&port) => Err(ValidationError::InvalidPort {
            port,
            group: g.name.clone(),
        }),
        None => Ok(()),
    }
}

pub(super) fn group_recommended_ports(g: &PxfServiceGroup, warnings: &mut Vec<String>) {
    for port in &g.ports {
        if !(MIN_RECOMMENDED_PORT..=MAX_RECOMMENDED_PORT).contains(port) {
            warnings.push(format!(
                "recommend using port numbers between `{}` - `{}`, rather than `{}` under the service group `{}`",
                MIN_RECOMMENDED_PORT, MAX_RECOMMENDED_PORT, port, g.name
            ));
        }
    }
}

pub(super) fn host_valid_hostname(h: &PxfHost) -> Result<(), ValidationError> {
    if !h.hostname.is_empty() && !is_valid_address(&h.hostname) {
        return Err(ValidationError::InvalidHostname {
            hostname: h.hostname.clone(),
        });
    }
    Ok(())
}

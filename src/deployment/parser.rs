//! Reader for the `key=value` deployment file.
//!
//! ```text
//! deployment.name=production
//! cluster.name=default
//! cluster.collocated=true
//! group.name=default
//! group.ports=5888
//! cluster.name=external
//! cluster.hosts=pxf1.example.com,pxf2.example.com
//! group.name=etl
//! group.ports=5888,5889
//! group.ssl=true
//! ```
//!
//! `cluster.name` starts a new cluster and `group.name` starts a new service
//! group in the current cluster.

use super::{PxfCluster, PxfDeployment, PxfHost, PxfServiceGroup};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

/// Parse a deployment file into its typed form. Blank lines and lines
/// starting with `#` are skipped.
pub fn parse_deployment(text: &str) -> Result<PxfDeployment, ParseError> {
    let mut deployment = PxfDeployment::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (key, value) = trimmed
            .split_once('=')
            .ok_or_else(|| ParseError::new(line, format!("expected key=value, got `{}`", trimmed)))?;
        let (key, value) = (key.trim(), value.trim());

        if key == "deployment.name" {
            deployment.name = value.to_string();
            continue;
        }
        if key == "cluster.name" {
            deployment.clusters.push(PxfCluster {
                name: value.to_string(),
                ..Default::default()
            });
            continue;
        }

        let cluster = deployment
            .clusters
            .last_mut()
            .ok_or_else(|| ParseError::new(line, format!("`{}` appears before any cluster.name", key)))?;

        match key {
            "cluster.collocated" => {
                cluster.collocated = parse_bool(value).ok_or_else(|| {
                    ParseError::new(line, format!("invalid boolean `{}` for {}", value, key))
                })?;
            }
            "cluster.endpoint" => cluster.endpoint = Some(value.to_string()),
            "cluster.hosts" => {
                cluster.hosts = parse_list(value).map(PxfHost::new).collect();
            }
            "group.name" => cluster.groups.push(PxfServiceGroup {
                name: value.to_string(),
                ..Default::default()
            }),
            "group.ports" | "group.ssl" => {
                let group = cluster.groups.last_mut().ok_or_else(|| {
                    ParseError::new(line, format!("`{}` appears before any group.name", key))
                })?;
                if key == "group.ports" {
                    group.ports = parse_list(value)
                        .map(|port| {
                            port.parse::<i64>().map_err(|_| {
                                ParseError::new(line, format!("invalid port `{}`", port))
                            })
                        })
                        .collect::<Result<_, _>>()?;
                } else {
                    group.is_ssl = parse_bool(value).ok_or_else(|| {
                        ParseError::new(line, format!("invalid boolean `{}` for {}", value, key))
                    })?;
                }
            }
            _ => return Err(ParseError::new(line, format!("unknown key `{}`", key))),
        }
    }

    Ok(deployment)
}

//! Endpoint discovery through `aws redshift describe-clusters`.

use super::{ClusterEndpoint, EndpointResolver, ProvisioningError};
use crate::config::AwsSettings;
use serde::Deserialize;
use std::process::{Command, Stdio};
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeClustersOutput {
    #[serde(default)]
    clusters: Vec<ClusterDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClusterDescription {
    cluster_identifier: Option<String>,
    cluster_status: Option<String>,
    endpoint: Option<EndpointDescription>,
    vpc_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointDescription {
    address: Option<String>,
    port: Option<u16>,
}

/// Extracts the endpoint of the first cluster in a `describe-clusters`
/// JSON document.
pub fn parse_describe_clusters(
    cluster_identifier: &str,
    output: &str,
) -> Result<ClusterEndpoint, ProvisioningError> {
    let parsed: DescribeClustersOutput = serde_json::from_str(output)
        .map_err(|e| ProvisioningError::InvalidOutput(format!("JSON parse error: {}", e)))?;

    let cluster = parsed
        .clusters
        .into_iter()
        .next()
        .ok_or_else(|| ProvisioningError::ClusterNotFound(cluster_identifier.to_string()))?;

    let identifier = cluster
        .cluster_identifier
        .unwrap_or_else(|| cluster_identifier.to_string());
    let status = cluster
        .cluster_status
        .unwrap_or_else(|| "unknown".to_string());

    match cluster.endpoint {
        Some(EndpointDescription {
            address: Some(host),
            port: Some(port),
        }) => Ok(ClusterEndpoint {
            host,
            port,
            vpc_id: cluster.vpc_id,
        }),
        _ => Err(ProvisioningError::EndpointUnavailable {
            cluster_identifier: identifier,
            status,
        }),
    }
}

pub struct AwsCliEndpointResolver {
    cluster_identifier: String,
    aws: AwsSettings,
    program: String,
}

impl AwsCliEndpointResolver {
    pub fn new(cluster_identifier: String, aws: AwsSettings) -> Self {
        Self {
            cluster_identifier,
            aws,
            program: "aws".to_string(),
        }
    }

    /// Uses a different executable in place of `aws`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["redshift", "describe-clusters", "--cluster-identifier"])
            .arg(&self.cluster_identifier)
            .args(["--region", self.aws.region.as_str(), "--output", "json"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(key) = &self.aws.access_key_id {
            command.env("AWS_ACCESS_KEY_ID", key);
        }
        if let Some(secret) = &self.aws.secret_access_key {
            command.env("AWS_SECRET_ACCESS_KEY", secret);
        }
        command
    }
}

impl EndpointResolver for AwsCliEndpointResolver {
    fn resolve(&self) -> Result<ClusterEndpoint, ProvisioningError> {
        info!(
            "Looking up endpoint of cluster {} in {}",
            self.cluster_identifier, self.aws.region
        );
        let output = self.command().output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProvisioningError::CommandFailed {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let endpoint = parse_describe_clusters(&self.cluster_identifier, &stdout)?;
        info!(
            "Cluster {} is at {}:{}",
            self.cluster_identifier, endpoint.host, endpoint.port
        );
        Ok(endpoint)
    }
}

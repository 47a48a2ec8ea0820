//! Locating the warehouse cluster before a session is opened.

mod aws_cli;

pub use aws_cli::{parse_describe_clusters, AwsCliEndpointResolver};

use crate::config::{AppConfig, EndpointSettings};
use thiserror::Error;

/// Network address of the cluster's leader node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterEndpoint {
    pub host: String,
    pub port: u16,
    pub vpc_id: Option<String>,
}

impl ClusterEndpoint {
    /// Placeholder endpoint for the local engine, which has no cluster.
    pub fn local() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
            vpc_id: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Failed to launch aws cli")]
    Launch(#[from] std::io::Error),

    #[error("aws cli exited with {status}: {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Invalid describe-clusters output: {0}")]
    InvalidOutput(String),

    #[error("Cluster {0} not found")]
    ClusterNotFound(String),

    #[error("Cluster {cluster_identifier} has no endpoint yet (status: {status})")]
    EndpointUnavailable {
        cluster_identifier: String,
        status: String,
    },
}

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EndpointResolver {
    fn resolve(&self) -> Result<ClusterEndpoint, ProvisioningError>;
}

/// Returns the endpoint it was configured with.
pub struct StaticEndpointResolver {
    endpoint: ClusterEndpoint,
}

impl StaticEndpointResolver {
    pub fn new(endpoint: ClusterEndpoint) -> Self {
        Self { endpoint }
    }
}

impl EndpointResolver for StaticEndpointResolver {
    fn resolve(&self) -> Result<ClusterEndpoint, ProvisioningError> {
        Ok(self.endpoint.clone())
    }
}

/// Builds the resolver matching the configured endpoint discovery.
pub fn resolver_for(config: &AppConfig) -> Box<dyn EndpointResolver> {
    match &config.endpoint {
        EndpointSettings::Static { host, port } => {
            Box::new(StaticEndpointResolver::new(ClusterEndpoint {
                host: host.clone(),
                port: *port,
                vpc_id: None,
            }))
        }
        EndpointSettings::AwsCli { cluster_identifier } => Box::new(AwsCliEndpointResolver::new(
            cluster_identifier.clone(),
            config.aws.clone(),
        )),
        EndpointSettings::Local => Box::new(StaticEndpointResolver::new(ClusterEndpoint::local())),
    }
}

mod file_config;

pub use file_config::{AwsConfig, ClusterConfig, FileConfig, IamRoleConfig, S3Config};

use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_REDSHIFT_PORT: u16 = 5439;

/// Engine the statements are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EngineKind {
    #[default]
    Redshift,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EndpointDiscovery {
    /// Use the host configured in `[cluster]`.
    Static,
    /// Ask `aws redshift describe-clusters` for the live endpoint.
    AwsCli,
}

/// CLI arguments that can be used for config resolution.
/// Values found in the TOML file take precedence over these.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub engine: Option<EngineKind>,
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointSettings {
    Static { host: String, port: u16 },
    AwsCli { cluster_identifier: String },
    /// Local engine, there is no cluster to look up.
    Local,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub name: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AwsSettings {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Object-storage locations and credentials used by the bulk copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    pub log_data: String,
    pub log_jsonpath: String,
    pub song_data: String,
    pub iam_role_arn: String,
    pub region: String,
}

/// Fully resolved, immutable configuration handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub engine: EngineKind,
    pub endpoint: EndpointSettings,
    pub database: DatabaseSettings,
    pub sqlite_path: Option<PathBuf>,
    pub aws: AwsSettings,
    pub sources: SourceSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let aws_file = file.aws.unwrap_or_default();
        let cluster_file = file.cluster.unwrap_or_default();
        let s3_file = file.s3.unwrap_or_default();
        let iam_file = file.iam_role.unwrap_or_default();

        let engine = match cluster_file.engine.as_deref() {
            Some(s) => parse_engine(s)?,
            None => cli.engine.unwrap_or_default(),
        };

        let sqlite_path = cluster_file
            .sqlite_path
            .map(PathBuf::from)
            .or_else(|| cli.sqlite_path.clone());

        let region = aws_file
            .region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let port = cluster_file.port.unwrap_or(DEFAULT_REDSHIFT_PORT);

        let endpoint = match engine {
            EngineKind::Sqlite => {
                if sqlite_path.is_none() {
                    bail!("sqlite_path must be specified via --sqlite-path or in [cluster] when using the sqlite engine");
                }
                EndpointSettings::Local
            }
            EngineKind::Redshift => {
                let discovery = match aws_file.endpoint_discovery.as_deref() {
                    Some(s) => Some(parse_discovery(s)?),
                    None => None,
                };
                resolve_endpoint(
                    discovery,
                    cluster_file.host.clone(),
                    aws_file.cluster_identifier.clone(),
                    port,
                )?
            }
        };

        let database = match engine {
            EngineKind::Redshift => DatabaseSettings {
                name: required(cluster_file.db_name, "cluster.db_name")?,
                user: required(cluster_file.db_user, "cluster.db_user")?,
                password: required(cluster_file.db_password, "cluster.db_password")?,
                connect_timeout_secs: cluster_file.connect_timeout_secs,
            },
            EngineKind::Sqlite => DatabaseSettings {
                name: cluster_file.db_name.unwrap_or_default(),
                user: cluster_file.db_user.unwrap_or_default(),
                password: cluster_file.db_password.unwrap_or_default(),
                connect_timeout_secs: cluster_file.connect_timeout_secs,
            },
        };

        let iam_role_arn = match engine {
            EngineKind::Redshift => required(iam_file.arn, "iam_role.arn")?,
            EngineKind::Sqlite => iam_file.arn.unwrap_or_default(),
        };

        let sources = SourceSettings {
            log_data: required(s3_file.log_data, "s3.log_data")?,
            log_jsonpath: required(s3_file.log_jsonpath, "s3.log_jsonpath")?,
            song_data: required(s3_file.song_data, "s3.song_data")?,
            iam_role_arn,
            region: region.clone(),
        };

        Ok(Self {
            engine,
            endpoint,
            database,
            sqlite_path,
            aws: AwsSettings {
                region,
                access_key_id: aws_file.key,
                secret_access_key: aws_file.secret,
            },
            sources,
        })
    }
}

fn resolve_endpoint(
    discovery: Option<EndpointDiscovery>,
    host: Option<String>,
    cluster_identifier: Option<String>,
    port: u16,
) -> Result<EndpointSettings> {
    // Without an explicit choice a configured host wins over discovery
    let discovery = match discovery {
        Some(d) => d,
        None if host.is_some() => EndpointDiscovery::Static,
        None if cluster_identifier.is_some() => EndpointDiscovery::AwsCli,
        None => bail!("either cluster.host or aws.cluster_identifier must be specified"),
    };
    match discovery {
        EndpointDiscovery::Static => Ok(EndpointSettings::Static {
            host: required(host, "cluster.host")?,
            port,
        }),
        EndpointDiscovery::AwsCli => Ok(EndpointSettings::AwsCli {
            cluster_identifier: required(cluster_identifier, "aws.cluster_identifier")?,
        }),
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("{} must be specified in config file", key),
    }
}

/// Parses an engine name. Uses clap's ValueEnum trait for parsing.
fn parse_engine(s: &str) -> Result<EngineKind> {
    EngineKind::from_str(s, true).map_err(|_| anyhow::anyhow!("Unknown engine: {}", s))
}

fn parse_discovery(s: &str) -> Result<EndpointDiscovery> {
    EndpointDiscovery::from_str(s, true)
        .map_err(|_| anyhow::anyhow!("Unknown endpoint discovery: {}", s))
}

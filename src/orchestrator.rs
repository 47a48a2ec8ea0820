//! One run of the warehouse jobs: resolve the endpoint, open a session, run
//! the pipelines, close the session.

use crate::config::{AppConfig, SourceSettings};
use crate::pipeline::{LoadPipeline, PipelineError, SchemaPipeline, StageReport};
use crate::provisioning::{resolver_for, ClusterEndpoint, EndpointResolver, ProvisioningError};
use crate::statements::StatementCatalog;
use crate::warehouse::{connector_for, Connector, SessionError, WarehouseSession};
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Schema Pipeline only.
    CreateTables,
    /// Load Pipeline only, against existing tables.
    Etl,
    /// Schema Pipeline, then Load Pipeline, on the same session.
    Full,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::CreateTables => write!(f, "create-tables"),
            Job::Etl => write!(f, "etl"),
            Job::Full => write!(f, "full"),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Failed to resolve cluster endpoint")]
    Provisioning(#[from] ProvisioningError),

    #[error("Failed to set up warehouse connector")]
    Setup(#[source] SessionError),

    #[error("Failed to connect to {host}:{port}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: SessionError,
    },

    #[error("Pipeline failed")]
    Pipeline(#[from] PipelineError),

    #[error("Failed to close session")]
    Close(#[source] SessionError),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub job: Job,
    pub endpoint: ClusterEndpoint,
    pub stages: Vec<StageReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn statements_committed(&self) -> usize {
        self.stages.iter().map(StageReport::committed).sum()
    }
}

pub struct Orchestrator {
    resolver: Box<dyn EndpointResolver>,
    connector: Box<dyn Connector>,
    sources: SourceSettings,
}

impl Orchestrator {
    pub fn new(
        resolver: Box<dyn EndpointResolver>,
        connector: Box<dyn Connector>,
        sources: SourceSettings,
    ) -> Self {
        Self {
            resolver,
            connector,
            sources,
        }
    }

    /// Wires the resolver and connector selected by the configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, OrchestrationError> {
        let connector = connector_for(config).map_err(OrchestrationError::Setup)?;
        Ok(Self::new(
            resolver_for(config),
            connector,
            config.sources.clone(),
        ))
    }

    pub fn run(&self, job: Job) -> Result<RunReport, OrchestrationError> {
        let start = Instant::now();
        info!("Starting {} job", job);

        let endpoint = self.resolver.resolve()?;
        let mut session =
            self.connector
                .connect(&endpoint)
                .map_err(|source| OrchestrationError::Connect {
                    host: endpoint.host.clone(),
                    port: endpoint.port,
                    source,
                })?;

        let catalog = StatementCatalog::build(self.connector.dialect(), &self.sources);

        match run_job(session.as_mut(), &catalog, job) {
            Ok(stages) => {
                session.close().map_err(OrchestrationError::Close)?;
                let report = RunReport {
                    job,
                    endpoint,
                    stages,
                    elapsed: start.elapsed(),
                };
                info!(
                    "{} job finished: {} statements committed in {:?}",
                    job,
                    report.statements_committed(),
                    report.elapsed
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(close_err) = session.close() {
                    warn!("Failed to close session after error: {}", close_err);
                }
                Err(e.into())
            }
        }
    }
}

fn run_job(
    session: &mut dyn WarehouseSession,
    catalog: &StatementCatalog,
    job: Job,
) -> Result<Vec<StageReport>, PipelineError> {
    let mut stages = Vec::new();
    if matches!(job, Job::CreateTables | Job::Full) {
        stages.extend(SchemaPipeline::new(&mut *session, catalog).run()?);
    }
    if matches!(job, Job::Etl | Job::Full) {
        stages.extend(LoadPipeline::new(&mut *session, catalog).run()?);
    }
    Ok(stages)
}

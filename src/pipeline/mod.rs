//! The Schema and Load pipelines.
//!
//! Each pipeline is a small state machine over one borrowed session. A
//! stage runs its statements through [`crate::executor::execute_statements`]
//! and the pipeline only advances when every statement committed.

mod load_pipeline;
mod schema_pipeline;

pub use load_pipeline::{LoadPipeline, LoadState};
pub use schema_pipeline::{SchemaPipeline, SchemaState};

use crate::warehouse::SessionError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DropSchema,
    CreateSchema,
    LoadStaging,
    Transform,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::DropSchema => write!(f, "drop-schema"),
            Stage::CreateSchema => write!(f, "create-schema"),
            Stage::LoadStaging => write!(f, "load-staging"),
            Stage::Transform => write!(f, "transform"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage}: statement {position} ({name}) failed")]
    Statement {
        stage: Stage,
        position: usize,
        name: String,
        #[source]
        source: SessionError,
    },

    #[error("{stage}: commit after statement {position} ({name}) failed")]
    Commit {
        stage: Stage,
        position: usize,
        name: String,
        #[source]
        source: SessionError,
    },

    #[error("{0}: no statements to run")]
    EmptyStage(Stage),

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: String, action: &'static str },
}

impl PipelineError {
    /// Number of statements of the failing stage that committed before the
    /// failure.
    pub fn committed_before_failure(&self) -> usize {
        match self {
            PipelineError::Statement { position, .. } => position - 1,
            PipelineError::Commit { position, .. } => position - 1,
            PipelineError::EmptyStage(_) | PipelineError::InvalidTransition { .. } => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatementOutcome {
    /// 1-based position within the stage.
    pub position: usize,
    pub name: String,
    pub table: &'static str,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub statements: Vec<StatementOutcome>,
    pub elapsed: Duration,
}

impl StageReport {
    pub fn committed(&self) -> usize {
        self.statements.len()
    }
}

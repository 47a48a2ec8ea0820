use super::{PipelineError, Stage, StageReport};
use crate::executor::execute_statements;
use crate::statements::StatementCatalog;
use crate::warehouse::WarehouseSession;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    SchemaReady,
    Staged,
    Transformed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::SchemaReady => write!(f, "schema-ready"),
            LoadState::Staged => write!(f, "staged"),
            LoadState::Transformed => write!(f, "transformed"),
        }
    }
}

/// Bulk-copies the raw JSON into staging, then fills the star schema.
///
/// Assumes the seven tables exist. Staging tables are appended to, and
/// the transforms insert without deduplicating against existing rows.
pub struct LoadPipeline<'a> {
    session: &'a mut dyn WarehouseSession,
    catalog: &'a StatementCatalog,
    state: LoadState,
}

impl<'a> LoadPipeline<'a> {
    pub fn new(session: &'a mut dyn WarehouseSession, catalog: &'a StatementCatalog) -> Self {
        Self {
            session,
            catalog,
            state: LoadState::SchemaReady,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn load_staging(&mut self) -> Result<StageReport, PipelineError> {
        if self.state != LoadState::SchemaReady {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                action: "load staging tables",
            });
        }
        let report = execute_statements(
            &mut *self.session,
            Stage::LoadStaging,
            &self.catalog.copy_tables,
        )?;
        self.state = LoadState::Staged;
        Ok(report)
    }

    pub fn transform(&mut self) -> Result<StageReport, PipelineError> {
        if self.state != LoadState::Staged {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                action: "transform",
            });
        }
        let report = execute_statements(
            &mut *self.session,
            Stage::Transform,
            &self.catalog.insert_tables,
        )?;
        self.state = LoadState::Transformed;
        Ok(report)
    }

    pub fn run(&mut self) -> Result<Vec<StageReport>, PipelineError> {
        let staged = self.load_staging()?;
        let transformed = self.transform()?;
        Ok(vec![staged, transformed])
    }
}

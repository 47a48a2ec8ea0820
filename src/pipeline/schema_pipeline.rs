use super::{PipelineError, Stage, StageReport};
use crate::executor::execute_statements;
use crate::statements::StatementCatalog;
use crate::warehouse::WarehouseSession;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaState {
    Uninitialized,
    Dropped,
    Created,
}

impl fmt::Display for SchemaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaState::Uninitialized => write!(f, "uninitialized"),
            SchemaState::Dropped => write!(f, "dropped"),
            SchemaState::Created => write!(f, "created"),
        }
    }
}

/// Drops and recreates the seven warehouse tables.
pub struct SchemaPipeline<'a> {
    session: &'a mut dyn WarehouseSession,
    catalog: &'a StatementCatalog,
    state: SchemaState,
}

impl<'a> SchemaPipeline<'a> {
    pub fn new(session: &'a mut dyn WarehouseSession, catalog: &'a StatementCatalog) -> Self {
        Self {
            session,
            catalog,
            state: SchemaState::Uninitialized,
        }
    }

    pub fn state(&self) -> SchemaState {
        self.state
    }

    /// Drops every table, staging first. Tables that do not exist are skipped
    /// by the statements themselves.
    pub fn drop_tables(&mut self) -> Result<StageReport, PipelineError> {
        if self.state == SchemaState::Dropped {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                action: "drop tables",
            });
        }
        let report = execute_statements(
            &mut *self.session,
            Stage::DropSchema,
            &self.catalog.drop_tables,
        )?;
        self.state = SchemaState::Dropped;
        Ok(report)
    }

    /// Creates every table, referenced tables before the fact table.
    pub fn create_tables(&mut self) -> Result<StageReport, PipelineError> {
        if self.state != SchemaState::Dropped {
            return Err(PipelineError::InvalidTransition {
                from: self.state.to_string(),
                action: "create tables",
            });
        }
        let report = execute_statements(
            &mut *self.session,
            Stage::CreateSchema,
            &self.catalog.create_tables,
        )?;
        self.state = SchemaState::Created;
        Ok(report)
    }

    pub fn run(&mut self) -> Result<Vec<StageReport>, PipelineError> {
        let dropped = self.drop_tables()?;
        let created = self.create_tables()?;
        info!("Schema reset ({} dialect)", self.catalog.dialect);
        Ok(vec![dropped, created])
    }
}

//! Database sessions the pipelines send their statements through.
//!
//! A [`Connector`] opens one [`WarehouseSession`] per run. The session is
//! exclusively owned by the run and closed exactly once at the end.

mod json_copy;
mod postgres_session;
mod sqlite_session;

pub use json_copy::{source_files, CopyError, JsonPath};
pub use postgres_session::{PostgresConnector, PostgresSession};
pub use sqlite_session::{SqliteConnector, SqliteSession};

use crate::config::{AppConfig, EngineKind};
use crate::provisioning::ClusterEndpoint;
use crate::schema::Dialect;
use crate::statements::Statement;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Postgres(#[from] postgres::Error),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Copy(#[from] CopyError),

    #[error("{0}")]
    Unsupported(String),
}

/// An open database session.
///
/// `execute` runs one statement inside the session's current transaction,
/// opening one if needed. `commit` makes everything executed so far durable.
pub trait WarehouseSession {
    fn execute(&mut self, statement: &Statement) -> Result<(), SessionError>;

    fn commit(&mut self) -> Result<(), SessionError>;

    /// Releases the connection. Uncommitted work is discarded.
    fn close(self: Box<Self>) -> Result<(), SessionError>;
}

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait Connector {
    /// Dialect the statements sent through this connector must be rendered in.
    fn dialect(&self) -> Dialect;

    fn connect(&self, endpoint: &ClusterEndpoint)
        -> Result<Box<dyn WarehouseSession>, SessionError>;
}

/// Builds the connector for the configured engine.
pub fn connector_for(config: &AppConfig) -> Result<Box<dyn Connector>, SessionError> {
    match config.engine {
        EngineKind::Redshift => Ok(Box::new(PostgresConnector::new(config.database.clone()))),
        EngineKind::Sqlite => match &config.sqlite_path {
            Some(path) => Ok(Box::new(SqliteConnector::new(path.clone()))),
            None => Err(SessionError::Unsupported(
                "the sqlite engine needs a database path".to_string(),
            )),
        },
    }
}

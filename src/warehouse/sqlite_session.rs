use super::json_copy;
use super::{Connector, SessionError, WarehouseSession};
use crate::provisioning::ClusterEndpoint;
use crate::schema::Dialect;
use crate::statements::{Intent, Statement};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Opens sessions on a local SQLite database file.
pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Connector for SqliteConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(
        &self,
        _endpoint: &ClusterEndpoint,
    ) -> Result<Box<dyn WarehouseSession>, SessionError> {
        info!("Opening local warehouse {:?}", self.path);
        Ok(Box::new(SqliteSession::open(&self.path)?))
    }
}

pub struct SqliteSession {
    conn: Connection,
}

impl SqliteSession {
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        Self::configure(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SessionError> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self, SessionError> {
        // Foreign keys are declared but, as on Redshift, not enforced.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn run(&mut self, statement: &Statement) -> Result<(), SessionError> {
        match &statement.intent {
            Intent::BulkCopy(spec) => {
                debug!("{} (local copy): {}", statement.name, statement.sql.trim());
                json_copy::copy_into(&self.conn, statement.table, spec)?;
            }
            _ => {
                debug!("{}: {}", statement.name, statement.sql.trim());
                self.conn.execute_batch(&statement.sql)?;
            }
        }
        Ok(())
    }
}

impl WarehouseSession for SqliteSession {
    fn execute(&mut self, statement: &Statement) -> Result<(), SessionError> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        let result = self.run(statement);
        if result.is_err() && !self.conn.is_autocommit() {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                warn!("Failed to roll back after {}: {}", statement.name, e);
            }
        }
        result
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.conn.close().map_err(|(_, e)| SessionError::from(e))
    }
}

use super::{Connector, SessionError, WarehouseSession};
use crate::config::DatabaseSettings;
use crate::provisioning::ClusterEndpoint;
use crate::schema::Dialect;
use crate::statements::Statement;
use postgres::{Client, NoTls};
use std::time::Duration;
use tracing::{debug, info};

/// Opens sessions against a Redshift cluster over the Postgres protocol.
pub struct PostgresConnector {
    database: DatabaseSettings,
}

impl PostgresConnector {
    pub fn new(database: DatabaseSettings) -> Self {
        Self { database }
    }

    fn client_config(&self, endpoint: &ClusterEndpoint) -> postgres::Config {
        let mut config = postgres::Config::new();
        config
            .host(&endpoint.host)
            .port(endpoint.port)
            .dbname(&self.database.name)
            .user(&self.database.user)
            .password(&self.database.password)
            .application_name("sparkify-dwh");
        if let Some(secs) = self.database.connect_timeout_secs {
            config.connect_timeout(Duration::from_secs(secs));
        }
        config
    }
}

impl Connector for PostgresConnector {
    fn dialect(&self) -> Dialect {
        Dialect::Redshift
    }

    fn connect(
        &self,
        endpoint: &ClusterEndpoint,
    ) -> Result<Box<dyn WarehouseSession>, SessionError> {
        info!(
            "Connecting to {}:{}/{} as {}",
            endpoint.host, endpoint.port, self.database.name, self.database.user
        );
        let client = self.client_config(endpoint).connect(NoTls)?;
        Ok(Box::new(PostgresSession {
            client,
            in_transaction: false,
        }))
    }
}

pub struct PostgresSession {
    client: Client,
    in_transaction: bool,
}

impl WarehouseSession for PostgresSession {
    fn execute(&mut self, statement: &Statement) -> Result<(), SessionError> {
        if !self.in_transaction {
            self.client.batch_execute("BEGIN")?;
            self.in_transaction = true;
        }
        debug!("{}: {}", statement.name, statement.sql.trim());
        self.client.batch_execute(&statement.sql)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), SessionError> {
        if self.in_transaction {
            self.client.batch_execute("COMMIT")?;
            self.in_transaction = false;
        }
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.client.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_uses_resolved_endpoint() {
        let connector = PostgresConnector::new(DatabaseSettings {
            name: "sparkify".to_string(),
            user: "awsuser".to_string(),
            password: "Passw0rd".to_string(),
            connect_timeout_secs: Some(10),
        });
        let endpoint = ClusterEndpoint {
            host: "sparkify.abc123.us-west-2.redshift.amazonaws.com".to_string(),
            port: 5440,
            vpc_id: None,
        };

        let config = connector.client_config(&endpoint);
        assert_eq!(config.get_ports(), &[5440]);
        assert_eq!(config.get_dbname(), Some("sparkify"));
        assert_eq!(config.get_user(), Some("awsuser"));
        assert_eq!(config.get_connect_timeout(), Some(&Duration::from_secs(10)));
        assert_eq!(connector.dialect(), Dialect::Redshift);
    }
}

//! Table descriptors for the warehouse schema and their DDL rendering.
//!
//! Tables are declared once as static data and rendered into the SQL dialect
//! of whichever engine runs the pipelines.

mod tables;

pub use tables::{
    ARTISTS_TABLE, CREATE_ORDER, DROP_ORDER, SONGPLAYS_TABLE, SONGS_TABLE, STAGING_EVENTS_TABLE,
    STAGING_SONGS_TABLE, TIME_TABLE, USERS_TABLE,
};

use std::fmt;

#[macro_export]
macro_rules! warehouse_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Only mutated when field overrides are passed.
            #[allow(unused_mut)]
            let mut column = $crate::schema::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_identity: false,
                foreign_key: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

/// SQL flavour a statement is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Redshift, reached over the Postgres wire protocol.
    Redshift,
    /// Local SQLite engine used for development runs and tests.
    Sqlite,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Redshift => write!(f, "redshift"),
            Dialect::Sqlite => write!(f, "sqlite"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Char,
    Int,
    BigInt,
    Float,
    Varchar(Option<u16>),
    Timestamp,
}

impl SqlType {
    fn render(&self, dialect: Dialect) -> String {
        match dialect {
            Dialect::Redshift => match self {
                SqlType::Text => "TEXT".to_string(),
                SqlType::Char => "CHAR".to_string(),
                SqlType::Int => "INT".to_string(),
                SqlType::BigInt => "BIGINT".to_string(),
                SqlType::Float => "FLOAT".to_string(),
                SqlType::Varchar(None) => "VARCHAR".to_string(),
                SqlType::Varchar(Some(len)) => format!("VARCHAR({})", len),
                SqlType::Timestamp => "TIMESTAMP".to_string(),
            },
            // Timestamps are stored as 'YYYY-MM-DD HH:MM:SS' text so that
            // strftime() can decompose them.
            Dialect::Sqlite => match self {
                SqlType::Text | SqlType::Char | SqlType::Varchar(_) | SqlType::Timestamp => {
                    "TEXT".to_string()
                }
                SqlType::Int | SqlType::BigInt => "INTEGER".to_string(),
                SqlType::Float => "REAL".to_string(),
            },
        }
    }
}

#[derive(Debug)]
pub struct ForeignKey {
    pub foreign_table: &'static str,
    pub foreign_column: &'static str,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    /// Surrogate key generated by the engine on insert.
    pub is_identity: bool,
    pub foreign_key: Option<&'static ForeignKey>,
}

impl Column {
    fn render(&self, dialect: Dialect) -> String {
        let mut sql = format!("{} ", self.name);
        match (dialect, self.is_identity) {
            (Dialect::Redshift, true) => {
                sql.push_str(&self.sql_type.render(dialect));
                sql.push_str(" IDENTITY(0,1)");
            }
            (Dialect::Sqlite, true) => sql.push_str("INTEGER PRIMARY KEY AUTOINCREMENT"),
            (_, false) => sql.push_str(&self.sql_type.render(dialect)),
        }
        // Redshift keeps primary keys informational. SQLite would enforce
        // them, so the local engine only declares the identity key.
        if self.is_primary_key && dialect == Dialect::Redshift {
            sql.push_str(" PRIMARY KEY");
        }
        if self.non_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(foreign_key) = self.foreign_key {
            sql.push_str(&format!(
                " REFERENCES {}({})",
                foreign_key.foreign_table, foreign_key.foreign_column
            ));
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Staging,
    Dimension,
    Fact,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    /// Prefix of the statement names, e.g. `user` for `user_table_create`.
    pub statement_prefix: &'static str,
    pub kind: TableKind,
    pub columns: &'static [Column],
}

impl Table {
    pub fn create_sql(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| c.render(dialect))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({});", self.name, columns)
    }

    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// Tables this one declares foreign keys into.
    pub fn referenced_tables(&self) -> Vec<&'static str> {
        let mut referenced: Vec<&'static str> = self
            .columns
            .iter()
            .filter_map(|c| c.foreign_key.map(|fk| fk.foreign_table))
            .collect();
        referenced.dedup();
        referenced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redshift_identity_column_keeps_primary_key() {
        let sql = SONGPLAYS_TABLE.create_sql(Dialect::Redshift);
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS songplays ("));
        assert!(sql.contains("songplay_id INT IDENTITY(0,1) PRIMARY KEY"));
        assert!(sql.contains("start_time TIMESTAMP REFERENCES time(start_time)"));
        assert!(sql.contains("artist_id VARCHAR REFERENCES artists(artist_id)"));
    }

    #[test]
    fn test_sqlite_rendering_drops_informational_primary_keys() {
        let sql = USERS_TABLE.create_sql(Dialect::Sqlite);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS users (user_id INTEGER, first_name TEXT NOT NULL, \
             last_name TEXT, gender TEXT, level TEXT);"
        );

        let sql = SONGPLAYS_TABLE.create_sql(Dialect::Sqlite);
        assert!(sql.contains("songplay_id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(sql.contains("user_id INTEGER REFERENCES users(user_id)"));
    }

    #[test]
    fn test_redshift_varchar_lengths() {
        let sql = STAGING_EVENTS_TABLE.create_sql(Dialect::Redshift);
        assert!(sql.contains("method VARCHAR(3)"));
        assert!(sql.contains("registration BIGINT"));
        let sql = USERS_TABLE.create_sql(Dialect::Redshift);
        assert!(sql.contains("user_id INT PRIMARY KEY"));
        assert!(sql.contains("last_name VARCHAR(255)"));
    }

    #[test]
    fn test_drop_sql() {
        assert_eq!(TIME_TABLE.drop_sql(), "DROP TABLE IF EXISTS time");
    }

    #[test]
    fn test_referenced_tables() {
        assert_eq!(
            SONGPLAYS_TABLE.referenced_tables(),
            vec!["time", "users", "songs", "artists"]
        );
        assert!(STAGING_SONGS_TABLE.referenced_tables().is_empty());
    }
}

//! Statement descriptors and the ordered statement lists both pipelines run.
//!
//! SQL text is data here: every list is built once for a dialect and never
//! changes afterwards.

mod redshift;
mod sqlite;

use crate::config::SourceSettings;
use crate::schema::{
    Dialect, ARTISTS_TABLE, CREATE_ORDER, DROP_ORDER, SONGPLAYS_TABLE, SONGS_TABLE,
    STAGING_EVENTS_TABLE, STAGING_SONGS_TABLE, TIME_TABLE, USERS_TABLE,
};

/// How the JSON records of a bulk copy map onto table columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFormat {
    /// Object keys are matched against column names.
    Auto,
    /// Location of a `{"jsonpaths": [...]}` document, one path per column.
    JsonPaths(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopySpec {
    pub source: String,
    pub format: JsonFormat,
    pub iam_role_arn: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    DropTable,
    CreateTable,
    BulkCopy(CopySpec),
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: String,
    pub table: &'static str,
    pub intent: Intent,
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct StatementCatalog {
    pub dialect: Dialect,
    pub drop_tables: Vec<Statement>,
    pub create_tables: Vec<Statement>,
    pub copy_tables: Vec<Statement>,
    pub insert_tables: Vec<Statement>,
}

impl StatementCatalog {
    pub fn build(dialect: Dialect, sources: &SourceSettings) -> Self {
        let drop_tables = DROP_ORDER
            .iter()
            .map(|table| Statement {
                name: format!("{}_table_drop", table.statement_prefix),
                table: table.name,
                intent: Intent::DropTable,
                sql: table.drop_sql(),
            })
            .collect();

        let create_tables = CREATE_ORDER
            .iter()
            .map(|table| Statement {
                name: format!("{}_table_create", table.statement_prefix),
                table: table.name,
                intent: Intent::CreateTable,
                sql: table.create_sql(dialect),
            })
            .collect();

        let events_copy = CopySpec {
            source: sources.log_data.clone(),
            format: JsonFormat::JsonPaths(sources.log_jsonpath.clone()),
            iam_role_arn: sources.iam_role_arn.clone(),
            region: sources.region.clone(),
        };
        let songs_copy = CopySpec {
            source: sources.song_data.clone(),
            format: JsonFormat::Auto,
            iam_role_arn: sources.iam_role_arn.clone(),
            region: sources.region.clone(),
        };
        // Both dialects carry the Redshift COPY text. The local engine reads
        // the structured `CopySpec` instead and only logs the text.
        let copy_tables = vec![
            Statement {
                name: "staging_events_copy".to_string(),
                table: STAGING_EVENTS_TABLE.name,
                sql: render_copy(STAGING_EVENTS_TABLE.name, &events_copy),
                intent: Intent::BulkCopy(events_copy),
            },
            Statement {
                name: "staging_songs_copy".to_string(),
                table: STAGING_SONGS_TABLE.name,
                sql: render_copy(STAGING_SONGS_TABLE.name, &songs_copy),
                intent: Intent::BulkCopy(songs_copy),
            },
        ];

        let inserts = match dialect {
            Dialect::Redshift => [
                redshift::SONGPLAY_TABLE_INSERT,
                redshift::USER_TABLE_INSERT,
                redshift::SONG_TABLE_INSERT,
                redshift::ARTIST_TABLE_INSERT,
                redshift::TIME_TABLE_INSERT,
            ],
            Dialect::Sqlite => [
                sqlite::SONGPLAY_TABLE_INSERT,
                sqlite::USER_TABLE_INSERT,
                sqlite::SONG_TABLE_INSERT,
                sqlite::ARTIST_TABLE_INSERT,
                sqlite::TIME_TABLE_INSERT,
            ],
        };
        // songplays first: time is derived from its start_time values
        let insert_targets = [
            ("songplay_table_insert", SONGPLAYS_TABLE.name),
            ("user_table_insert", USERS_TABLE.name),
            ("song_table_insert", SONGS_TABLE.name),
            ("artist_table_insert", ARTISTS_TABLE.name),
            ("time_table_insert", TIME_TABLE.name),
        ];
        let insert_tables = insert_targets
            .into_iter()
            .zip(inserts)
            .map(|((name, table), sql)| Statement {
                name: name.to_string(),
                table,
                intent: Intent::Insert,
                sql: sql.to_string(),
            })
            .collect();

        Self {
            dialect,
            drop_tables,
            create_tables,
            copy_tables,
            insert_tables,
        }
    }
}

/// Quotes a value as a SQL string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn render_copy(table: &str, spec: &CopySpec) -> String {
    let format = match &spec.format {
        JsonFormat::Auto => quote_literal("auto"),
        JsonFormat::JsonPaths(location) => quote_literal(location),
    };
    redshift::STAGING_COPY
        .replace("{table}", table)
        .replace("{source}", &quote_literal(&spec.source))
        .replace(
            "{credentials}",
            &quote_literal(&format!("aws_iam_role={}", spec.iam_role_arn)),
        )
        .replace("{format}", &format)
        .replace("{region}", &quote_literal(&spec.region))
}

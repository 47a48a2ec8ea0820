use super::fixtures;
use rusqlite::types::FromSql;
use serde_json::Value;
use sparkify_dwh::config::{AppConfig, CliConfig, FileConfig};
use sparkify_dwh::schema::Dialect;
use sparkify_dwh::statements::StatementCatalog;
use sparkify_dwh::warehouse::SqliteSession;
use sparkify_dwh::{Job, OrchestrationError, Orchestrator, RunReport};
use tempfile::TempDir;

/// A local warehouse file plus the source data it loads from.
pub struct TestWarehouse {
    pub config: AppConfig,
    // Keeps the directory alive for the duration of the test
    _dir: TempDir,
}

impl TestWarehouse {
    pub fn new() -> Self {
        Self::with_events(&fixtures::default_events())
    }

    pub fn with_events(events: &[Value]) -> Self {
        let dir = TempDir::new().unwrap();
        fixtures::write_song_data(dir.path());
        fixtures::write_log_data(dir.path(), events);
        fixtures::write_jsonpaths(dir.path());
        let config_path = fixtures::write_config(dir.path());

        let file_config = FileConfig::load(&config_path).unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap();
        Self { config, _dir: dir }
    }

    pub fn run(&self, job: Job) -> Result<RunReport, OrchestrationError> {
        Orchestrator::from_config(&self.config)?.run(job)
    }

    pub fn catalog(&self) -> StatementCatalog {
        StatementCatalog::build(Dialect::Sqlite, &self.config.sources)
    }

    pub fn open(&self) -> SqliteSession {
        SqliteSession::open(self.config.sqlite_path.as_ref().unwrap()).unwrap()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.open()
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                r.get(0)
            })
            .unwrap()
    }

    /// First column of every row returned by `sql`.
    pub fn column<T: FromSql>(&self, sql: &str) -> Vec<T> {
        let session = self.open();
        let mut stmt = session.connection().prepare(sql).unwrap();
        let values = stmt
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<Result<Vec<T>, _>>()
            .unwrap();
        values
    }

    /// Stored `CREATE TABLE` text of every user table, by table name.
    pub fn table_definitions(&self) -> Vec<String> {
        self.column("SELECT sql FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
    }

    pub fn table_names(&self) -> Vec<String> {
        self.column("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
    }
}

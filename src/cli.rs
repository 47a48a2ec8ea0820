//! Pieces shared by the `etl` and `create-tables` binaries.

use crate::cli_style;
use crate::config::{AppConfig, CliConfig, EngineKind, FileConfig};
use crate::orchestrator::{Job, Orchestrator, RunReport};
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Engine the statements are sent to.
    #[clap(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// SQLite database file used by the sqlite engine.
    #[clap(long, value_parser = parse_path)]
    pub sqlite_path: Option<PathBuf>,
}

impl From<&CommonArgs> for CliConfig {
    fn from(args: &CommonArgs) -> Self {
        CliConfig {
            engine: args.engine,
            sqlite_path: args.sqlite_path.clone(),
        }
    }
}

pub fn init_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;
    Ok(())
}

pub fn load_config(args: &CommonArgs) -> Result<AppConfig> {
    let file_config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };

    let cli_config: CliConfig = args.into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  engine: {:?}", app_config.engine);
    info!("  endpoint: {:?}", app_config.endpoint);
    info!("  log_data: {}", app_config.sources.log_data);
    info!("  song_data: {}", app_config.sources.song_data);
    Ok(app_config)
}

/// Runs `job` and prints the summary, or the failure and its causes.
pub fn run_job(config: &AppConfig, job: Job) -> Result<RunReport> {
    let result = Orchestrator::from_config(config)
        .and_then(|orchestrator| orchestrator.run(job))
        .with_context(|| format!("{} job failed", job));

    match result {
        Ok(report) => {
            cli_style::print_run_summary(&report);
            Ok(report)
        }
        Err(e) => {
            cli_style::print_error(&e.to_string());
            for cause in e.chain().skip(1) {
                cli_style::print_hint(&cause.to_string());
            }
            Err(e)
        }
    }
}

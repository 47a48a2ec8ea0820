use anyhow::Result;
use clap::Parser;
use sparkify_dwh::cli::{self, CommonArgs};
use sparkify_dwh::cli_style::get_styles;
use sparkify_dwh::Job;

/// Drops and recreates the staging and star schema tables.
#[derive(Parser, Debug)]
#[command(name = "create-tables", styles = get_styles(), version = env!("BUILD_VERSION"))]
struct CliArgs {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    cli::init_logging()?;

    let config = cli::load_config(&cli_args.common)?;
    cli::run_job(&config, Job::CreateTables)?;
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use sparkify_dwh::cli::{self, CommonArgs};
use sparkify_dwh::cli_style::get_styles;
use sparkify_dwh::Job;

/// Loads the raw song and event data into staging and fills the star schema.
#[derive(Parser, Debug)]
#[command(styles = get_styles(), version = env!("BUILD_VERSION"))]
struct CliArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Drop and recreate every table before loading.
    #[clap(long)]
    reset: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    cli::init_logging()?;

    let config = cli::load_config(&cli_args.common)?;
    let job = if cli_args.reset { Job::Full } else { Job::Etl };
    cli::run_job(&config, job)?;
    Ok(())
}

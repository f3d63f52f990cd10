mod cli;
mod config;

use anyhow::Result;
use clap::Parser; // needed for Cli::parse()
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use cli::commands::run_cli;
use cli::opts::Cli;
use config::Config;

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_env("STUDYFLOW_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    let config = Config::load(args.config.as_deref())?;
    init_tracing(&config.log_filter);

    let rt = Runtime::new()?;
    rt.block_on(run_cli(args, config))
}

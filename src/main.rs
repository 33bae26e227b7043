use clap::Parser;
use tinyroute::cli::{run_cli, Cli};
use tinyroute::logging::init_logging_with_config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&cli.log_config())?;
    run_cli(cli)
}

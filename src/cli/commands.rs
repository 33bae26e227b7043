use crate::demo::demo_app;
use crate::logging::LogConfig;
use crate::runtime_config::RuntimeConfig;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "tinyroute")]
#[command(about = "Serve or inspect the tinyroute demo application", version)]
pub struct Cli {
    /// Debug-level pretty logs with source locations, ignoring TINYROUTE_LOG_*
    #[arg(long, global = true, default_value_t = false)]
    pub dev_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the demo routes until SIGINT or SIGTERM
    Serve {
        /// Address to bind
        #[arg(long, env = "TINYROUTE_ADDR", default_value = "127.0.0.1:8080")]
        addr: String,

        /// Send handler error messages to clients instead of a generic message
        #[arg(long, default_value_t = false)]
        expose_errors: bool,
    },
    /// Print the demo routing table and exit
    Routes,
}

impl Cli {
    /// Logging settings for this invocation.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        if self.dev_logs {
            LogConfig::default_dev()
        } else {
            LogConfig::from_env()
        }
    }
}

/// Run a parsed command line.
///
/// # Errors
///
/// Returns an error if the routing table cannot be built, the address cannot
/// be bound, or signal handlers cannot be installed.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            expose_errors,
        } => serve(&addr, expose_errors),
        Commands::Routes => {
            demo_app(RuntimeConfig::from_env())?.router().dump_routes();
            Ok(())
        }
    }
}

fn serve(addr: &str, expose_errors: bool) -> anyhow::Result<()> {
    let mut config = RuntimeConfig::from_env();
    config.expose_handler_errors |= expose_errors;

    let app = demo_app(config)?;
    let handle = app
        .serve(addr)
        .with_context(|| format!("failed to bind {addr}"))?;

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals =
            Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
        if let Some(signal) = signals.forever().next() {
            info!(signal, "Shutdown signal received");
        }
        handle.stop();
        info!("Server stopped");
    }

    #[cfg(not(unix))]
    {
        if handle.join().is_err() {
            anyhow::bail!("server coroutine panicked");
        }
    }

    Ok(())
}

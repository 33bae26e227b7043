//! Command-line entry point for the demo application.
//!
//! ```bash
//! tinyroute serve --addr 127.0.0.1:8080
//! tinyroute routes
//! tinyroute --dev-logs serve
//! ```

mod commands;


pub use commands::{run_cli, Cli, Commands};

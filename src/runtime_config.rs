//! # Runtime Configuration
//!
//! Environment-driven settings for the coroutine runtime and the dispatch core.
//!
//! ## Environment Variables
//!
//! ### `TINYROUTE_STACK_SIZE`
//!
//! Stack size for `may` coroutines serving requests. Accepts decimal (`32768`)
//! or hexadecimal (`0x8000`). Default: `0x8000` (32 KB).
//!
//! ### `TINYROUTE_MAX_BODY_BYTES`
//!
//! Largest `Content-Length` the body decoder accepts. Default: 10 MiB.
//!
//! ### `TINYROUTE_EXPOSE_HANDLER_ERRORS`
//!
//! When `true`, error and panic messages raised by handlers are sent to the
//! client verbatim. When `false` (default) the client receives
//! `internal error (request <id>)` and the message is only logged.
//!
//! ```bash
//! export TINYROUTE_STACK_SIZE=0x10000
//! export TINYROUTE_MAX_BODY_BYTES=1048576
//! tinyroute serve --addr 0.0.0.0:8080
//! ```

use std::env;

pub const DEFAULT_STACK_SIZE: usize = 0x8000;
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Runtime configuration, usually loaded once at startup with
/// [`RuntimeConfig::from_env()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
    /// Send handler error messages to clients instead of a redacted message
    pub expose_handler_errors: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            expose_handler_errors: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let stack_size = lookup("TINYROUTE_STACK_SIZE")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        let max_body_bytes = lookup("TINYROUTE_MAX_BODY_BYTES")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);
        let expose_handler_errors = lookup("TINYROUTE_EXPOSE_HANDLER_ERRORS")
            .and_then(|val| parse_flag(&val))
            .unwrap_or(false);
        RuntimeConfig {
            stack_size,
            max_body_bytes,
            expose_handler_errors,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

//! Tracing initialization for MCP servers.
//!
//! This module provides utilities for initializing the tracing subscriber
//! with environment-based filtering via the `RUST_LOG` environment variable.
//!
//! Logs are always written to stderr: with the stdio transport, stdout carries
//! the MCP protocol stream and must not receive anything else.
//!
//! # Usage
//!
//! ```no_run
//! use adk_rust_mcp_common::tracing::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     tracing::info!("Application started");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls the log level and filtering. Examples:
//!   - `RUST_LOG=debug` - Enable debug logging for all modules
//!   - `RUST_LOG=adk_rust_mcp_heygen=debug` - Enable debug for specific crate
//!   - `RUST_LOG=warn,adk_rust_mcp_common=debug` - Warn by default, debug for common

use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Default filter directive used when `RUST_LOG` is not set.
pub const DEFAULT_LEVEL: &str = "info";

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn fmt_layer() -> impl Layer<Registry> + Send + Sync {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// # Panics
///
/// This function will panic if called more than once, as the global
/// subscriber can only be set once.
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_LEVEL);
}

/// Initialize tracing with a custom default level.
///
/// Similar to `init_tracing()`, but allows specifying a default log level
/// when `RUST_LOG` is not set.
///
/// ```no_run
/// use adk_rust_mcp_common::tracing::init_tracing_with_default;
///
/// init_tracing_with_default("debug");
/// ```
pub fn init_tracing_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(fmt_layer())
        .with(env_filter(default_level))
        .init();
}

/// Try to initialize tracing, returning an error if already initialized.
///
/// Unlike `init_tracing()`, this function does not panic if the subscriber
/// is already set, which makes it safe to call from tests.
pub fn try_init_tracing() -> Result<(), ()> {
    tracing_subscriber::registry()
        .with(fmt_layer())
        .with(env_filter(DEFAULT_LEVEL))
        .try_init()
        .map_err(|_| ())
}

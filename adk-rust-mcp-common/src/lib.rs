//! ADK Rust MCP Common Library
//!
//! Shared plumbing for the MCP servers in this workspace: the unified error
//! hierarchy, transport selection, the server builder with graceful shutdown,
//! and tracing initialization.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod server;
pub mod tracing;
pub mod transport;

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod transport_test;

pub use error::{ConfigError, Error, Result};
pub use server::{McpServerBuilder, ServerError, shutdown_channel};
pub use transport::{Transport, TransportArgs, TransportMode};

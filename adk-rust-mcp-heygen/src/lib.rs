//! ADK Rust MCP HeyGen Server Library
//!
//! This library exposes the HeyGen avatar video API as MCP tools: account
//! credits, voice and avatar catalogs, and the create → status → wait →
//! download video lifecycle.

pub mod client;
pub mod config;
pub mod handler;
pub mod models;
pub mod resources;
pub mod server;


pub use client::{HeyGenApi, HeyGenClient};
pub use config::Config;
pub use handler::{CreateVideoParams, DownloadParams, VideoHandler, WaitParams};
pub use models::{ToolResponse, VideoStatus};
pub use server::HeyGenServer;

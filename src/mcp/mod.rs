//! MCP (Model Context Protocol) implementation
//!
//! This module contains the MCP server that exposes the analysis core as
//! tools, and the HTTP transport. The stdio transport lives in `main.rs`.

pub mod errors;
pub mod http;
pub mod server;
pub mod tools;
pub mod types;

pub use errors::{McpError, McpErrorCode};
pub use http::{configure, start_http_server};
pub use server::McpServer;
pub use tools::tool_definitions;
pub use types::*;

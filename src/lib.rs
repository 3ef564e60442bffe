//! OpenAPI Explorer - structured questions over OpenAPI and Swagger documents
//!
//! This crate loads an OpenAPI 3.x or Swagger 2.0 document, normalizes it into
//! one typed model and answers queries about it: endpoint search, schema
//! dependency tracing, unused-schema detection, property search, example
//! validation, mock data, security patterns and code examples. The analysis
//! core is exposed to MCP clients over stdio or HTTP.

pub mod analysis;
pub mod config;
pub mod error;
pub mod mcp;
pub mod session;
pub mod spec;
pub mod startup;

pub use config::Config;
pub use error::{ExplorerError, Result};
pub use session::{LoadedSpec, SpecSession};
pub use spec::{load_document, SpecDocument};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

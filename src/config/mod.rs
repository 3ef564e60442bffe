//! Configuration module for the OpenAPI Explorer
//!
//! This module provides configuration management and loading utilities.

mod config;
mod environment;

// Re-export the main configuration types
pub use config::{AnalysisConfig, Config, FetchConfig, LoggingConfig, ServerConfig};
pub use environment::EnvVars;

//! Error handling module for the OpenAPI Explorer
//!
//! This module provides the crate-wide error type and result alias.

mod error;

// Re-export the main error types
pub use error::{ExplorerError, Result};

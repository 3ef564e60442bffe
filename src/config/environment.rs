//! Environment variable integration for explorer configuration

use crate::error::{ExplorerError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Environment variable names read by the explorer
pub struct EnvVars;

impl EnvVars {
    pub const HOST: &'static str = "EXPLORER_HOST";
    pub const PORT: &'static str = "EXPLORER_PORT";
    pub const LOG_LEVEL: &'static str = "EXPLORER_LOG_LEVEL";
    pub const DEFAULT_DEPTH: &'static str = "EXPLORER_DEFAULT_DEPTH";
    pub const FETCH_TIMEOUT: &'static str = "EXPLORER_FETCH_TIMEOUT";
    pub const CONFIG_PATH: &'static str = "EXPLORER_CONFIG_PATH";

    /// Non-empty value of a variable
    pub fn get(name: &str) -> Option<String> {
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => {
                debug!("Environment override: {}={}", name, value);
                Some(value)
            }
            _ => None,
        }
    }

    /// Parse a variable, failing with a configuration error on bad input
    pub fn parse<T>(name: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match Self::get(name) {
            Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|e| {
                ExplorerError::config(format!("Invalid {} environment variable: {}", name, e))
            }),
            None => Ok(None),
        }
    }
}

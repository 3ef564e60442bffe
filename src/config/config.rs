//! Configuration management for the OpenAPI Explorer

use crate::config::environment::EnvVars;
use crate::error::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Explorer configuration; every section may be omitted from the file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub analysis: AnalysisConfig,
    pub fetch: FetchConfig,
    pub logging: LoggingConfig,
}

/// Bind address of the HTTP transport (unused in stdio mode)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Analysis defaults applied when a request leaves an option unset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Depth budget for dependency traversal
    pub default_depth: usize,
    /// Upper bound on the number of mock values per request
    pub max_mock_count: usize,
    /// Chance that an optional property appears in a generated object
    pub optional_property_probability: f64,
    /// Reject undeclared properties when validating examples
    pub strict_validation: bool,
}

/// Source fetching configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with URL fetches
    pub user_agent: String,
}

/// Log output; `RUST_LOG` takes precedence over `level` when set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `openapi_explorer=debug`
    pub level: String,
    /// `text` or `json`
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_depth: crate::spec::DEFAULT_MAX_DEPTH,
            max_mock_count: 10,
            optional_property_probability: 0.7,
            strict_validation: false,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load .env files: `.env` then `.env.local`, later files winning
    fn load_env_files() {
        for env_file in [".env", ".env.local"] {
            match dotenvy::from_filename_override(env_file) {
                Ok(_) => tracing::info!("Loaded environment variables from {}", env_file),
                Err(e) if e.not_found() => tracing::debug!("No {} file found, skipping", env_file),
                Err(e) => tracing::warn!("Failed to load {}: {}", env_file, e),
            }
        }
    }

    /// Parse a YAML configuration document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ExplorerError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Read a configuration file without applying overrides
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ExplorerError::config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from file with environment variables and CLI overrides
    pub fn load<P: AsRef<Path>>(
        path: P,
        host_override: Option<String>,
        port_override: Option<u16>,
    ) -> Result<Self> {
        Self::load_env_files();

        let mut config = if path.as_ref().exists() {
            Self::from_file(&path)?
        } else {
            tracing::warn!(
                "Config file {} not found, using defaults",
                path.as_ref().display()
            );
            Self::default()
        };

        // Precedence: file < env < CLI
        config.apply_environment_overrides()?;

        if let Some(host) = host_override {
            config.server.host = host;
        }
        if let Some(port) = port_override {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Some(host) = EnvVars::get(EnvVars::HOST) {
            self.server.host = host;
        }
        if let Some(port) = EnvVars::parse::<u16>(EnvVars::PORT)? {
            self.server.port = port;
        }
        if let Some(level) = EnvVars::get(EnvVars::LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Some(depth) = EnvVars::parse::<usize>(EnvVars::DEFAULT_DEPTH)? {
            self.analysis.default_depth = depth;
        }
        if let Some(timeout) = EnvVars::parse::<u64>(EnvVars::FETCH_TIMEOUT)? {
            self.fetch.timeout_secs = timeout;
        }
        Ok(())
    }

    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.server.validate()?;
        self.analysis.validate()?;

        if self.fetch.timeout_secs == 0 {
            return Err(ExplorerError::config("Fetch timeout cannot be 0"));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(ExplorerError::config(format!(
                "Invalid log format '{}'. Expected 'text' or 'json'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ExplorerError::config("server.port cannot be 0"));
        }
        url::Host::parse(self.host.trim())
            .map(|_| ())
            .map_err(|e| ExplorerError::config(format!("server.host '{}' is not a valid host: {}", self.host, e)))
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_depth == 0 {
            return Err(ExplorerError::config("analysis.default_depth must be at least 1"));
        }
        if self.max_mock_count == 0 {
            return Err(ExplorerError::config("analysis.max_mock_count must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.optional_property_probability) {
            return Err(ExplorerError::config(format!(
                "analysis.optional_property_probability must be within [0, 1], got {}",
                self.optional_property_probability
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analysis.default_depth, 5);
        assert_eq!(config.analysis.max_mock_count, 10);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.fetch.user_agent.starts_with("openapi-explorer/"));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml_str("server:\n  port: 8080\nanalysis:\n  strict_validation: true\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.analysis.strict_validation);
        assert_eq!(config.analysis.optional_property_probability, 0.7);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.analysis.default_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.optional_property_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.max_mock_count = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert_eq!(config.validate().unwrap_err().category(), "config");
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let err = Config::from_yaml_str("server: [unclosed").unwrap_err();
        assert_eq!(err.category(), "config");
    }
}

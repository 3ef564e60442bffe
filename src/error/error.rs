//! Error types and handling for the OpenAPI Explorer

use thiserror::Error;

/// Result type alias for explorer operations
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Main error type for the OpenAPI Explorer
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Source text is neither valid JSON nor valid YAML
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Parsed content is not a recognisable OpenAPI/Swagger document
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A query was issued before any document was loaded
    #[error("No specification loaded. Load one with load_openapi_spec first")]
    NotLoaded,

    /// A referenced endpoint or schema does not exist
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// An enum-valued argument outside its closed set
    #[error("Unsupported {option} '{value}' (expected one of: {expected})")]
    UnsupportedOption {
        option: String,
        value: String,
        expected: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Failure fetching spec text from a URL or file
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ExplorerError {
    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for an entity of the given kind
    pub fn not_found<K: Into<String>, N: Into<String>>(kind: K, name: N) -> Self {
        Self::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an unsupported-option error listing the accepted values
    pub fn unsupported_option<O, V>(option: O, value: V, expected: &[&str]) -> Self
    where
        O: Into<String>,
        V: Into<String>,
    {
        Self::UnsupportedOption {
            option: option.into(),
            value: value.into(),
            expected: expected.join(", "),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch<S: Into<String>>(message: S) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input rather than the host
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ExplorerError::Parse { .. }
                | ExplorerError::Validation { .. }
                | ExplorerError::NotLoaded
                | ExplorerError::NotFound { .. }
                | ExplorerError::UnsupportedOption { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ExplorerError::Parse { .. } => "parse",
            ExplorerError::Validation { .. } => "validation",
            ExplorerError::NotLoaded => "not_loaded",
            ExplorerError::NotFound { .. } => "not_found",
            ExplorerError::UnsupportedOption { .. } => "unsupported_option",
            ExplorerError::Config { .. } => "config",
            ExplorerError::Fetch { .. } => "fetch",
            ExplorerError::Io(_) => "io",
            ExplorerError::Serde(_) => "serialization",
            ExplorerError::Yaml(_) => "yaml",
            ExplorerError::Http(_) => "http",
            ExplorerError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ExplorerError::not_found("Schema", "Pet");
        assert_eq!(err.to_string(), "Schema not found: Pet");
        assert_eq!(err.category(), "not_found");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unsupported_option_lists_expected_values() {
        let err = ExplorerError::unsupported_option("language", "rust", &["curl", "python"]);
        assert_eq!(
            err.to_string(),
            "Unsupported language 'rust' (expected one of: curl, python)"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ExplorerError = io_err.into();
        assert!(matches!(err, ExplorerError::Io(_)));
        assert!(!err.is_client_error());
    }
}

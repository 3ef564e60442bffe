//! JSON-RPC error objects
//!
//! Protocol-level failures (malformed messages, unknown methods or tools,
//! arguments of the wrong shape) and the code each [`ExplorerError`] maps to
//! when it has to travel as a JSON-RPC error.

use crate::error::ExplorerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Error codes: the reserved JSON-RPC range plus explorer-specific codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ToolNotFound,
    /// The document could not be parsed or is not OpenAPI/Swagger
    InvalidDocument,
    /// A query arrived before any document was loaded
    SpecNotLoaded,
    /// A named endpoint or schema is absent from the loaded document
    NotFound,
    /// The document source could not be read or fetched
    SourceUnavailable,
    ConfigurationError,
}

impl McpErrorCode {
    pub fn code(self) -> i32 {
        match self {
            McpErrorCode::ParseError => -32700,
            McpErrorCode::InvalidRequest => -32600,
            McpErrorCode::MethodNotFound => -32601,
            McpErrorCode::InvalidParams => -32602,
            McpErrorCode::InternalError => -32603,
            McpErrorCode::ToolNotFound => -32000,
            McpErrorCode::InvalidDocument => -32001,
            McpErrorCode::SpecNotLoaded => -32002,
            McpErrorCode::NotFound => -32003,
            McpErrorCode::SourceUnavailable => -32004,
            McpErrorCode::ConfigurationError => -32005,
        }
    }
}

impl fmt::Display for McpErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            McpErrorCode::ParseError => "parse error",
            McpErrorCode::InvalidRequest => "invalid request",
            McpErrorCode::MethodNotFound => "method not found",
            McpErrorCode::InvalidParams => "invalid params",
            McpErrorCode::InternalError => "internal error",
            McpErrorCode::ToolNotFound => "tool not found",
            McpErrorCode::InvalidDocument => "invalid document",
            McpErrorCode::SpecNotLoaded => "specification not loaded",
            McpErrorCode::NotFound => "not found",
            McpErrorCode::SourceUnavailable => "source unavailable",
            McpErrorCode::ConfigurationError => "configuration error",
        };
        write!(f, "{} ({})", label, self.code())
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl McpError {
    pub fn new(code: McpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: McpErrorCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::new(code, message)
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::ParseError, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidRequest, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(McpErrorCode::InvalidParams, message)
    }

    pub fn method_not_found(method: impl Into<String>) -> Self {
        let method = method.into();
        let message = format!("Unknown method '{}'", method);
        Self::with_data(McpErrorCode::MethodNotFound, message, json!({ "method": method }))
    }

    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        let tool = tool.into();
        let message = format!("No tool named '{}'; call tools/list for the catalogue", tool);
        Self::with_data(McpErrorCode::ToolNotFound, message, json!({ "tool": tool }))
    }
}

impl From<ExplorerError> for McpError {
    fn from(error: ExplorerError) -> Self {
        let code = match &error {
            ExplorerError::Parse { .. } | ExplorerError::Validation { .. } => McpErrorCode::InvalidDocument,
            ExplorerError::NotLoaded => McpErrorCode::SpecNotLoaded,
            ExplorerError::NotFound { .. } => McpErrorCode::NotFound,
            ExplorerError::UnsupportedOption { .. } => McpErrorCode::InvalidParams,
            ExplorerError::Config { .. } => McpErrorCode::ConfigurationError,
            ExplorerError::Fetch { .. } | ExplorerError::Http(_) | ExplorerError::Io(_) => {
                McpErrorCode::SourceUnavailable
            }
            ExplorerError::Serde(_) | ExplorerError::Yaml(_) | ExplorerError::Internal(_) => {
                McpErrorCode::InternalError
            }
        };
        McpError::with_data(code, error.to_string(), json!({ "category": error.category() }))
    }
}

//! Error types for the sitedex MCP server with JSON-RPC error code mapping

use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use thiserror::Error;

/// Errors that can occur in the MCP server
#[derive(Debug, Error)]
pub enum McpError {
    /// Index, page load, or cache failure from the core crate
    #[error("{0}")]
    Core(#[from] sitedex_core::Error),

    /// JSON serialization/deserialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport or protocol failure
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),

    /// Invalid tool arguments
    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    /// Tool name not served by this process
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// URI is neither published nor addressable through the template
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Resource methods called while resources are off
    #[error("resources are disabled on this server")]
    ResourcesDisabled,
}

impl McpError {
    /// Map error to JSON-RPC error code
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Core(_) | Self::Internal(_) => -32603,
            Self::Json(_) => -32700,
            Self::Protocol(_) => -32600,
            Self::InvalidParams(_) | Self::UnknownTool(_) => -32602,
            Self::ResourceNotFound(_) => -32002,
            Self::ResourcesDisabled => -32601,
        }
    }

    /// Category used as the `category` field on error log events
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Core(e) => e.category(),
            Self::Json(_) => "json",
            Self::Protocol(_) => "protocol",
            Self::Internal(_) => "internal",
            Self::InvalidParams(_) | Self::UnknownTool(_) => "invalid_params",
            Self::ResourceNotFound(_) => "not_found",
            Self::ResourcesDisabled => "resources_disabled",
        }
    }
}

impl From<McpError> for ErrorData {
    fn from(err: McpError) -> Self {
        Self::new(ErrorCode(err.error_code()), err.to_string(), None)
    }
}

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;

//! Error types for mcp-agent

use thiserror::Error;

/// Result type alias using mcp-agent's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for mcp-agent
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool arguments did not match the tool's parameter schema
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    /// Remote tool reported a failure
    #[error("Tool '{tool}' returned an error: {message}")]
    ToolInvocation { tool: String, message: String },

    /// Tool returned content this call site cannot forward
    #[error("Tool '{tool}': non-text content is not supported at this call site (got {kind})")]
    UnsupportedContent { tool: String, kind: String },

    /// Tool is not registered
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Upstream model is temporarily overloaded
    #[error("Model overloaded: {0}")]
    Overloaded(String),

    /// Model provider API error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Unauthorized access
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Tool server connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Tool server protocol error
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if error is retryable by the model transport
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Overloaded(_))
    }

    /// Check if the model should be asked to correct its tool call
    /// instead of aborting the turn
    pub fn is_recoverable_tool_error(&self) -> bool {
        matches!(self, Error::InvalidArguments { .. } | Error::UnknownTool(_))
    }
}

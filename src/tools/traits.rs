//! Core tool trait and result types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::agent::types::{FunctionDefinition, ToolDefinition};
use crate::error::Result;
use crate::schema::ToolSignature;

/// Invocation context passed to every tool as its first parameter
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Directory the session operates in
    pub working_directory: PathBuf,
}

impl ToolContext {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        ToolContext {
            working_directory: working_directory.into(),
        }
    }
}

/// A tool that can be called by the LLM
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> &str;

    /// Get the JSON Schema for tool parameters
    fn parameters_schema(&self) -> Value;

    /// Get the typed parameter list the arguments are validated against
    fn signature(&self) -> &ToolSignature;

    /// Execute the tool with given arguments
    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<ToolResult>;

    /// Convert to a chat-completions tool definition
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

/// Result of a tool execution, as handed back to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the execution was successful
    pub success: bool,
    /// Result content (for successful execution)
    pub content: Option<String>,
    /// Error message (for failed execution)
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        ToolResult {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }

    /// Text sent to the model as the tool message
    pub fn for_model(&self) -> String {
        if self.success {
            self.content.clone().unwrap_or_default()
        } else {
            format!("Error: {}", self.error.clone().unwrap_or_default())
        }
    }
}

/// A tool call request from the LLM
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool call ID
    pub id: String,
    /// Tool name
    pub name: String,
    /// Tool arguments as JSON
    pub arguments: Value,
}

impl ToolCall {
    /// Build a call from the raw argument string a model produced.
    ///
    /// Empty strings become an empty object; anything unparsable is kept
    /// as a JSON string so binding reports it instead of silently dropping it.
    pub fn from_raw(id: impl Into<String>, name: impl Into<String>, raw_arguments: &str) -> Self {
        let trimmed = raw_arguments.trim();
        let arguments = if trimmed.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
        };
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

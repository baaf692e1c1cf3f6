//! Structured agent response
//!
//! The model ends a turn by calling the `final_result` function with a
//! [`FinalResponse`]. Plain text replies are accepted too and never end
//! the conversation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{FunctionDefinition, ToolDefinition};
use crate::error::{Error, Result};

/// Name of the function the model calls to answer
pub const FINAL_RESULT_TOOL: &str = "final_result";

/// The agent's answer for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FinalResponse {
    /// Reply shown to the user
    pub message: String,
    /// Always set to true unless you are asking a question.
    pub end_conversation: bool,
}

impl FinalResponse {
    /// A reply that keeps the conversation open
    pub fn message(message: impl Into<String>) -> Self {
        FinalResponse {
            message: message.into(),
            end_conversation: false,
        }
    }

    /// Parse the raw arguments of a `final_result` call
    pub fn from_arguments(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::InvalidArguments {
            tool: FINAL_RESULT_TOOL.to_string(),
            message: e.to_string(),
        })
    }

    /// Function definition advertised to the model
    pub fn tool_definition() -> ToolDefinition {
        let mut parameters = serde_json::to_value(schemars::schema_for!(FinalResponse))
            .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        if let Value::Object(ref mut schema) = parameters {
            schema.remove("$schema");
            schema.remove("title");
        }

        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: FINAL_RESULT_TOOL.to_string(),
                description: "The final response which ends this turn".to_string(),
                parameters,
            },
        }
    }
}

//! Tool server contract

use async_trait::async_trait;
use serde_json::Value;

use super::protocol::{McpTool, McpToolResult};
use crate::error::Result;

/// A remote provider of named tools.
///
/// `list_tools` is called once per session; `call_tool` performs exactly
/// one request/response exchange per call.
#[async_trait]
pub trait ToolServer: Send + Sync {
    /// Fetch all tool descriptors
    async fn list_tools(&self) -> Result<Vec<McpTool>>;

    /// Invoke a tool with an argument object
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult>;
}

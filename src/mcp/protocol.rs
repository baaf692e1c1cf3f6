//! MCP wire protocol types
//!
//! Based on the Model Context Protocol specification (JSON-RPC 2.0).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision sent during initialization
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request to an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpRequest {
    /// Create a new MCP request
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Create an initialize request
    pub fn initialize(id: u64) -> Self {
        Self::new(id, "initialize", Some(serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": crate::NAME,
                "version": crate::VERSION
            }
        })))
    }

    /// Create a tools/list request, optionally continuing from a cursor
    pub fn list_tools(id: u64, cursor: Option<&str>) -> Self {
        let params = cursor.map(|c| serde_json::json!({ "cursor": c }));
        Self::new(id, "tools/list", params)
    }

    /// Create a tools/call request
    pub fn call_tool(id: u64, name: impl Into<String>, arguments: Value) -> Self {
        Self::new(id, "tools/call", Some(serde_json::json!({
            "name": name.into(),
            "arguments": arguments
        })))
    }
}

/// JSON-RPC notification (no id, no response)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl McpNotification {
    /// Sent once the initialize handshake has completed
    pub fn initialized() -> Self {
        McpNotification {
            jsonrpc: "2.0".to_string(),
            method: "notifications/initialized".to_string(),
            params: None,
        }
    }
}

/// JSON-RPC response from an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

/// MCP error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tool descriptor from an MCP server.
///
/// The input schema is kept as raw JSON; the schema adapter decides how
/// much of it it understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name, unique per session
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// Input schema (JSON Schema)
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Result of a tools/list request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<McpTool>,
    #[serde(rename = "nextCursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Content block returned by a tool call.
///
/// Only text blocks are interpreted; every other block type is carried
/// through untouched as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ContentBlock {
    Text(String),
    Other(Value),
}

impl ContentBlock {
    /// The block's `type` tag
    pub fn kind(&self) -> String {
        match self {
            ContentBlock::Text(_) => "text".to_string(),
            ContentBlock::Other(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            ContentBlock::Other(_) => None,
        }
    }
}

impl From<Value> for ContentBlock {
    fn from(value: Value) -> Self {
        let is_text = value.get("type").and_then(Value::as_str) == Some("text");
        match value.get("text").and_then(Value::as_str) {
            Some(text) if is_text => ContentBlock::Text(text.to_string()),
            _ => ContentBlock::Other(value),
        }
    }
}

impl From<ContentBlock> for Value {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => serde_json::json!({ "type": "text", "text": text }),
            ContentBlock::Other(value) => value,
        }
    }
}

/// Result of a tools/call response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl McpToolResult {
    /// A successful result with a single text block
    pub fn text(text: impl Into<String>) -> Self {
        McpToolResult {
            content: vec![ContentBlock::Text(text.into())],
            is_error: false,
        }
    }

    /// An error-flagged result with a single text block
    pub fn error(text: impl Into<String>) -> Self {
        McpToolResult {
            content: vec![ContentBlock::Text(text.into())],
            is_error: true,
        }
    }

    /// All text blocks joined by newlines
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_tool_result_with_mixed_blocks() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "hello"},
                {"type": "image", "data": "AAAA", "mimeType": "image/png"}
            ],
            "isError": false
        });
        let result: McpToolResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.content[0], ContentBlock::Text("hello".into()));
        assert_eq!(result.content[1].kind(), "image");
        assert_eq!(result.joined_text(), "hello");
    }

    #[test]
    fn test_opaque_blocks_serialize_unchanged() {
        let image = json!({"type": "image", "data": "AAAA", "mimeType": "image/png"});
        let block = ContentBlock::from(image.clone());
        assert_eq!(serde_json::to_value(&block).unwrap(), image);
    }

    #[test]
    fn test_tool_descriptor_defaults() {
        let tool: McpTool = serde_json::from_value(json!({"name": "list_allowed_directories"})).unwrap();
        assert_eq!(tool.description, "");
        assert!(tool.input_schema.is_null());
    }

    #[test]
    fn test_list_tools_cursor() {
        let first = McpRequest::list_tools(1, None);
        assert!(first.params.is_none());
        let next = McpRequest::list_tools(2, Some("abc"));
        assert_eq!(next.params, Some(json!({"cursor": "abc"})));
    }
}

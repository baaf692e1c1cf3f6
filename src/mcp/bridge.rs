//! MCP-to-Tool bridge
//!
//! Adapts MCP server tools into the `Tool` trait so they can be
//! registered in the `ToolRegistry`. Each bridge carries the typed
//! signature derived from the tool's input schema; arguments are bound
//! against it before anything is sent to the server.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::protocol::McpTool;
use crate::error::{Error, Result};
use crate::schema::{SchemaAdapter, ToolSignature};
use crate::tools::{Tool, ToolContext, ToolInvoker, ToolResult};

/// Bridge that wraps an MCP tool as a `Tool`
pub struct McpToolBridge {
    /// The MCP tool definition
    tool: McpTool,
    /// Parameters derived from the input schema
    signature: ToolSignature,
    /// Shared call path to the server
    invoker: Arc<ToolInvoker>,
}

impl McpToolBridge {
    /// Create a new bridge for a specific MCP tool
    pub fn new(tool: McpTool, adapter: &SchemaAdapter, invoker: Arc<ToolInvoker>) -> Self {
        let signature = adapter.adapt(&tool.name, &tool.input_schema);
        McpToolBridge {
            tool,
            signature,
            invoker,
        }
    }

    /// Create bridges for all tools the invoker's server offers
    pub async fn from_server(invoker: Arc<ToolInvoker>, adapter: &SchemaAdapter) -> Result<Vec<Self>> {
        let tools = invoker.server().list_tools().await?;
        debug!("Bridging {} MCP tools", tools.len());
        Ok(tools
            .into_iter()
            .map(|tool| McpToolBridge::new(tool, adapter, Arc::clone(&invoker)))
            .collect())
    }
}

#[async_trait]
impl Tool for McpToolBridge {
    fn name(&self) -> &str {
        &self.tool.name
    }

    fn description(&self) -> &str {
        &self.tool.description
    }

    fn parameters_schema(&self) -> Value {
        match &self.tool.input_schema {
            Value::Object(schema) => {
                let mut schema = schema.clone();
                schema.entry("type").or_insert_with(|| json!("object"));
                schema.entry("properties").or_insert_with(|| json!({}));
                Value::Object(schema)
            }
            _ => json!({ "type": "object", "properties": {} }),
        }
    }

    fn signature(&self) -> &ToolSignature {
        &self.signature
    }

    async fn execute(&self, ctx: &ToolContext, args: Value) -> Result<ToolResult> {
        let bound = self.signature.bind(&args).map_err(|e| Error::InvalidArguments {
            tool: self.tool.name.clone(),
            message: e.to_string(),
        })?;
        self.invoker
            .invoke(ctx, &self.tool.name, bound.to_json_map())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::{McpToolResult, ToolServer};
    use crate::tools::InvokerPolicy;
    use std::sync::Mutex;

    struct FakeServer {
        tools: Vec<McpTool>,
        calls: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl ToolServer for FakeServer {
        async fn list_tools(&self) -> Result<Vec<McpTool>> {
            Ok(self.tools.clone())
        }

        async fn call_tool(&self, _name: &str, arguments: Value) -> Result<McpToolResult> {
            self.calls.lock().unwrap().push(arguments);
            Ok(McpToolResult::text("contents"))
        }
    }

    fn read_file_tool() -> McpTool {
        McpTool {
            name: "read_file".into(),
            description: "Read a file".into(),
            input_schema: json!({
                "type": "object",
                "properties": {"path": {"type": "string"}, "head": {"type": "integer"}},
                "required": ["path"],
                "additionalProperties": false
            }),
        }
    }

    async fn bridges(server: Arc<FakeServer>) -> Vec<McpToolBridge> {
        let invoker = Arc::new(ToolInvoker::new(server, InvokerPolicy::default()));
        McpToolBridge::from_server(invoker, &SchemaAdapter::new()).await.unwrap()
    }

    #[tokio::test]
    async fn test_bridge_binds_and_calls() {
        let server = Arc::new(FakeServer {
            tools: vec![read_file_tool()],
            calls: Mutex::new(Vec::new()),
        });
        let tools = bridges(server.clone()).await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].signature().named().count(), 2);

        let ctx = ToolContext::new("/work");
        let result = tools[0].execute(&ctx, json!({"path": "a.txt"})).await.unwrap();
        assert_eq!(result, ToolResult::success("contents"));
        // Absent optionals are not sent
        assert_eq!(server.calls.lock().unwrap()[0], json!({"path": "a.txt"}));
    }

    #[tokio::test]
    async fn test_invalid_arguments_never_reach_server() {
        let server = Arc::new(FakeServer {
            tools: vec![read_file_tool()],
            calls: Mutex::new(Vec::new()),
        });
        let tools = bridges(server.clone()).await;
        let ctx = ToolContext::new("/work");

        let err = tools[0].execute(&ctx, json!({"head": 3})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { tool, .. } if tool == "read_file"));

        let err = tools[0]
            .execute(&ctx, json!({"path": "a", "bogus": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { .. }));
        assert!(server.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_parameters_schema_for_schemaless_tool() {
        let server = Arc::new(FakeServer {
            tools: vec![McpTool {
                name: "list_allowed_directories".into(),
                description: String::new(),
                input_schema: Value::Null,
            }],
            calls: Mutex::new(Vec::new()),
        });
        let tools = bridges(server).await;
        assert_eq!(
            tools[0].parameters_schema(),
            json!({"type": "object", "properties": {}})
        );
        assert!(tools[0].signature().named().next().is_none());
    }
}

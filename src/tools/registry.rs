//! Tool registry - static dispatch table from tool name to handler

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::types::ToolDefinition;
use crate::error::{Error, Result};

use super::traits::{Tool, ToolCall, ToolContext, ToolResult};

/// Registry of available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ToolRegistry {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. A later tool with the same name replaces the earlier one.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register an already shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions, ordered by name
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        definitions.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        definitions
    }

    /// Execute a tool call
    pub async fn execute(&self, ctx: &ToolContext, call: &ToolCall) -> Result<ToolResult> {
        match self.get(&call.name) {
            Some(tool) => tool.execute(ctx, call.arguments.clone()).await,
            None => Err(Error::UnknownTool(call.name.clone())),
        }
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// List tool names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaAdapter, ToolSignature};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Echo {
        signature: ToolSignature,
    }

    impl Echo {
        fn new() -> Self {
            let schema = json!({"properties": {"text": {"type": "string"}}, "required": ["text"]});
            Echo {
                signature: SchemaAdapter::new().adapt("echo", &schema),
            }
        }
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the text back"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        fn signature(&self) -> &ToolSignature {
            &self.signature
        }

        async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<ToolResult> {
            let bound = self.signature.bind(&args).map_err(|e| Error::InvalidArguments {
                tool: "echo".into(),
                message: e.to_string(),
            })?;
            let text = bound.get("text").and_then(|v| v.as_str()).unwrap_or_default();
            Ok(ToolResult::success(text))
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo::new());
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.names(), vec!["echo"]);
        assert_eq!(registry.definitions()[0].function.name, "echo");

        let ctx = ToolContext::new(".");
        let call = ToolCall::from_raw("1", "echo", r#"{"text":"hi"}"#);
        let result = registry.execute(&ctx, &call).await.unwrap();
        assert_eq!(result, ToolResult::success("hi"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = ToolRegistry::new();
        let call = ToolCall::from_raw("1", "nope", "{}");
        let err = registry.execute(&ToolContext::new("."), &call).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "nope"));
    }
}

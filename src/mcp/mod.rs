//! MCP (Model Context Protocol) module
//!
//! Connects the agent to a tool server speaking the Model Context Protocol
//! over stdio and exposes its tools through the `Tool` trait.
//!
//! ## Architecture
//!
//! - **traits**: `ToolServer`, the two-operation contract the rest of the
//!   crate depends on
//! - **client**: stdio MCP client implementing `ToolServer`
//! - **protocol**: Wire protocol types (JSON-RPC based)
//! - **bridge**: Adapts MCP tools into the `Tool` trait
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcp_agent::mcp::{McpClient, StdioServerParams, ToolServer};
//!
//! # async fn example() -> mcp_agent::Result<()> {
//! let params = StdioServerParams {
//!     command: "npx".into(),
//!     args: vec!["-y".into(), "@modelcontextprotocol/server-filesystem".into(), ".".into()],
//!     ..Default::default()
//! };
//! let client = McpClient::connect_stdio(&params).await?;
//!
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("list_directory", serde_json::json!({"path": "."})).await?;
//! # Ok(())
//! # }
//! ```

mod bridge;
mod client;
mod protocol;
mod traits;

pub use bridge::McpToolBridge;
pub use client::{McpClient, StdioServerParams};
pub use protocol::{
    ContentBlock, ListToolsResult, McpError, McpNotification, McpRequest, McpResponse, McpTool,
    McpToolResult, PROTOCOL_VERSION,
};
pub use traits::ToolServer;

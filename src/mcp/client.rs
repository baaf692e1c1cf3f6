//! MCP client for connecting to MCP servers
//!
//! Supports stdio transport (spawning a subprocess). Messages are
//! newline-delimited JSON-RPC.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::protocol::{
    ListToolsResult, McpNotification, McpRequest, McpResponse, McpTool, McpToolResult,
};
use super::traits::ToolServer;
use crate::error::{Error, Result};

type Reader = Box<dyn AsyncBufRead + Send + Unpin>;
type Writer = Box<dyn AsyncWrite + Send + Unpin>;

/// Both halves of the transport, locked together so a request and its
/// response are never interleaved with another exchange
struct Channel {
    reader: Reader,
    writer: Writer,
}

/// How to launch a stdio MCP server
#[derive(Debug, Clone, Default)]
pub struct StdioServerParams {
    /// Executable name or path
    pub command: String,
    /// Command line arguments
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
    /// Forward the server's stderr to ours
    pub show_stderr: bool,
}

/// MCP client for communicating with an MCP server
pub struct McpClient {
    /// Server process (for stdio transport); killed on drop
    #[allow(dead_code)]
    child: Option<Child>,
    channel: Mutex<Channel>,
    /// Request ID counter
    next_id: AtomicU64,
    /// Server name
    name: String,
}

impl McpClient {
    /// Connect to an MCP server via stdio transport
    ///
    /// Spawns the given command as a subprocess and communicates via stdin/stdout.
    pub async fn connect_stdio(params: &StdioServerParams) -> Result<Self> {
        let program = which::which(&params.command).map_err(|e| {
            Error::Connection(format!(
                "MCP server command '{}' not found: {}",
                params.command, e
            ))
        })?;

        debug!("Connecting to MCP server: {} {:?}", params.command, params.args);

        let mut child = Command::new(program)
            .args(&params.args)
            .envs(&params.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if params.show_stderr { Stdio::inherit() } else { Stdio::null() })
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Connection(format!("Failed to spawn MCP server '{}': {}", params.command, e)))?;

        let stdin = child.stdin.take()
            .ok_or_else(|| Error::Connection("Failed to capture MCP server stdin".to_string()))?;
        let stdout = child.stdout.take()
            .ok_or_else(|| Error::Connection("Failed to capture MCP server stdout".to_string()))?;

        let mut client = Self::from_streams(
            Box::new(BufReader::new(stdout)),
            Box::new(stdin),
            params.command.clone(),
        );
        client.child = Some(child);

        // Initialize the connection
        client.initialize().await?;

        Ok(client)
    }

    /// Build a client over already-connected streams. The caller is
    /// responsible for calling [`McpClient::initialize`].
    pub fn from_streams(reader: Reader, writer: Writer, name: impl Into<String>) -> Self {
        McpClient {
            child: None,
            channel: Mutex::new(Channel { reader, writer }),
            next_id: AtomicU64::new(1),
            name: name.into(),
        }
    }

    /// Perform the initialize handshake
    pub async fn initialize(&self) -> Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::initialize(id)).await?;

        let server = result
            .get("serverInfo")
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!("MCP server {} initialized ({})", self.name, server);

        let mut channel = self.channel.lock().await;
        write_message(&mut channel.writer, &McpNotification::initialized()).await
    }

    /// Send a request and wait for the response with the same id
    async fn send_request(&self, request: McpRequest) -> Result<Value> {
        let id = request.id;
        let mut channel = self.channel.lock().await;

        debug!("MCP request -> {}: {} (id {})", self.name, request.method, id);
        write_message(&mut channel.writer, &request).await?;

        loop {
            let mut line = String::new();
            let read = channel.reader.read_line(&mut line).await
                .map_err(|e| Error::Connection(format!("Failed to read from MCP server: {}", e)))?;
            if read == 0 {
                return Err(Error::Connection(format!("MCP server {} closed the connection", self.name)));
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message: Value = match serde_json::from_str(line) {
                Ok(message) => message,
                Err(_) => {
                    debug!("Skipping non-JSON output from {}: {}", self.name, line);
                    continue;
                }
            };

            // Requests and notifications initiated by the server
            if let Some(method) = message.get("method").and_then(Value::as_str) {
                match message.get("id") {
                    Some(server_id) => {
                        let reply = server_request_reply(server_id, method);
                        write_message(&mut channel.writer, &reply).await?;
                    }
                    None => debug!("MCP notification <- {}: {}", self.name, method),
                }
                continue;
            }

            if message.get("id").and_then(Value::as_u64) != Some(id) {
                warn!("Ignoring MCP response with unexpected id from {}: {}", self.name, line);
                continue;
            }

            debug!("MCP response <- {}: {}", self.name, line);
            let response: McpResponse = serde_json::from_value(message)
                .map_err(|e| Error::Protocol(format!("Failed to parse MCP response: {} (raw: {})", e, line)))?;

            if let Some(err) = response.error {
                return Err(Error::Protocol(format!(
                    "MCP error from {}: {} (code {})",
                    self.name, err.message, err.code
                )));
            }

            return Ok(response.result.unwrap_or(Value::Null));
        }
    }

    /// Get the server name
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ToolServer for McpClient {
    /// List available tools, following pagination cursors
    async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let result = self
                .send_request(McpRequest::list_tools(id, cursor.as_deref()))
                .await?;
            let page: ListToolsResult = serde_json::from_value(result)
                .map_err(|e| Error::Protocol(format!("Failed to parse tools/list result: {}", e)))?;

            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }

        debug!("MCP server {} has {} tools", self.name, tools.len());
        Ok(tools)
    }

    /// Call a tool on the MCP server
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let result = self.send_request(McpRequest::call_tool(id, name, arguments)).await?;

        let tool_result: McpToolResult = serde_json::from_value(result)
            .map_err(|e| Error::Protocol(format!("Failed to parse MCP tool result: {}", e)))?;

        if tool_result.is_error {
            warn!("MCP tool {} returned error", name);
        }

        Ok(tool_result)
    }
}

async fn write_message<T: Serialize>(writer: &mut Writer, message: &T) -> Result<()> {
    let mut json = serde_json::to_string(message)?;
    json.push('\n');
    writer.write_all(json.as_bytes()).await
        .map_err(|e| Error::Connection(format!("Failed to write to MCP server: {}", e)))?;
    writer.flush().await
        .map_err(|e| Error::Connection(format!("Failed to flush MCP server stdin: {}", e)))?;
    Ok(())
}

/// Answer a server-initiated request. Only `ping` is supported.
fn server_request_reply(id: &Value, method: &str) -> Value {
    if method == "ping" {
        serde_json::json!({ "jsonrpc": "2.0", "id": id, "result": {} })
    } else {
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32601, "message": format!("Method not found: {}", method) }
        })
    }
}

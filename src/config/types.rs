//! Configuration types
//!
//! Every section deserializes with defaults, so a config file only needs
//! the keys it wants to change.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::mcp::StdioServerParams;
use crate::tools::ErrorPolicy;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model selection and request behavior
    #[serde(default)]
    pub model: ModelConfig,

    /// MCP server launch settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Tool invocation policy
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from the config file and environment
    pub fn load() -> crate::error::Result<Self> {
        crate::config::load_config()
    }
}

/// Model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model name, bare (`gpt-4o`) or provider-prefixed (`openai:gpt-4o`)
    pub name: Option<String>,
    /// Override for the provider's base URL
    pub base_url: Option<String>,
    /// Total attempts for an overloaded model request
    pub max_attempts: u32,
    /// Fixed wait between overload retries
    pub retry_backoff_ms: u64,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            name: None,
            base_url: None,
            max_attempts: 3,
            retry_backoff_ms: 100,
            timeout_secs: 120,
            temperature: None,
        }
    }
}

/// MCP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Executable to spawn
    pub command: String,
    /// Arguments; the working directory is appended
    pub args: Vec<String>,
    /// Extra environment for the server process
    pub env: HashMap<String, String>,
    /// Forward the server's stderr to the terminal
    pub show_stderr: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@modelcontextprotocol/server-filesystem".to_string(),
            ],
            env: HashMap::new(),
            show_stderr: false,
        }
    }
}

impl ServerConfig {
    /// Launch parameters for a server rooted at `working_directory`
    pub fn stdio_params(&self, working_directory: &Path) -> StdioServerParams {
        let mut args = self.args.clone();
        args.push(working_directory.display().to_string());
        StdioServerParams {
            command: self.command.clone(),
            args,
            env: self.env.clone(),
            show_stderr: self.show_stderr,
        }
    }
}

/// Tool invocation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Tool that receives default exclusion patterns
    pub search_tool: String,
    /// Argument of the search tool holding exclusion patterns
    pub exclude_field: String,
    /// Patterns always excluded from searches
    pub default_excludes: Vec<String>,
    /// Tools returning JSON directory listings to filter
    pub listing_tools: Vec<String>,
    /// Policy for tools not named in `raise_on_error`
    pub error_policy: ErrorPolicy,
    /// Tools whose errors abort the turn
    pub raise_on_error: Vec<String>,
    /// Model round-trips allowed per turn
    pub max_iterations: usize,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            search_tool: "search_files".to_string(),
            exclude_field: "excludePatterns".to_string(),
            default_excludes: vec![".venv".to_string(), ".git".to_string()],
            listing_tools: vec!["directory_tree".to_string()],
            error_policy: ErrorPolicy::Surface,
            raise_on_error: Vec::new(),
            max_iterations: 20,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: Option<String>,
    pub format: LogFormat,
}

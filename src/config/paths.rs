//! Configuration paths
//!
//! Utilities for resolving configuration file paths.

use std::path::PathBuf;

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    // Check for explicit override
    if let Ok(dir) = std::env::var("MCP_AGENT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    // Use XDG config directory or fallback
    dirs::config_dir()
        .map(|d| d.join("mcp-agent"))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".config").join("mcp-agent"))
                .unwrap_or_else(|| PathBuf::from(".mcp-agent"))
        })
}

/// Get the main configuration file path
pub fn config_path() -> PathBuf {
    // Check for explicit override
    if let Ok(path) = std::env::var("MCP_AGENT_CONFIG") {
        return PathBuf::from(path);
    }

    config_dir().join("config.toml")
}

/// `.env` files consulted for API keys, in load order
pub fn dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".env"));
    }
    paths.push(PathBuf::from(".env"));
    paths
}

//! Configuration I/O - Loading configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;
use tracing::debug;

use super::types::{Config, LogFormat};
use crate::error::{Error, Result};

/// Load configuration with layered precedence:
/// 1. Config file if it exists, otherwise defaults
/// 2. Environment variable overrides
///
/// Command line flags are applied on top by the binary.
pub fn load_config() -> Result<Config> {
    let config_path = super::paths::config_path();

    let mut config = if config_path.exists() {
        debug!("Loading config from {}", config_path.display());
        load_config_from_path(&config_path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    parse_config(path, &content)
}

fn parse_config(path: &Path, content: &str) -> Result<Config> {
    // Detect format by extension
    let config: Config = if path.extension().map_or(false, |ext| ext == "json") {
        // Parse as JSON5 (more lenient than strict JSON)
        json5::from_str(content).map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    } else if path.extension().map_or(false, |ext| ext == "toml") {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else {
        // Try JSON5 first, then TOML
        json5::from_str(content)
            .or_else(|_| toml::from_str(content).map_err(|e| Error::Config(e.to_string())))
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?
    };

    Ok(config)
}

/// Overlay environment variables onto an existing config.
///
/// Env vars have the highest precedence short of command line flags.
pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Overlay values from an arbitrary lookup
pub fn apply_overrides_from(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(model) = lookup("MCP_AGENT_MODEL").filter(|v| !v.trim().is_empty()) {
        config.model.name = Some(model);
    }
    if let Some(url) = lookup("MCP_AGENT_BASE_URL") {
        config.model.base_url = Some(url);
    }
    if let Some(attempts) = lookup("MCP_AGENT_MAX_ATTEMPTS") {
        if let Ok(v) = attempts.parse() {
            config.model.max_attempts = v;
        }
    }
    if let Some(command) = lookup("MCP_AGENT_SERVER_COMMAND") {
        config.server.command = command;
    }
    if let Some(args) = lookup("MCP_AGENT_SERVER_ARGS") {
        config.server.args = args.split_whitespace().map(String::from).collect();
    }
    if let Some(format) = lookup("LOG_FORMAT") {
        config.log.format = if format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };
    }
}

/// Load `~/.env` and then `./.env`. Variables already set are kept.
pub fn load_dotenv_files() {
    for path in super::paths::dotenv_paths() {
        match dotenvy::from_path(&path) {
            Ok(()) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => debug!("Skipping {}: {}", path.display(), e),
        }
    }
}

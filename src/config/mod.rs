//! Configuration module
//!
//! Split into focused modules:
//! - types.rs: Configuration types (Config, ModelConfig, ServerConfig, ToolsConfig, LogConfig)
//! - io.rs: Loading from files, environment variables and `.env` files
//! - validation.rs: Configuration validation
//! - paths.rs: Configuration file paths

mod io;
mod paths;
mod types;
mod validation;

// Re-export config types
pub use types::{Config, LogConfig, LogFormat, ModelConfig, ServerConfig, ToolsConfig};

// Re-export IO and utilities
pub use io::{
    apply_env_overrides, apply_overrides_from, load_config, load_config_from_path,
    load_dotenv_files,
};
pub use paths::{config_dir, config_path, dotenv_paths};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};

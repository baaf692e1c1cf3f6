//! # mcp-agent
//!
//! A terminal coding assistant that lets a language model operate on a
//! project through the tools of a Model Context Protocol server.
//!
//! ## Features
//!
//! - **Typed tool signatures:** MCP JSON Schemas become typed parameter
//!   lists; arguments are bound and validated before any call is sent
//! - **Single invocation path:** argument normalization, logging, error
//!   policy and content checks live in one `ToolInvoker`
//! - **Ignore-aware results:** directory listings and search results are
//!   pruned with the repository's `.gitignore` rules
//! - **Provider agnostic:** OpenAI, Anthropic, Gemini, Groq, Mistral and
//!   Ollama through their OpenAI-compatible endpoints, with overload retry

pub mod agent;
pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;
pub mod schema;
pub mod session;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");

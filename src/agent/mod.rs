//! Agent module - LLM logic, prompts and the turn loop
//!
//! This module handles all model-facing functionality:
//! - Provider resolution from model names and API keys
//! - Chat completions client with overload retry
//! - Message handling and conversation management
//! - System prompt rendering
//! - The structured `final_result` response
//! - The agent runner that executes tool calls for a turn

mod backend;
mod client;
mod conversation;
pub mod prompts;
mod provider;
mod response;
mod runner;
pub mod types;

pub use backend::ModelBackend;
pub use client::{BoundedRetry, ChatClient};
pub use conversation::Conversation;
pub use prompts::{directory_listing, system_prompt, PromptTemplate};
pub use provider::{qualify_model_name, ModelSelection, Provider};
pub use response::{FinalResponse, FINAL_RESULT_TOOL};
pub use runner::{AgentRunner, NoopObserver, TurnObserver, TurnOutcome, MAX_ITERATIONS};
pub use types::*;

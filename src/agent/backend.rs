//! Model backend contract

use async_trait::async_trait;

use super::types::{Message, ToolDefinition};
use crate::error::Result;

/// Something that turns a conversation into the next assistant message
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Provider-qualified model name, for display
    fn model_name(&self) -> String;

    /// Request one assistant message. `tools` lists every function the
    /// model may call.
    async fn complete(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message>;
}

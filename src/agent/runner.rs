//! Agent runner - one conversation turn at a time
//!
//! A turn sends the history plus the user's input to the model, executes
//! the tool calls it asks for one after another, and stops when the model
//! calls `final_result` or answers in plain text. History only changes
//! when a turn completes.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::backend::ModelBackend;
use super::conversation::Conversation;
use super::response::{FinalResponse, FINAL_RESULT_TOOL};
use super::types::Message;
use crate::error::Result;
use crate::tools::{ToolCall, ToolContext, ToolRegistry, ToolResult};

/// Default number of model round-trips per turn
pub const MAX_ITERATIONS: usize = 20;

const MAX_ITERATIONS_NOTICE: &str =
    "I reached the maximum number of steps for this request. Please try a more specific request.";
const EMPTY_REPLY_NOTICE: &str = "I'm having trouble processing this request. Please try again.";

/// Receives progress while a turn runs
pub trait TurnObserver: Send {
    /// A tool is about to be called
    fn on_tool_call(&mut self, _name: &str, _arguments: &Value) {}

    /// A tool call finished
    fn on_tool_result(&mut self, _name: &str, _outcome: &ToolResult) {}
}

/// Observer that ignores everything
pub struct NoopObserver;

impl TurnObserver for NoopObserver {}

/// Result of a completed turn
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub response: FinalResponse,
    /// Tools executed during the turn
    pub tool_calls: usize,
    /// Model round-trips used
    pub iterations: usize,
}

/// Drives the model and tools for a session
pub struct AgentRunner {
    backend: Arc<dyn ModelBackend>,
    tools: ToolRegistry,
    conversation: Conversation,
    context: ToolContext,
    max_iterations: usize,
}

impl AgentRunner {
    pub fn new(
        backend: Arc<dyn ModelBackend>,
        tools: ToolRegistry,
        context: ToolContext,
        system_prompt: impl Into<String>,
    ) -> Self {
        AgentRunner {
            backend,
            tools,
            conversation: Conversation::new().with_system_prompt(system_prompt),
            context,
            max_iterations: MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn clear_history(&mut self) {
        self.conversation.clear();
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn context(&self) -> &ToolContext {
        &self.context
    }

    pub fn model_name(&self) -> String {
        self.backend.model_name()
    }

    /// Run one turn for `input`
    pub async fn run_turn(&mut self, input: &str, observer: &mut dyn TurnObserver) -> Result<TurnOutcome> {
        let mut pending = vec![Message::user(input)];
        let mut definitions = self.tools.definitions();
        definitions.push(FinalResponse::tool_definition());
        let mut tool_calls = 0;

        for iteration in 1..=self.max_iterations {
            let messages = self.conversation.api_messages(&pending);
            debug!("Model request {} with {} messages", iteration, messages.len());
            let reply = self.backend.complete(messages, definitions.clone()).await?;
            let calls = reply.requested_tool_calls().to_vec();

            if calls.is_empty() {
                let text = reply.text().trim().to_string();
                pending.push(reply);
                let response = if text.is_empty() {
                    warn!("Model returned an empty response");
                    FinalResponse::message(EMPTY_REPLY_NOTICE)
                } else {
                    FinalResponse::message(text)
                };
                return Ok(self.commit(pending, response, tool_calls, iteration, false));
            }

            pending.push(reply);
            let mut final_response = None;

            for call in &calls {
                if call.function.name == FINAL_RESULT_TOOL {
                    match FinalResponse::from_arguments(&call.function.arguments) {
                        Ok(response) => {
                            pending.push(Message::tool(&call.id, "Final result processed."));
                            final_response.get_or_insert(response);
                        }
                        Err(e) => {
                            warn!("Invalid final result: {}", e);
                            pending.push(Message::tool(&call.id, correction_hint(&e.to_string())));
                        }
                    }
                    continue;
                }

                if final_response.is_some() {
                    pending.push(Message::tool(
                        &call.id,
                        "Tool not executed - a final result was already processed.",
                    ));
                    continue;
                }

                let tool_call = ToolCall::from_raw(&call.id, &call.function.name, &call.function.arguments);
                observer.on_tool_call(&tool_call.name, &tool_call.arguments);
                tool_calls += 1;

                let outcome = match self.tools.execute(&self.context, &tool_call).await {
                    Ok(result) => result,
                    Err(e) if e.is_recoverable_tool_error() => {
                        warn!("Asking the model to correct its call: {}", e);
                        ToolResult::failure(correction_hint(&e.to_string()))
                    }
                    Err(e) => return Err(e),
                };
                observer.on_tool_result(&tool_call.name, &outcome);
                pending.push(Message::tool(&call.id, outcome.for_model()));
            }

            if let Some(response) = final_response {
                return Ok(self.commit(pending, response, tool_calls, iteration, true));
            }
        }

        warn!("Agent loop exceeded {} iterations", self.max_iterations);
        let response = FinalResponse::message(MAX_ITERATIONS_NOTICE);
        Ok(self.commit(pending, response, tool_calls, self.max_iterations, true))
    }

    fn commit(
        &mut self,
        mut pending: Vec<Message>,
        response: FinalResponse,
        tool_calls: usize,
        iterations: usize,
        record_answer: bool,
    ) -> TurnOutcome {
        if record_answer {
            pending.push(Message::assistant(&response.message));
        }
        self.conversation.extend(pending);
        info!(
            "Turn finished after {} model request(s) and {} tool call(s)",
            iterations, tool_calls
        );
        TurnOutcome {
            response,
            tool_calls,
            iterations,
        }
    }
}

fn correction_hint(error: &str) -> String {
    format!("{}. Fix the errors and try again.", error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::{AssistantToolCall, Role, ToolDefinition};
    use crate::error::Error;
    use crate::schema::{SchemaAdapter, ToolSignature};
    use crate::tools::Tool;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies and records what it was sent
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<Message>>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<Message>>) -> Arc<Self> {
            Arc::new(ScriptedBackend {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ModelBackend for ScriptedBackend {
        fn model_name(&self) -> String {
            "test:scripted".to_string()
        }

        async fn complete(&self, messages: Vec<Message>, tools: Vec<ToolDefinition>) -> Result<Message> {
            assert!(tools.iter().any(|t| t.function.name == FINAL_RESULT_TOOL));
            self.requests.lock().unwrap().push(messages);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Message::assistant("out of script")))
        }
    }

    struct Upper {
        signature: ToolSignature,
    }

    #[async_trait]
    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase text"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]})
        }

        fn signature(&self) -> &ToolSignature {
            &self.signature
        }

        async fn execute(&self, _ctx: &ToolContext, args: Value) -> Result<ToolResult> {
            let bound = self.signature.bind(&args).map_err(|e| Error::InvalidArguments {
                tool: "upper".into(),
                message: e.to_string(),
            })?;
            let text = bound.get("text").and_then(|v| v.as_str()).unwrap_or_default();
            Ok(ToolResult::success(text.to_uppercase()))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        let signature = SchemaAdapter::new().adapt(
            "upper",
            &json!({"properties": {"text": {"type": "string"}}, "required": ["text"]}),
        );
        registry.register(Upper { signature });
        registry
    }

    fn call(id: &str, name: &str, args: &str) -> Message {
        Message::assistant_tool_calls(vec![AssistantToolCall::function(id, name, args)])
    }

    fn final_call(id: &str, message: &str, end: bool) -> Message {
        let args = json!({"message": message, "end_conversation": end}).to_string();
        call(id, FINAL_RESULT_TOOL, &args)
    }

    fn runner(backend: Arc<ScriptedBackend>) -> AgentRunner {
        AgentRunner::new(backend, registry(), ToolContext::new("/work"), "system")
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TurnObserver for Recorder {
        fn on_tool_call(&mut self, name: &str, _arguments: &Value) {
            self.events.push(format!("call {}", name));
        }

        fn on_tool_result(&mut self, name: &str, outcome: &ToolResult) {
            self.events.push(format!("result {} {}", name, outcome.success));
        }
    }

    #[tokio::test]
    async fn test_tool_call_then_final_result() {
        let backend = ScriptedBackend::new(vec![
            Ok(call("c1", "upper", r#"{"text": "abc"}"#)),
            Ok(final_call("c2", "ABC", true)),
        ]);
        let mut runner = runner(backend.clone());
        let mut recorder = Recorder::default();

        let outcome = runner.run_turn("shout abc", &mut recorder).await.unwrap();
        assert_eq!(outcome.response.message, "ABC");
        assert!(outcome.response.end_conversation);
        assert_eq!(outcome.tool_calls, 1);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(recorder.events, vec!["call upper", "result upper true"]);

        // Second request carried the tool output
        let requests = backend.requests.lock().unwrap();
        let tool_message = requests[1].last().unwrap();
        assert_eq!(tool_message.role, Role::Tool);
        assert_eq!(tool_message.text(), "ABC");

        let history = runner.conversation().messages();
        assert_eq!(history.first().unwrap().text(), "shout abc");
        assert_eq!(history.last().unwrap().text(), "ABC");
    }

    #[tokio::test]
    async fn test_plain_text_keeps_conversation_open() {
        let backend = ScriptedBackend::new(vec![Ok(Message::assistant("Which file?"))]);
        let mut runner = runner(backend);

        let outcome = runner.run_turn("edit it", &mut NoopObserver).await.unwrap();
        assert_eq!(outcome.response, FinalResponse::message("Which file?"));
        assert_eq!(runner.conversation().message_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_fed_back() {
        let backend = ScriptedBackend::new(vec![
            Ok(call("c1", "upper", r#"{"txt": "abc"}"#)),
            Ok(call("c2", "missing_tool", "{}")),
            Ok(final_call("c3", "done", true)),
        ]);
        let mut runner = runner(backend.clone());

        let outcome = runner.run_turn("shout", &mut NoopObserver).await.unwrap();
        assert_eq!(outcome.response.message, "done");

        let requests = backend.requests.lock().unwrap();
        let hint = requests[1].last().unwrap().text().to_string();
        assert!(hint.starts_with("Error: Invalid arguments for tool 'upper'"));
        assert!(hint.ends_with("Fix the errors and try again."));
        assert!(requests[2].last().unwrap().text().contains("Unknown tool: missing_tool"));
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_history_unchanged() {
        let backend = ScriptedBackend::new(vec![
            Ok(final_call("c1", "first", false)),
            Err(Error::Overloaded("503".into())),
        ]);
        let mut runner = runner(backend);

        runner.run_turn("one", &mut NoopObserver).await.unwrap();
        let before = runner.conversation().message_count();

        let err = runner.run_turn("two", &mut NoopObserver).await.unwrap_err();
        assert!(matches!(err, Error::Overloaded(_)));
        assert_eq!(runner.conversation().message_count(), before);
    }

    #[tokio::test]
    async fn test_max_iterations_notice() {
        let backend = ScriptedBackend::new(vec![
            Ok(call("c1", "upper", r#"{"text": "a"}"#)),
            Ok(call("c2", "upper", r#"{"text": "b"}"#)),
        ]);
        let mut runner = runner(backend).with_max_iterations(2);

        let outcome = runner.run_turn("loop", &mut NoopObserver).await.unwrap();
        assert_eq!(outcome.response.message, MAX_ITERATIONS_NOTICE);
        assert!(!outcome.response.end_conversation);
        assert_eq!(outcome.tool_calls, 2);
    }
}

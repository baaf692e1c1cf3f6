//! Conversation loop state, independent of the terminal
//!
//! The binary reads lines and renders [`Reply`] values; everything in
//! between lives here so it can be driven from tests.

use tracing::warn;

use crate::agent::{AgentRunner, FinalResponse, TurnObserver};
use crate::commands::Command;

/// Inputs shown by `/history`
pub const HISTORY_LIMIT: usize = 10;

/// What the terminal should show for one line of input
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Blank line
    Ignored,
    /// Leave the loop
    Quit,
    Help,
    /// History was reset; clear the screen
    Cleared,
    /// Most recent inputs, oldest first
    History(Vec<String>),
    /// Tool names and descriptions
    Tools(Vec<(String, String)>),
    UnknownCommand(String),
    /// The agent's answer for a turn
    Agent(FinalResponse),
    /// The turn failed; the session continues
    Error(String),
}

/// One interactive session
pub struct Session {
    runner: AgentRunner,
    inputs: Vec<String>,
    finished: bool,
}

impl Session {
    pub fn new(runner: AgentRunner) -> Self {
        Session {
            runner,
            inputs: Vec::new(),
            finished: false,
        }
    }

    pub fn runner(&self) -> &AgentRunner {
        &self.runner
    }

    /// Whether the loop should stop after rendering the last reply
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Up to `limit` most recent inputs, oldest first
    pub fn recent_inputs(&self, limit: usize) -> &[String] {
        let start = self.inputs.len().saturating_sub(limit);
        &self.inputs[start..]
    }

    /// Handle one line of user input
    pub async fn handle_line(&mut self, line: &str, observer: &mut dyn TurnObserver) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Ignored;
        }
        self.inputs.push(line.to_string());

        if let Some(command) = Command::parse(line) {
            return self.handle_command(command);
        }

        match self.runner.run_turn(line, observer).await {
            Ok(outcome) => {
                if outcome.response.end_conversation {
                    self.finished = true;
                }
                Reply::Agent(outcome.response)
            }
            Err(e) => {
                warn!("Turn failed: {}", e);
                Reply::Error(e.to_string())
            }
        }
    }

    fn handle_command(&mut self, command: Command) -> Reply {
        match command {
            Command::Quit => {
                self.finished = true;
                Reply::Quit
            }
            Command::Help => Reply::Help,
            Command::Clear => {
                self.runner.clear_history();
                Reply::Cleared
            }
            Command::History => Reply::History(self.recent_inputs(HISTORY_LIMIT).to_vec()),
            Command::Tools => {
                let tools = self
                    .runner
                    .tools()
                    .definitions()
                    .into_iter()
                    .map(|d| (d.function.name, d.function.description))
                    .collect();
                Reply::Tools(tools)
            }
            Command::Unknown(name) => Reply::UnknownCommand(name),
        }
    }
}

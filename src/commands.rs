//! In-band slash commands typed at the prompt

/// A recognized command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/quit`, `/exit`, `/q`
    Quit,
    /// `/help`, `/h`, `/?`
    Help,
    /// `/clear`: reset the conversation and the screen
    Clear,
    /// `/history`: recent inputs
    History,
    /// `/tools`: tools the agent can call
    Tools,
    /// Anything else starting with `/`
    Unknown(String),
}

impl Command {
    /// Parse a line of input. Returns `None` for ordinary chat input.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }
        let name = input.split_whitespace().next().unwrap_or(input).to_lowercase();

        Some(match name.as_str() {
            "/quit" | "/exit" | "/q" => Command::Quit,
            "/help" | "/h" | "/?" => Command::Help,
            "/clear" => Command::Clear,
            "/history" => Command::History,
            "/tools" => Command::Tools,
            _ => Command::Unknown(name),
        })
    }

    /// Commands and their descriptions, for help output
    pub fn help() -> &'static [(&'static str, &'static str)] {
        &[
            ("/help, /h, /?", "Show this help message"),
            ("/quit, /exit, /q", "Exit the application"),
            ("/clear", "Clear the conversation and the screen"),
            ("/history", "Show recent inputs"),
            ("/tools", "List available tools"),
        ]
    }
}

//! mcp-agent - interactive coding assistant
//!
//! Spawns an MCP filesystem server rooted at the working directory and
//! lets a model drive its tools from a terminal REPL.

use mcp_agent::agent::{system_prompt, AgentRunner, ChatClient, ModelSelection, TurnObserver};
use mcp_agent::commands::Command;
use mcp_agent::config::{load_config, load_dotenv_files, validate_config, Config, LogFormat};
use mcp_agent::mcp::{McpClient, McpToolBridge};
use mcp_agent::schema::SchemaAdapter;
use mcp_agent::session::{Reply, Session};
use mcp_agent::tools::{
    GitIgnorePolicy, IgnorePolicy, InvokerPolicy, ToolContext, ToolInvoker, ToolRegistry, ToolResult,
};
use mcp_agent::{Error, Result};

use clap::Parser;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, BasicHistory, Input};
use secrecy::SecretString;
use serde_json::Value;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MODEL_ERROR: &str = "Could not build a model. Please provide a valid model name and/or API key.";
const RESULT_PREVIEW: usize = 200;

/// Interactive coding assistant backed by an MCP filesystem server
#[derive(Parser, Debug)]
#[command(name = "mcp-agent")]
#[command(version)]
struct Args {
    /// Directory the agent works in
    #[arg(default_value = ".")]
    working_directory: PathBuf,

    /// Model name, e.g. gpt-4o or anthropic:claude-3-7-sonnet-latest
    #[arg(short, long)]
    model: Option<String>,

    /// API key for the model's provider
    #[arg(long)]
    api_key: Option<String>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,
}

fn init_logging(config: &Config, debug: bool) {
    let default_level = config.log.level.clone().unwrap_or_else(|| "warn".to_string());
    let filter = if debug {
        EnvFilter::new("mcp_agent=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.without_time().init(),
    }
}

fn theme() -> ColorfulTheme {
    ColorfulTheme::default()
}

fn print_banner() {
    println!();
    println!("{}", style("╔══════════════════════════════════════════════════════════════╗").cyan());
    println!("{}", style("║               mcp-agent - Interactive Coding Agent            ║").cyan());
    println!("{}", style("╚══════════════════════════════════════════════════════════════╝").cyan());
    println!();
}

fn print_help() {
    println!();
    println!("   {}", style("Available Commands:").cyan().bold());
    for (names, description) in Command::help() {
        println!("   {:<18} - {}", style(names).yellow(), description);
    }
    println!();
    println!("   {}", style("Tips:").cyan().bold());
    println!("   - Ask the agent to read, edit, create or search files");
    println!("   - Paths are relative to the working directory");
    println!("   - The agent ends the session when it has nothing left to ask");
    println!();
}

fn print_tools(tools: &[(String, String)]) {
    println!();
    println!("   {} {} tools available:", style("🛠").bold(), tools.len());
    println!();
    for (name, description) in tools {
        println!("   {} {}", style("•").cyan(), style(name).green().bold());
        println!("     {}", style(description).dim());
    }
    println!();
}

fn print_history(inputs: &[String]) {
    println!();
    println!("   {}", style("Recent inputs:").cyan().bold());
    if inputs.is_empty() {
        println!("   {}", style("(empty)").dim());
    }
    for (i, input) in inputs.iter().enumerate() {
        println!("   {} {}", style(format!("{:02}", i + 1)).dim(), input);
    }
    println!();
}

/// Shorten tool output for display
fn preview(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}... ({} chars)", head, count)
    } else {
        text.to_string()
    }
}

/// Prints tool activity as the turn progresses
struct TerminalObserver;

impl TurnObserver for TerminalObserver {
    fn on_tool_call(&mut self, name: &str, arguments: &Value) {
        let _ = Term::stdout().clear_line();
        println!(
            "   🔧 {} {}",
            style(name).yellow().bold(),
            style(preview(&arguments.to_string(), 80)).dim()
        );
    }

    fn on_tool_result(&mut self, _name: &str, outcome: &ToolResult) {
        let text = outcome.for_model();
        let marker = if outcome.success { style("✓").green() } else { style("✗").red() };
        println!("     {} {}", marker, style(preview(&text, RESULT_PREVIEW)).dim());
    }
}

/// Render a reply. Returns false when the loop should stop.
fn render(reply: Reply, session: &Session) -> bool {
    match reply {
        Reply::Ignored => {}
        Reply::Quit => return false,
        Reply::Help => print_help(),
        Reply::Cleared => {
            let _ = Term::stdout().clear_screen();
            print_banner();
            println!("   {} Conversation history cleared.\n", style("✓").green());
        }
        Reply::History(inputs) => print_history(&inputs),
        Reply::Tools(tools) => print_tools(&tools),
        Reply::UnknownCommand(name) => {
            println!(
                "   {} Unknown command: {}. Type {} for help.\n",
                style("⚠").yellow(),
                name,
                style("/help").cyan()
            );
        }
        Reply::Agent(response) => {
            println!();
            println!("   {}: {}", style("Agent").cyan().bold(), response.message);
            println!();
            if response.end_conversation {
                println!(
                    "   {} Agent indicated the conversation is complete. Exiting...\n",
                    style("ℹ").blue()
                );
            }
        }
        Reply::Error(message) => {
            println!();
            println!("   {} Error: {}", style("❌").red(), message);
            println!();
        }
    }
    !session.is_finished()
}

async fn build_session(args: &Args, config: &Config, selection: ModelSelection) -> Result<Session> {
    let working_directory = std::fs::canonicalize(&args.working_directory).map_err(|e| {
        Error::Config(format!(
            "Working directory {} is not accessible: {}",
            args.working_directory.display(),
            e
        ))
    })?;

    let backend = ChatClient::new(selection, &config.model)?;

    let server = McpClient::connect_stdio(&config.server.stdio_params(&working_directory)).await?;
    let ignore = ignore_policy(&working_directory);
    let invoker = Arc::new(
        ToolInvoker::new(Arc::new(server), InvokerPolicy::from(&config.tools)).with_ignore_policy(ignore),
    );

    let adapter = SchemaAdapter::new();
    let mut tools = ToolRegistry::new();
    for bridge in McpToolBridge::from_server(invoker, &adapter).await? {
        tools.register(bridge);
    }
    info!("Registered {} tools", tools.count());

    let prompt = system_prompt(&working_directory)?;
    let runner = AgentRunner::new(Arc::new(backend), tools, ToolContext::new(working_directory), prompt)
        .with_max_iterations(config.tools.max_iterations);

    Ok(Session::new(runner))
}

fn ignore_policy(working_directory: &Path) -> Option<Arc<dyn IgnorePolicy>> {
    match GitIgnorePolicy::discover(working_directory) {
        Some(policy) => {
            info!("Filtering tool results with ignore rules from {}", policy.root().display());
            Some(Arc::new(policy))
        }
        None => {
            info!("{} is not inside a git repository", working_directory.display());
            None
        }
    }
}

/// Run a blocking terminal read while other runtime tasks keep going
fn off_runtime<T>(read: impl FnOnce() -> T) -> T {
    tokio::task::block_in_place(read)
}

async fn run_repl(mut session: Session) {
    print_banner();
    println!("   {} Model: {}", style("✓").green(), style(session.runner().model_name()).cyan());
    println!("   {} Tools: {} available", style("✓").green(), session.runner().tools().count());
    println!(
        "   {} Working directory: {}",
        style("✓").green(),
        style(session.runner().context().working_directory.display()).dim()
    );
    println!();
    println!("   Type {} for available commands.", style("/help").yellow());
    println!();

    let theme = theme();
    let mut history = BasicHistory::new().max_entries(100).no_duplicates(true);
    let mut observer = TerminalObserver;

    loop {
        let read = off_runtime(|| {
            Input::<String>::with_theme(&theme)
                .with_prompt(style("You").green().bold().to_string())
                .allow_empty(true)
                .history_with(&mut history)
                .interact_text()
        });
        let line = match read {
            Ok(line) => line,
            Err(e) => {
                info!("Input closed: {}", e);
                break;
            }
        };

        if Command::parse(&line).is_none() && !line.trim().is_empty() {
            print!("   {}", style("●●● thinking").dim());
            let _ = io::stdout().flush();
        }
        let reply = session.handle_line(&line, &mut observer).await;
        let _ = Term::stdout().clear_line();

        if !render(reply, &session) {
            break;
        }
    }

    println!("\n{} Thank you for using mcp-agent!\n", style("👋").bold());
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config, args.debug);

    let validation = validate_config(&config);
    for warning in &validation.warnings {
        warn!("Config: {}", warning);
    }
    if let Some(message) = validation.error_message() {
        eprintln!("{}", message);
        return ExitCode::FAILURE;
    }

    if args.model.is_some() {
        config.model.name = args.model.clone();
    }
    if config.model.name.is_none() {
        load_dotenv_files();
    }

    let api_key = args.api_key.clone().map(SecretString::from);
    let selection = match ModelSelection::from_env(config.model.name.as_deref(), api_key) {
        Ok(selection) => selection,
        Err(e) => {
            warn!("Model resolution failed: {}", e);
            eprintln!("{}", MODEL_ERROR);
            return ExitCode::FAILURE;
        }
    };

    let session = match build_session(&args, &config, selection).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    run_repl(session).await;
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["mcp-agent"]);
        assert_eq!(args.working_directory, PathBuf::from("."));
        assert!(args.model.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::parse_from(["mcp-agent", "/tmp/project", "--model", "gpt-4o", "--api-key", "k", "--debug"]);
        assert_eq!(args.working_directory, PathBuf::from("/tmp/project"));
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        assert_eq!(args.api_key.as_deref(), Some("k"));
        assert!(args.debug);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_blocking_read_leaves_runtime_running() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::time::{Duration, Instant};

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let task = tokio::spawn(async move { flag.store(true, Ordering::SeqCst) });

        let observed = off_runtime(|| {
            let deadline = Instant::now() + Duration::from_secs(5);
            while !ran.load(Ordering::SeqCst) && Instant::now() < deadline {
                std::thread::sleep(Duration::from_millis(5));
            }
            ran.load(Ordering::SeqCst)
        });

        assert!(observed);
        task.await.unwrap();
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("ééééé", 2), "éé... (5 chars)");
    }
}

//! Prompt templates

use handlebars::Handlebars;
use serde::Serialize;
use std::path::Path;

use super::response::FINAL_RESULT_TOOL;
use crate::error::{Error, Result};

/// A prompt template using Handlebars syntax
pub struct PromptTemplate {
    /// Template name
    name: String,
    /// Handlebars registry
    registry: Handlebars<'static>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(name: impl Into<String>, template: &str) -> Result<Self> {
        let name = name.into();
        let mut registry = Handlebars::new();
        // Prompts are plain text, not HTML
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        registry
            .register_template_string(&name, template)
            .map_err(|e| Error::Internal(format!("Invalid template: {}", e)))?;

        Ok(PromptTemplate { name, registry })
    }

    /// Render the template with given data
    pub fn render<T: Serialize>(&self, data: &T) -> Result<String> {
        self.registry
            .render(&self.name, data)
            .map_err(|e| Error::Internal(format!("Template render error: {}", e)))
    }
}

/// System prompt for the coding assistant
pub const SYSTEM_PROMPT_TEMPLATE: &str = r#"
# IDENTITY AND PURPOSE

You are an assistant with strong software development and engineering skills.
You help the user with software development tasks and general file editing
inside their working directory.


# IMPORTANT RULES AND EXPECTED BEHAVIOUR

* Ask clarifying questions when a request is unclear, ambiguous or invalid.
* Use the provided tools to gather information and to perform the actions the request needs.
* Do not guess what kind of project the user is working on. Inspect it with the tools or ask.
* Finish every reply by calling `{{final_tool}}`. Set `end_conversation` to true once the
  request is complete and you have nothing left to ask.


# CONTEXTUAL INFORMATION

Current working directory: {{working_directory}}
Directory listing:
{{directory_listing}}
"#;

#[derive(Serialize)]
struct SystemPromptContext<'a> {
    working_directory: String,
    directory_listing: String,
    final_tool: &'a str,
}

/// Render the system prompt for a working directory
pub fn system_prompt(working_directory: &Path) -> Result<String> {
    let template = PromptTemplate::new("system", SYSTEM_PROMPT_TEMPLATE)?;
    template.render(&SystemPromptContext {
        working_directory: working_directory.display().to_string(),
        directory_listing: directory_listing(working_directory)?,
        final_tool: FINAL_RESULT_TOOL,
    })
}

/// Top-level listing: sorted directories with a trailing `/`, then sorted files
pub fn directory_listing(dir: &Path) -> Result<String> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_dir() {
            dirs.push(format!("{}/", name));
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();
    dirs.extend(files);

    Ok(dirs.join("\n"))
}

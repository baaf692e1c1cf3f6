//! Tool invoker - the single path every remote tool call goes through
//!
//! Normalizes arguments, logs the call, checks the content kind of the
//! reply, applies the per-tool error policy and post-filters listings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use super::filter::{filter_listing, filter_search_results};
use super::ignore_policy::IgnorePolicy;
use super::traits::{ToolContext, ToolResult};
use crate::config::ToolsConfig;
use crate::error::{Error, Result};
use crate::mcp::{ContentBlock, McpToolResult, ToolServer};

/// What happens when a tool reports `isError`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Hand the error text to the model as the tool's result
    #[default]
    Surface,
    /// Abort the turn with [`Error::ToolInvocation`]
    Raise,
}

impl FromStr for ErrorPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "surface" => Ok(ErrorPolicy::Surface),
            "raise" => Ok(ErrorPolicy::Raise),
            other => Err(Error::Config(format!(
                "Unknown error policy '{}' (expected 'surface' or 'raise')",
                other
            ))),
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorPolicy::Surface => write!(f, "surface"),
            ErrorPolicy::Raise => write!(f, "raise"),
        }
    }
}

/// Per-tool behavior of the invoker
#[derive(Debug, Clone)]
pub struct InvokerPolicy {
    /// Tool whose exclusion list gets the default excludes
    pub search_tool: String,
    /// Argument holding the exclusion list
    pub exclude_field: String,
    pub default_excludes: Vec<String>,
    /// Tools whose output is a JSON directory listing
    pub listing_tools: Vec<String>,
    pub default_error_policy: ErrorPolicy,
    pub error_policies: HashMap<String, ErrorPolicy>,
}

impl Default for InvokerPolicy {
    fn default() -> Self {
        InvokerPolicy::from(&ToolsConfig::default())
    }
}

impl From<&ToolsConfig> for InvokerPolicy {
    fn from(config: &ToolsConfig) -> Self {
        let error_policies = config
            .raise_on_error
            .iter()
            .map(|tool| (tool.clone(), ErrorPolicy::Raise))
            .collect();
        InvokerPolicy {
            search_tool: config.search_tool.clone(),
            exclude_field: config.exclude_field.clone(),
            default_excludes: config.default_excludes.clone(),
            listing_tools: config.listing_tools.clone(),
            default_error_policy: config.error_policy,
            error_policies,
        }
    }
}

impl InvokerPolicy {
    pub fn error_policy(&self, tool: &str) -> ErrorPolicy {
        self.error_policies
            .get(tool)
            .copied()
            .unwrap_or(self.default_error_policy)
    }

    pub fn is_listing_tool(&self, tool: &str) -> bool {
        self.listing_tools.iter().any(|t| t == tool)
    }

    /// Apply argument rewrites. Only the search tool's exclusion list is
    /// touched: default excludes are appended when missing, caller entries
    /// stay first.
    pub fn normalize_arguments(&self, tool: &str, mut arguments: Map<String, Value>) -> Map<String, Value> {
        if tool != self.search_tool || self.default_excludes.is_empty() {
            return arguments;
        }

        let mut excludes: Vec<Value> = match arguments.remove(&self.exclude_field) {
            Some(Value::Array(items)) => items,
            Some(Value::String(single)) => vec![Value::String(single)],
            _ => Vec::new(),
        };
        for default in &self.default_excludes {
            if !excludes.iter().any(|e| e.as_str() == Some(default)) {
                excludes.push(Value::String(default.clone()));
            }
        }
        arguments.insert(self.exclude_field.clone(), Value::Array(excludes));
        arguments
    }
}

/// Calls tools on a [`ToolServer`] under an [`InvokerPolicy`]
pub struct ToolInvoker {
    server: Arc<dyn ToolServer>,
    policy: InvokerPolicy,
    ignore: Option<Arc<dyn IgnorePolicy>>,
}

impl ToolInvoker {
    pub fn new(server: Arc<dyn ToolServer>, policy: InvokerPolicy) -> Self {
        ToolInvoker {
            server,
            policy,
            ignore: None,
        }
    }

    /// Set the ignore rules applied to listing and search output
    pub fn with_ignore_policy(mut self, ignore: Option<Arc<dyn IgnorePolicy>>) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn server(&self) -> &Arc<dyn ToolServer> {
        &self.server
    }

    pub fn policy(&self) -> &InvokerPolicy {
        &self.policy
    }

    /// Perform exactly one remote call and reduce its reply to text
    pub async fn invoke(
        &self,
        ctx: &ToolContext,
        tool: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolResult> {
        let base = listed_directory(ctx, &arguments);
        let arguments = Value::Object(self.policy.normalize_arguments(tool, arguments));
        info!("Calling tool {} with {}", tool, arguments);

        let result = self.server.call_tool(tool, arguments).await?;
        info!(
            "Tool {} returned {} block(s){}",
            tool,
            result.content.len(),
            if result.is_error { " (error)" } else { "" }
        );

        if let Some(block @ ContentBlock::Other(_)) = result.content.first() {
            return Err(Error::UnsupportedContent {
                tool: tool.to_string(),
                kind: block.kind(),
            });
        }

        if result.is_error {
            let text = result.joined_text();
            let message = if text.trim().is_empty() {
                "tool reported an error without details".to_string()
            } else {
                text
            };
            return match self.policy.error_policy(tool) {
                ErrorPolicy::Surface => {
                    warn!("Tool {} failed: {}", tool, message);
                    Ok(ToolResult::failure(message))
                }
                ErrorPolicy::Raise => Err(Error::ToolInvocation {
                    tool: tool.to_string(),
                    message,
                }),
            };
        }

        let result = self.post_process(ctx, &base, tool, result)?;
        if result.content.is_empty() {
            return Err(Error::UnsupportedContent {
                tool: tool.to_string(),
                kind: "empty".to_string(),
            });
        }
        Ok(ToolResult::success(result.joined_text()))
    }

    fn post_process(
        &self,
        ctx: &ToolContext,
        base: &Path,
        tool: &str,
        result: McpToolResult,
    ) -> Result<McpToolResult> {
        let ignore = self.ignore.as_deref();
        if self.policy.is_listing_tool(tool) {
            filter_listing(tool, result, base, ignore)
        } else if tool == self.policy.search_tool {
            filter_search_results(tool, result, &ctx.working_directory, ignore)
        } else {
            Ok(result)
        }
    }
}

/// Directory a call operates on: its `path` argument resolved against the
/// working directory, or the working directory itself
fn listed_directory(ctx: &ToolContext, arguments: &Map<String, Value>) -> PathBuf {
    match arguments.get("path").and_then(Value::as_str) {
        Some(path) if !path.trim().is_empty() => ctx.working_directory.join(path),
        _ => ctx.working_directory.clone(),
    }
}

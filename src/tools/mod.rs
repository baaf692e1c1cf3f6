//! Tools module - how the agent calls tools
//!
//! Every tool the model can see implements the `Tool` trait and lives in a
//! `ToolRegistry`. Tools backed by the MCP server route their calls through
//! a single `ToolInvoker`, which owns the cross-cutting behavior:
//!
//! - **Argument normalization**: default exclusion patterns for searches
//! - **Content checks**: only text results are forwarded to the model
//! - **Error policy**: surface tool errors to the model, or abort the turn
//! - **Result filtering**: listings and search hits are pruned with the
//!   repository's gitignore rules

mod filter;
mod ignore_policy;
mod invoker;
mod registry;
mod traits;

// Core trait and types
pub use traits::{Tool, ToolCall, ToolContext, ToolResult};

// Registry
pub use registry::ToolRegistry;

// Invocation
pub use invoker::{ErrorPolicy, InvokerPolicy, ToolInvoker};

// Filtering
pub use filter::{
    filter_entries, filter_listing, filter_search_results, DirectoryEntry, DirectoryListing,
    EntryKind, NO_MATCHES,
};
pub use ignore_policy::{GitIgnorePolicy, IgnorePolicy};

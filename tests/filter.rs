//! Listing filter against real ignore rules on disk

use async_trait::async_trait;
use mcp_agent::mcp::{ContentBlock, McpTool, McpToolResult, ToolServer};
use mcp_agent::tools::{
    filter_listing, DirectoryEntry, DirectoryListing, GitIgnorePolicy, IgnorePolicy, InvokerPolicy,
    ToolContext, ToolInvoker,
};
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const TREE: &str = r#"[{"name":"a.txt","type":"file"},{"name":".git","type":"directory","children":[]},{"name":"build","type":"directory","children":[{"name":"out.o","type":"file"}]},{"name":"src","type":"directory","children":[{"name":"x.py","type":"file"}]}]"#;

fn listing(result: &McpToolResult) -> DirectoryListing {
    match &result.content[0] {
        ContentBlock::Text(text) => serde_json::from_str(text).unwrap(),
        other => panic!("unexpected block {:?}", other),
    }
}

#[test]
fn test_git_and_ignored_build_are_removed() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".gitignore"), "build/\n").unwrap();

    let policy = GitIgnorePolicy::discover(&root).unwrap();
    let filtered = filter_listing(
        "directory_tree",
        McpToolResult::text(TREE),
        &root,
        Some(&policy as &dyn IgnorePolicy),
    )
    .unwrap();

    assert_eq!(
        listing(&filtered),
        DirectoryListing::Entries(vec![
            DirectoryEntry::file("a.txt"),
            DirectoryEntry::directory("src", vec![DirectoryEntry::file("x.py")]),
        ])
    );
}

#[test]
fn test_nested_gitignore_applies_below_its_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::create_dir(root.join("src")).unwrap();
    fs::write(root.join("src/.gitignore"), "*.py\n!keep.py\n").unwrap();

    let tree = r#"{"name":"project","type":"directory","children":[
        {"name":"top.py","type":"file"},
        {"name":"src","type":"directory","children":[
            {"name":"drop.py","type":"file"},
            {"name":"keep.py","type":"file"}
        ]}
    ]}"#;

    let policy = GitIgnorePolicy::discover(&root).unwrap();
    let filtered =
        filter_listing("directory_tree", McpToolResult::text(tree), &root, Some(&policy as &dyn IgnorePolicy))
            .unwrap();

    let DirectoryListing::Root(project) = listing(&filtered) else {
        panic!("expected a root entry");
    };
    assert_eq!(
        project.children.unwrap(),
        vec![
            DirectoryEntry::file("top.py"),
            DirectoryEntry::directory("src", vec![DirectoryEntry::file("keep.py")]),
        ]
    );
}

#[test]
fn test_without_repository_listing_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let result = McpToolResult::text(TREE);

    let filtered = filter_listing("directory_tree", result.clone(), dir.path(), None).unwrap();
    assert_eq!(filtered, result);
}

/// Answers every call with the same listing
struct StaticListing(&'static str);

#[async_trait]
impl ToolServer for StaticListing {
    async fn list_tools(&self) -> mcp_agent::Result<Vec<McpTool>> {
        Ok(Vec::new())
    }

    async fn call_tool(&self, _name: &str, _arguments: Value) -> mcp_agent::Result<McpToolResult> {
        Ok(McpToolResult::text(self.0))
    }
}

#[tokio::test]
async fn test_anchored_rule_does_not_hide_same_name_in_subdirectory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    fs::create_dir(root.join(".git")).unwrap();
    fs::write(root.join(".gitignore"), "/dist\n").unwrap();
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::create_dir_all(root.join("src/dist")).unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();

    let server = Arc::new(StaticListing(
        r#"[{"name":"dist","type":"directory","children":[]},{"name":"main.rs","type":"file"}]"#,
    ));
    let policy = GitIgnorePolicy::discover(&root).map(|p| Arc::new(p) as Arc<dyn IgnorePolicy>);
    let invoker = ToolInvoker::new(server, InvokerPolicy::default()).with_ignore_policy(policy);
    let ctx = ToolContext::new(&root);

    let arguments = json!({"path": root.join("src").display().to_string()});
    let sub = invoker
        .invoke(&ctx, "directory_tree", arguments.as_object().cloned().unwrap())
        .await
        .unwrap();
    let names: Vec<String> = serde_json::from_str::<Vec<DirectoryEntry>>(sub.content.as_deref().unwrap())
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["dist", "main.rs"]);

    let top = invoker
        .invoke(&ctx, "directory_tree", json!({"path": "."}).as_object().cloned().unwrap())
        .await
        .unwrap();
    let names: Vec<String> = serde_json::from_str::<Vec<DirectoryEntry>>(top.content.as_deref().unwrap())
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["main.rs"]);
}

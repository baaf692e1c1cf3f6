//! Post-processing of listing and search results
//!
//! Directory listings come back from the server as a JSON tree of
//! `{name, type, children}` entries. Entries git would ignore are pruned
//! before the model sees them, and so is `.git` itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

use super::ignore_policy::IgnorePolicy;
use crate::error::{Error, Result};
use crate::mcp::{ContentBlock, McpToolResult};

/// Reply used when every search hit was filtered away
pub const NO_MATCHES: &str = "No matches found";

/// Entry kind in a directory listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One node of a directory listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<DirectoryEntry>>,
    /// Fields the server sent that are not interpreted here
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DirectoryEntry {
    pub fn file(name: impl Into<String>) -> Self {
        DirectoryEntry {
            name: name.into(),
            kind: EntryKind::File,
            children: None,
            extra: Map::new(),
        }
    }

    pub fn directory(name: impl Into<String>, children: Vec<DirectoryEntry>) -> Self {
        DirectoryEntry {
            name: name.into(),
            kind: EntryKind::Directory,
            children: Some(children),
            extra: Map::new(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Top-level shape of a listing: a bare array of entries, or a single
/// root entry standing for the listed directory itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectoryListing {
    Entries(Vec<DirectoryEntry>),
    Root(DirectoryEntry),
}

impl DirectoryListing {
    fn filter(self, base: &Path, policy: &dyn IgnorePolicy) -> Self {
        match self {
            DirectoryListing::Entries(entries) => {
                DirectoryListing::Entries(filter_entries(entries, base, policy))
            }
            DirectoryListing::Root(mut root) => {
                if let Some(children) = root.children.take() {
                    root.children = Some(filter_entries(children, base, policy));
                }
                DirectoryListing::Root(root)
            }
        }
    }
}

/// Drop ignored entries recursively. `dir` is the directory the entries
/// live in; surviving entries keep their order.
pub fn filter_entries(
    entries: Vec<DirectoryEntry>,
    dir: &Path,
    policy: &dyn IgnorePolicy,
) -> Vec<DirectoryEntry> {
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let path = dir.join(&entry.name);
            if entry.name == ".git" || policy.is_ignored(&path, entry.is_dir()) {
                debug!("Filtered {}", path.display());
                return None;
            }
            if entry.is_dir() {
                if let Some(children) = entry.children.take() {
                    entry.children = Some(filter_entries(children, &path, policy));
                }
            } else {
                // Files never carry children
                entry.children = None;
            }
            Some(entry)
        })
        .collect()
}

/// Filter the JSON listing carried in the first text block of `result`.
///
/// Without a policy (no enclosing repository) the result is returned
/// unchanged. Text that is not a listing is passed through with a warning.
pub fn filter_listing(
    tool: &str,
    result: McpToolResult,
    base: &Path,
    policy: Option<&dyn IgnorePolicy>,
) -> Result<McpToolResult> {
    let Some(policy) = policy else {
        return Ok(result);
    };
    let listing = match result.content.first() {
        None => return Ok(result),
        Some(ContentBlock::Text(text)) => serde_json::from_str::<DirectoryListing>(text),
        Some(other) => {
            return Err(Error::UnsupportedContent {
                tool: tool.to_string(),
                kind: other.kind(),
            })
        }
    };

    let listing = match listing {
        Ok(listing) => listing,
        Err(err) => {
            warn!("{} output is not a directory listing, leaving it unfiltered: {}", tool, err);
            return Ok(result);
        }
    };

    let filtered = serde_json::to_string_pretty(&listing.filter(base, policy))?;
    let mut result = result;
    result.content[0] = ContentBlock::Text(filtered);
    Ok(result)
}

/// Filter newline-separated search hits. Relative hits are resolved
/// against `base`.
pub fn filter_search_results(
    tool: &str,
    result: McpToolResult,
    base: &Path,
    policy: Option<&dyn IgnorePolicy>,
) -> Result<McpToolResult> {
    let Some(policy) = policy else {
        return Ok(result);
    };
    let text = match result.content.first() {
        None => return Ok(result),
        Some(ContentBlock::Text(text)) => text,
        Some(other) => {
            return Err(Error::UnsupportedContent {
                tool: tool.to_string(),
                kind: other.kind(),
            })
        }
    };
    if text.trim() == NO_MATCHES {
        return Ok(result);
    }

    let kept: Vec<&str> = text
        .lines()
        .filter(|line| {
            let hit = line.trim();
            if hit.is_empty() {
                return false;
            }
            let path = base.join(hit);
            let ignored = path.components().any(|c| c.as_os_str() == ".git")
                || policy.is_ignored(&path, path.is_dir());
            if ignored {
                debug!("Filtered search hit {}", hit);
            }
            !ignored
        })
        .collect();

    let filtered = if kept.is_empty() {
        NO_MATCHES.to_string()
    } else {
        kept.join("\n")
    };
    let mut result = result;
    result.content[0] = ContentBlock::Text(filtered);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    /// Ignores any path whose file name is in the list
    struct NamePolicy(Vec<&'static str>);

    impl IgnorePolicy for NamePolicy {
        fn is_ignored(&self, path: &Path, _is_dir: bool) -> bool {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| self.0.contains(&n))
        }
    }

    fn base() -> PathBuf {
        PathBuf::from("/work")
    }

    #[test]
    fn test_filter_entries_prunes_and_keeps_order() {
        let entries = vec![
            DirectoryEntry::directory(".git", vec![DirectoryEntry::file("HEAD")]),
            DirectoryEntry::file("b.py"),
            DirectoryEntry::directory("build", vec![DirectoryEntry::file("out.o")]),
            DirectoryEntry::directory(
                "src",
                vec![DirectoryEntry::file("x.py"), DirectoryEntry::file("x.pyc")],
            ),
            DirectoryEntry::file("a.py"),
        ];
        let policy = NamePolicy(vec!["build", "x.pyc"]);
        let filtered = filter_entries(entries, &base(), &policy);

        assert_eq!(
            filtered,
            vec![
                DirectoryEntry::file("b.py"),
                DirectoryEntry::directory("src", vec![DirectoryEntry::file("x.py")]),
                DirectoryEntry::file("a.py"),
            ]
        );
    }

    #[test]
    fn test_file_entries_lose_stray_children() {
        let mut odd = DirectoryEntry::file("notes.txt");
        odd.children = Some(vec![DirectoryEntry::file("inner")]);
        let filtered = filter_entries(vec![odd], &base(), &NamePolicy(vec![]));
        assert_eq!(filtered, vec![DirectoryEntry::file("notes.txt")]);

        let json = serde_json::to_value(&filtered).unwrap();
        assert_eq!(json, json!([{"name": "notes.txt", "type": "file"}]));
    }

    #[test]
    fn test_git_dropped_even_when_policy_allows() {
        let entries = vec![DirectoryEntry::directory(".git", vec![])];
        let filtered = filter_entries(entries, &base(), &NamePolicy(vec![]));
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_listing_without_policy_is_identity() {
        let text = r#"[{"name":".git","type":"directory","children":[]}]"#;
        let result = McpToolResult::text(text);
        let filtered = filter_listing("directory_tree", result.clone(), &base(), None).unwrap();
        assert_eq!(filtered, result);
    }

    #[test]
    fn test_filter_listing_preserves_unknown_fields() {
        let text = json!([
            {"name": "a.txt", "type": "file", "size": 12},
            {"name": "tmp", "type": "directory", "children": []}
        ])
        .to_string();
        let policy = NamePolicy(vec!["tmp"]);
        let filtered =
            filter_listing("directory_tree", McpToolResult::text(text), &base(), Some(&policy)).unwrap();

        let value: Value = serde_json::from_str(&filtered.joined_text()).unwrap();
        assert_eq!(value, json!([{"name": "a.txt", "type": "file", "size": 12}]));
    }

    #[test]
    fn test_filter_listing_root_object() {
        let text = json!({
            "name": "work", "type": "directory",
            "children": [{"name": "skip", "type": "file"}, {"name": "keep", "type": "file"}]
        })
        .to_string();
        let policy = NamePolicy(vec!["skip"]);
        let filtered =
            filter_listing("directory_tree", McpToolResult::text(text), &base(), Some(&policy)).unwrap();

        let listing: DirectoryListing = serde_json::from_str(&filtered.joined_text()).unwrap();
        let DirectoryListing::Root(root) = listing else {
            panic!("expected a root entry");
        };
        assert_eq!(root.children, Some(vec![DirectoryEntry::file("keep")]));
    }

    #[test]
    fn test_filter_listing_passes_through_non_listing_text() {
        let result = McpToolResult::text("Access denied - path outside allowed directories");
        let policy = NamePolicy(vec![]);
        let filtered =
            filter_listing("directory_tree", result.clone(), &base(), Some(&policy)).unwrap();
        assert_eq!(filtered, result);
    }

    #[test]
    fn test_filter_listing_rejects_opaque_block() {
        let result = McpToolResult {
            content: vec![ContentBlock::from(json!({"type": "image", "data": ""}))],
            is_error: false,
        };
        let policy = NamePolicy(vec![]);
        let err = filter_listing("directory_tree", result, &base(), Some(&policy)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedContent { kind, .. } if kind == "image"));
    }

    #[test]
    fn test_filter_search_results() {
        let text = "/work/src/x.py\n/work/build/x.py\n/work/.git/x.py";
        let policy = NamePolicy(vec!["build"]);
        let policy_for_parents = ParentPolicy(policy);
        let filtered = filter_search_results(
            "search_files",
            McpToolResult::text(text),
            &base(),
            Some(&policy_for_parents),
        )
        .unwrap();
        assert_eq!(filtered.joined_text(), "/work/src/x.py");
    }

    #[test]
    fn test_filter_search_results_all_removed() {
        let policy = NamePolicy(vec!["x.py"]);
        let filtered = filter_search_results(
            "search_files",
            McpToolResult::text("/work/x.py"),
            &base(),
            Some(&policy),
        )
        .unwrap();
        assert_eq!(filtered.joined_text(), NO_MATCHES);
    }

    /// Ignores a path when any ancestor matches the inner policy
    struct ParentPolicy(NamePolicy);

    impl IgnorePolicy for ParentPolicy {
        fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
            path.ancestors().any(|p| self.0.is_ignored(p, is_dir))
        }
    }
}

//! Version-control ignore rules
//!
//! Answers "would git ignore this path?" for the repository enclosing the
//! session's working directory, using the `ignore` crate's gitignore
//! matchers.

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::{Match, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Predicate deciding whether a path is excluded from listings
pub trait IgnorePolicy: Send + Sync {
    /// `path` is absolute; `is_dir` selects directory-only patterns
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool;
}

/// Ignore rules of a git working tree
pub struct GitIgnorePolicy {
    root: PathBuf,
    /// One matcher per `.gitignore`, deepest directory first
    matchers: Vec<Gitignore>,
    /// `.git/info/exclude`
    exclude: Option<Gitignore>,
    /// The user's global excludes file
    global: Option<Gitignore>,
}

impl GitIgnorePolicy {
    /// Find the repository enclosing `start` and load its rules.
    ///
    /// Returns `None` when `start` is not inside a git working tree.
    pub fn discover(start: &Path) -> Option<Self> {
        let start = start.canonicalize().ok()?;
        let root = start
            .ancestors()
            .find(|dir| dir.join(".git").exists())?
            .to_path_buf();
        debug!("Found git repository at {}", root.display());
        Some(Self::load(root))
    }

    /// Load the rules of the repository rooted at `root`
    pub fn load(root: PathBuf) -> Self {
        let mut matchers = Vec::new();

        // Ignored directories are not descended into, so their .gitignore
        // files never apply, matching git.
        let walker = WalkBuilder::new(&root)
            .hidden(false)
            .git_global(false)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();
        for entry in walker.flatten() {
            let is_file = entry.file_type().is_some_and(|t| t.is_file());
            if !is_file || entry.file_name() != ".gitignore" {
                continue;
            }
            let Some(dir) = entry.path().parent() else { continue };
            if let Some(matcher) = build_matcher(dir, entry.path()) {
                matchers.push(matcher);
            }
        }
        matchers.sort_by_key(|m| std::cmp::Reverse(m.path().components().count()));

        let exclude_file = root.join(".git").join("info").join("exclude");
        let exclude = exclude_file
            .is_file()
            .then(|| build_matcher(&root, &exclude_file))
            .flatten();

        let (global, err) = Gitignore::global();
        if let Some(err) = err {
            debug!("Global gitignore not loaded: {}", err);
        }
        let global = (!global.is_empty()).then_some(global);

        debug!(
            "Loaded {} .gitignore file(s) under {}",
            matchers.len(),
            root.display()
        );

        GitIgnorePolicy {
            root,
            matchers,
            exclude,
            global,
        }
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IgnorePolicy for GitIgnorePolicy {
    fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        if relative.as_os_str().is_empty() {
            return false;
        }
        if relative.components().any(|c| c.as_os_str() == ".git") {
            return true;
        }

        // The nearest .gitignore decides, including negations.
        for matcher in &self.matchers {
            let Ok(local) = path.strip_prefix(matcher.path()) else { continue };
            if local.as_os_str().is_empty() {
                continue;
            }
            match matcher.matched_path_or_any_parents(local, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }

        for matcher in self.exclude.iter().chain(self.global.iter()) {
            match matcher.matched_path_or_any_parents(relative, is_dir) {
                Match::Ignore(_) => return true,
                Match::Whitelist(_) => return false,
                Match::None => {}
            }
        }

        false
    }
}

fn build_matcher(root: &Path, file: &Path) -> Option<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    if let Some(err) = builder.add(file) {
        warn!("Problem reading {}: {}", file.display(), err);
    }
    match builder.build() {
        Ok(matcher) => Some(matcher),
        Err(err) => {
            warn!("Ignoring unusable {}: {}", file.display(), err);
            None
        }
    }
}

//! Current-worktree detection.

use std::path::Path;
use std::sync::Arc;

use normalize_path::NormalizePath;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result};
use crate::git::GitCapability;
use crate::path::absolutize;

use super::types::Worktree;

/// Answers "is this directory a linked worktree, and if so, which one?".
pub struct CurrentWorktreeDetector {
    git: Arc<dyn GitCapability>,
}

impl CurrentWorktreeDetector {
    pub fn new(git: Arc<dyn GitCapability>) -> Self {
        CurrentWorktreeDetector { git }
    }

    /// Identify the worktree containing `current_dir`.
    ///
    /// Returns `None` when the directory is the main working tree (the main
    /// worktree is a repository, not a linked worktree) or does not match
    /// any listed worktree. Comparison is by normalized absolute path;
    /// symlinks are not resolved.
    pub fn detect(&self, current_dir: &Path, cancel: &CancelToken) -> Result<Option<Worktree>> {
        if current_dir.as_os_str().is_empty() {
            return Err(Error::validation("Current directory is empty")
                .with_suggestion("Provide a directory to inspect"));
        }

        let repo_root = self
            .git
            .get_repository_root(current_dir, cancel)
            .map_err(|e| match e.kind() {
                ErrorKind::Cancelled | ErrorKind::NotRepository => e,
                _ => Error::not_repository(current_dir).with_source(e),
            })?;

        let current = absolutize(current_dir);
        let root = absolutize(&repo_root);

        let worktrees = self.git.list_worktrees(&repo_root, cancel)?;
        for info in worktrees {
            if info.bare {
                continue;
            }
            let candidate = info.path.normalize();
            if candidate == current && candidate != root {
                return Ok(Some(Worktree::try_from(info)?));
            }
        }
        Ok(None)
    }
}

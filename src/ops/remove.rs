//! Worktree removal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result};
use crate::git::GitCapability;
use crate::styling::ERROR_BOLD;
use crate::workspace::DiscoveryEngine;

/// What a successful removal did.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveOutcome {
    pub worktree_path: PathBuf,
    pub repo_root: PathBuf,
    /// The branch that was deleted alongside the worktree, if requested.
    pub deleted_branch: Option<String>,
}

/// Safety-checked worktree removal with optional branch deletion.
pub struct WorktreeRemover {
    git: Arc<dyn GitCapability>,
    engine: Arc<DiscoveryEngine>,
}

impl WorktreeRemover {
    pub fn new(git: Arc<dyn GitCapability>, engine: Arc<DiscoveryEngine>) -> Self {
        WorktreeRemover { git, engine }
    }

    /// Remove the worktree at `worktree_path`.
    ///
    /// Without `force`, a dirty working tree is refused before any mutation.
    /// With `delete_branch`, the checked-out branch is captured before
    /// removal and deleted afterwards; a failed branch delete surfaces as an
    /// error even though the removal itself stands.
    pub fn remove(
        &self,
        worktree_path: &Path,
        force: bool,
        delete_branch: bool,
        cancel: &CancelToken,
    ) -> Result<RemoveOutcome> {
        if worktree_path.as_os_str().is_empty() {
            return Err(Error::validation("Worktree path is empty")
                .with_suggestion("Provide the path of the worktree to remove"));
        }

        let repo_root = self
            .git
            .get_repository_root(worktree_path, cancel)
            .map_err(|e| match e.kind() {
                ErrorKind::Cancelled | ErrorKind::NotRepository => e,
                _ => Error::not_repository(worktree_path).with_source(e),
            })?;

        if !force && self.git.has_uncommitted_changes(worktree_path, cancel)? {
            return Err(Error::uncommitted_changes(worktree_path)
                .with_suggestion("Commit or stash the changes, or pass --force"));
        }

        // Capture before removal: afterwards there is no worktree to ask.
        let branch_to_delete = if delete_branch {
            Some(self.git.get_current_branch(worktree_path, cancel)?)
        } else {
            None
        };

        self.git
            .remove_worktree(&repo_root, worktree_path, force, cancel)?;
        self.engine.invalidate(worktree_path);

        if let Some(branch) = &branch_to_delete {
            self.git
                .delete_branch(&repo_root, branch, cancel)
                .map_err(|e| {
                    Error::git_command(format!(
                        "Worktree removed, but deleting branch {ERROR_BOLD}{branch}{ERROR_BOLD:#} failed: {}",
                        e.message()
                    ))
                    .with_path(worktree_path)
                    .with_suggestion(format!(
                        "The worktree is gone; delete the branch manually with 'git branch -D {branch}'"
                    ))
                })?;
        }

        Ok(RemoveOutcome {
            worktree_path: worktree_path.to_path_buf(),
            repo_root,
            deleted_branch: branch_to_delete,
        })
    }
}

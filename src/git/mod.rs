//! Git capability boundary.
//!
//! The core never talks to git directly; it depends on [`GitCapability`], a
//! trait describing the repository queries and worktree mutations it needs.
//! [`CliGit`] implements the trait by shelling out to the `git` binary; tests
//! inject scripted capabilities instead.
//!
//! Every operation takes a [`CancelToken`](crate::cancel::CancelToken) and
//! absolute paths. Mutating operations (`create_worktree`, `remove_worktree`,
//! `delete_branch`) are never invoked concurrently on the same repository by
//! the core; read operations must be safe to call from multiple threads.

use std::path::{Path, PathBuf};

use crate::cancel::CancelToken;
use crate::error::Result;

mod cli;
mod parse;

pub use cli::CliGit;

/// Transport record at the git boundary.
///
/// This is what the capability returns; the core converts it into a
/// [`Worktree`](crate::workspace::Worktree) domain entity, rejecting entries
/// that violate domain invariants (detached HEAD, relative paths).
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct WorktreeInfo {
    pub path: PathBuf,
    /// Checked-out branch; `None` in detached HEAD state.
    pub branch: Option<String>,
    /// Full object id of the checked-out commit.
    pub commit: String,
    /// Whether the working tree has no uncommitted changes.
    pub clean: bool,
    /// Unix timestamp of the checked-out commit (not of the observation).
    pub commit_time: i64,
    pub bare: bool,
}

/// The git operations the core consumes.
pub trait GitCapability: Send + Sync {
    /// True iff the path is any form of git working tree or repo dir.
    fn is_git_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool>;

    /// True iff the path is a non-bare main repository (not a linked
    /// worktree, not bare).
    fn is_main_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool>;

    fn is_bare_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool>;

    /// Root of the working tree containing `path`; fails outside a repo.
    fn get_repository_root(&self, path: &Path, cancel: &CancelToken) -> Result<PathBuf>;

    /// Enumerate the main worktree and every linked worktree.
    fn list_worktrees(&self, repo_root: &Path, cancel: &CancelToken) -> Result<Vec<WorktreeInfo>>;

    /// Full status record for one worktree.
    fn get_worktree_status(&self, worktree_path: &Path, cancel: &CancelToken)
    -> Result<WorktreeInfo>;

    fn has_uncommitted_changes(&self, worktree_path: &Path, cancel: &CancelToken) -> Result<bool>;

    fn branch_exists(&self, repo: &Path, branch: &str, cancel: &CancelToken) -> Result<bool>;

    /// Name of the branch checked out at `worktree_path`; errors on detached
    /// HEAD.
    fn get_current_branch(&self, worktree_path: &Path, cancel: &CancelToken) -> Result<String>;

    /// Create a worktree at `target`, creating `branch` if it does not exist.
    fn create_worktree(
        &self,
        repo: &Path,
        branch: &str,
        target: &Path,
        cancel: &CancelToken,
    ) -> Result<()>;

    fn remove_worktree(
        &self,
        repo: &Path,
        worktree_path: &Path,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<()>;

    fn delete_branch(&self, repo: &Path, branch: &str, cancel: &CancelToken) -> Result<()>;
}

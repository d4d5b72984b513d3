//! Worktree creation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result};
use crate::fsprobe::Filesystem;
use crate::git::GitCapability;
use crate::hook::SetupHook;
use crate::validate::validate_worktree_creation;
use crate::workspace::DiscoveryEngine;

/// What a successful creation produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    /// The path actually used; differs from the request when a fallback
    /// target was substituted.
    pub target: PathBuf,
    /// Whether the branch already existed before the call (advisory).
    pub branch_existed: bool,
}

/// Composes validation, the git capability, and the env hook into validated
/// worktree creation.
pub struct WorktreeCreator {
    git: Arc<dyn GitCapability>,
    fs: Arc<dyn Filesystem>,
    hook: Arc<dyn SetupHook>,
    engine: Arc<DiscoveryEngine>,
}

impl WorktreeCreator {
    pub fn new(
        git: Arc<dyn GitCapability>,
        fs: Arc<dyn Filesystem>,
        hook: Arc<dyn SetupHook>,
        engine: Arc<DiscoveryEngine>,
    ) -> Self {
        WorktreeCreator {
            git,
            fs,
            hook,
            engine,
        }
    }

    /// Create a worktree for `branch` at `target`, creating the branch if
    /// needed.
    ///
    /// The environment hook runs after a successful creation; its failures
    /// are logged and swallowed. The discovery cache entry for `target` is
    /// invalidated so the next analysis sees the new worktree.
    pub fn create(
        &self,
        project_path: &Path,
        branch: &str,
        target: &Path,
        cancel: &CancelToken,
    ) -> Result<CreateOutcome> {
        if project_path.as_os_str().is_empty() {
            return Err(Error::validation("Project path is empty")
                .with_suggestion("Provide a valid project path"));
        }

        validate_worktree_creation(branch, target, self.fs.as_ref()).into_result()?;

        match self.git.is_git_repository(project_path, cancel) {
            Ok(true) => {}
            Ok(false) => return Err(Error::not_repository(project_path)),
            Err(e) if e.kind() == ErrorKind::Cancelled => return Err(e),
            Err(e) => return Err(Error::not_repository(project_path).with_source(e)),
        }

        // Advisory only: reported to the caller, never a gate.
        let branch_existed = self
            .git
            .branch_exists(project_path, branch, cancel)
            .unwrap_or_else(|e| {
                log::warn!("could not check whether branch {branch} exists: {}", e.message());
                false
            });

        self.git
            .create_worktree(project_path, branch, target, cancel)?;

        if let Err(e) = self.hook.setup_worktree(project_path, target, cancel) {
            log::warn!(
                "environment setup failed in {}: {}",
                target.display(),
                e.message()
            );
        }

        self.engine.invalidate(target);

        Ok(CreateOutcome {
            target: target.to_path_buf(),
            branch_existed,
        })
    }

    /// Like [`create`](Self::create), but when the target is invalid or not
    /// writable, probe alternative targets derived from the branch and
    /// project names and retry with the first viable one. If no alternative
    /// is viable (or the retry fails), the *original* error is returned.
    pub fn create_with_fallback(
        &self,
        project_path: &Path,
        branch: &str,
        target: &Path,
        cancel: &CancelToken,
    ) -> Result<CreateOutcome> {
        let original = match self.create(project_path, branch, target, cancel) {
            Ok(outcome) => return Ok(outcome),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::InvalidPath | ErrorKind::PathNotWritable
                ) =>
            {
                e
            }
            Err(e) => return Err(e),
        };

        for candidate in candidate_targets(project_path, branch, target) {
            if self.fs.exists(&candidate) {
                continue;
            }
            let viable = candidate
                .parent()
                .map(|parent| self.fs.exists(parent) && self.fs.is_writable(parent))
                .unwrap_or(false);
            if !viable {
                continue;
            }

            log::debug!(
                "retrying worktree creation at fallback target {}",
                candidate.display()
            );
            return match self.create(project_path, branch, &candidate, cancel) {
                Ok(outcome) => Ok(outcome),
                Err(retry) => {
                    log::warn!("fallback target also failed: {}", retry.message());
                    Err(original)
                }
            };
        }

        Err(original)
    }
}

/// Alternative targets tried when the requested one is unusable: the
/// sanitized branch name, the project-prefixed form, and the branch
/// basename, all as siblings of the original target.
fn candidate_targets(project_path: &Path, branch: &str, target: &Path) -> Vec<PathBuf> {
    let Some(parent) = target.parent() else {
        return Vec::new();
    };

    let sanitized = sanitize_filename::sanitize(branch.replace('/', "-"));
    let project_name = project_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("worktree");
    let basename = branch.rsplit('/').next().unwrap_or(branch);

    let mut candidates = vec![
        parent.join(&sanitized),
        parent.join(format!("{project_name}-{sanitized}")),
        parent.join(sanitize_filename::sanitize(basename)),
    ];
    candidates.retain(|c| c != target && !c.as_os_str().is_empty());
    candidates.dedup();
    candidates
}

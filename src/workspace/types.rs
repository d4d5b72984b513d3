//! Domain entities: projects and their worktrees.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::git::WorktreeInfo;

/// Working-tree cleanliness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, serde::Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorktreeStatus {
    Clean,
    Dirty,
}

/// A git linked working tree (or the main working tree) with exactly one
/// branch checkout.
///
/// `last_updated` is the checked-out commit's timestamp, never the
/// observation time, so repeated analyses of unchanged git state produce
/// identical values.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Worktree {
    pub path: PathBuf,
    pub branch: String,
    pub commit: String,
    pub status: WorktreeStatus,
    pub last_updated: DateTime<Utc>,
}

impl TryFrom<WorktreeInfo> for Worktree {
    type Error = Error;

    fn try_from(info: WorktreeInfo) -> Result<Self> {
        if info.path.as_os_str().is_empty() {
            return Err(Error::validation("Worktree path is empty"));
        }
        if info.bare {
            return Err(Error::validation(format!(
                "{} is a bare repository, not a worktree",
                crate::path::format_path_for_display(&info.path)
            ))
            .with_path(info.path));
        }
        if !info.path.is_absolute() {
            return Err(Error::invalid_path(&info.path, "worktree path is not absolute"));
        }

        let branch = match info.branch.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(Error::validation(format!(
                    "Worktree {} has no branch (detached HEAD)",
                    crate::path::format_path_for_display(&info.path)
                ))
                .with_path(info.path)
                .with_suggestion("Check out a branch in the worktree"));
            }
        };

        let last_updated = DateTime::from_timestamp(info.commit_time, 0).ok_or_else(|| {
            Error::validation(format!(
                "Commit timestamp {} is out of range",
                info.commit_time
            ))
        })?;

        Ok(Worktree {
            path: info.path,
            branch,
            commit: info.commit,
            status: if info.clean {
                WorktreeStatus::Clean
            } else {
                WorktreeStatus::Dirty
            },
            last_updated,
        })
    }
}

/// A directory containing a non-bare main git repository, treated as a unit
/// of user work. Owns the worktrees discovered under the workspaces root.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Project {
    pub name: String,
    pub git_repo_path: PathBuf,
    pub worktrees: Vec<Worktree>,
}

impl Project {
    pub fn new(name: impl Into<String>, git_repo_path: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        let git_repo_path = git_repo_path.into();

        if name.is_empty() {
            return Err(Error::validation("Project name is empty"));
        }
        if !git_repo_path.is_absolute() {
            return Err(Error::invalid_path(
                &git_repo_path,
                "project repository path is not absolute",
            ));
        }

        Ok(Project {
            name,
            git_repo_path,
            worktrees: Vec::new(),
        })
    }

    /// Derive the project name from a directory path.
    pub fn name_from_path(path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }
}

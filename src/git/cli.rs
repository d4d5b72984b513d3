//! Subprocess implementation of the git capability.
//!
//! Shells out to the `git` binary through [`Cmd`], one short-lived process
//! per operation. Worktree enumeration batches the commit-time lookup into a
//! single `git show` call so listing stays O(worktrees) processes, not
//! O(worktrees * fields).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Output;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result};
use crate::shell_exec::{Cmd, path_to_logging_context};

use super::parse::{parse_commit_line, parse_porcelain_list};
use super::{GitCapability, WorktreeInfo};

/// Git capability backed by the `git` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliGit;

impl CliGit {
    pub fn new() -> Self {
        CliGit
    }

    fn run_git_output(&self, dir: &Path, args: &[&str], cancel: &CancelToken) -> Result<Output> {
        cancel.check()?;
        Cmd::new("git")
            .args(args.iter().copied())
            .current_dir(dir)
            .context(path_to_logging_context(dir))
            .run(cancel)
            .map_err(|e| Error::git_command(format!("{e:#}")))
    }

    /// Run a git command and return stdout, joining stderr and stdout into
    /// the error message on non-zero exit.
    fn run_git(&self, dir: &Path, args: &[&str], cancel: &CancelToken) -> Result<String> {
        let output = self.run_git_output(dir, args, cancel)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.replace('\r', "\n");
            let stdout = String::from_utf8_lossy(&output.stdout);
            let error_msg = [stderr.trim(), stdout.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::git_command(format!(
                "git {} failed: {error_msg}",
                args.join(" ")
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn is_clean(&self, worktree_path: &Path, cancel: &CancelToken) -> Result<bool> {
        let stdout = self.run_git(worktree_path, &["status", "--porcelain"], cancel)?;
        Ok(stdout.trim().is_empty())
    }

    /// Batched `<sha> -> commit time` lookup for a set of heads.
    fn commit_times(
        &self,
        repo_root: &Path,
        heads: &[&str],
        cancel: &CancelToken,
    ) -> Result<HashMap<String, i64>> {
        if heads.is_empty() {
            return Ok(HashMap::new());
        }
        let mut args = vec!["show", "-s", "--format=%H %ct"];
        args.extend(heads.iter().copied());
        let stdout = self.run_git(repo_root, &args, cancel)?;

        let mut times = HashMap::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let (sha, time) = parse_commit_line(line)?;
            times.insert(sha, time);
        }
        Ok(times)
    }
}

impl GitCapability for CliGit {
    fn is_git_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        if !path.is_dir() {
            return Ok(false);
        }
        let output = self.run_git_output(
            path,
            &["rev-parse", "--is-inside-work-tree", "--is-inside-git-dir"],
            cancel,
        )?;
        if !output.status.success() {
            return Ok(false);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().any(|line| line.trim() == "true"))
    }

    fn is_main_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        if !self.is_git_repository(path, cancel)? || self.is_bare_repository(path, cancel)? {
            return Ok(false);
        }

        // A linked worktree's git dir lives under <main>/.git/worktrees/<name>,
        // so it differs from the common dir; in the main worktree they agree.
        let stdout = self.run_git(path, &["rev-parse", "--git-dir", "--git-common-dir"], cancel)?;
        let mut lines = stdout.lines();
        let (Some(git_dir), Some(common_dir)) = (lines.next(), lines.next()) else {
            return Err(Error::git_command(format!(
                "unexpected rev-parse output: {stdout:?}"
            )));
        };

        let resolve = |raw: &str| -> PathBuf {
            let p = Path::new(raw);
            let joined = if p.is_absolute() {
                p.to_path_buf()
            } else {
                path.join(p)
            };
            dunce::canonicalize(&joined).unwrap_or(joined)
        };

        Ok(resolve(git_dir) == resolve(common_dir))
    }

    fn is_bare_repository(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        let output = self.run_git_output(path, &["rev-parse", "--is-bare-repository"], cancel)?;
        if !output.status.success() {
            return Ok(false);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    fn get_repository_root(&self, path: &Path, cancel: &CancelToken) -> Result<PathBuf> {
        let stdout = self
            .run_git(path, &["rev-parse", "--show-toplevel"], cancel)
            .map_err(|e| match e.kind() {
                ErrorKind::Cancelled => e,
                _ => Error::not_repository(path).with_source(e),
            })?;
        let root = PathBuf::from(stdout.trim());
        Ok(dunce::canonicalize(&root).unwrap_or(root))
    }

    fn list_worktrees(&self, repo_root: &Path, cancel: &CancelToken) -> Result<Vec<WorktreeInfo>> {
        let stdout = self.run_git(repo_root, &["worktree", "list", "--porcelain"], cancel)?;
        let entries = parse_porcelain_list(&stdout)?;

        let heads: Vec<&str> = entries
            .iter()
            .filter(|e| !e.bare && !e.head.is_empty())
            .map(|e| e.head.as_str())
            .collect();
        let times = self.commit_times(repo_root, &heads, cancel)?;

        let mut worktrees = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.bare {
                worktrees.push(WorktreeInfo {
                    path: entry.path,
                    branch: None,
                    commit: entry.head,
                    clean: true,
                    commit_time: 0,
                    bare: true,
                });
                continue;
            }

            let clean = self.is_clean(&entry.path, cancel)?;
            let commit_time = times.get(&entry.head).copied().unwrap_or(0);
            worktrees.push(WorktreeInfo {
                path: entry.path,
                branch: entry.branch,
                commit: entry.head,
                clean,
                commit_time,
                bare: false,
            });
        }
        Ok(worktrees)
    }

    fn get_worktree_status(
        &self,
        worktree_path: &Path,
        cancel: &CancelToken,
    ) -> Result<WorktreeInfo> {
        let branch_out = self.run_git(worktree_path, &["branch", "--show-current"], cancel)?;
        let branch = match branch_out.trim() {
            "" => None,
            name => Some(name.to_string()),
        };

        let commit_out = self.run_git(worktree_path, &["show", "-s", "--format=%H %ct", "HEAD"], cancel)?;
        let (commit, commit_time) = parse_commit_line(
            commit_out
                .lines()
                .find(|l| !l.trim().is_empty())
                .unwrap_or(""),
        )?;

        let clean = self.is_clean(worktree_path, cancel)?;

        Ok(WorktreeInfo {
            path: dunce::canonicalize(worktree_path).unwrap_or_else(|_| worktree_path.to_path_buf()),
            branch,
            commit,
            clean,
            commit_time,
            bare: false,
        })
    }

    fn has_uncommitted_changes(&self, worktree_path: &Path, cancel: &CancelToken) -> Result<bool> {
        Ok(!self.is_clean(worktree_path, cancel)?)
    }

    fn branch_exists(&self, repo: &Path, branch: &str, cancel: &CancelToken) -> Result<bool> {
        let ref_name = format!("refs/heads/{branch}");
        let output =
            self.run_git_output(repo, &["show-ref", "--verify", "--quiet", &ref_name], cancel)?;
        Ok(output.status.success())
    }

    fn get_current_branch(&self, worktree_path: &Path, cancel: &CancelToken) -> Result<String> {
        let stdout = self.run_git(worktree_path, &["branch", "--show-current"], cancel)?;
        let branch = stdout.trim();
        if branch.is_empty() {
            return Err(Error::git_command(format!(
                "Not on a branch (detached HEAD) in {}",
                crate::path::format_path_for_display(worktree_path)
            ))
            .with_suggestion("Check out a branch before operating on this worktree"));
        }
        Ok(branch.to_string())
    }

    fn create_worktree(
        &self,
        repo: &Path,
        branch: &str,
        target: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        let target_str = target.to_str().ok_or_else(|| {
            Error::git_command(format!(
                "Worktree path contains invalid UTF-8: {}",
                crate::path::format_path_for_display(target)
            ))
        })?;

        if self.branch_exists(repo, branch, cancel)? {
            self.run_git(repo, &["worktree", "add", target_str, branch], cancel)?;
        } else {
            self.run_git(repo, &["worktree", "add", "-b", branch, target_str], cancel)?;
        }
        Ok(())
    }

    fn remove_worktree(
        &self,
        repo: &Path,
        worktree_path: &Path,
        force: bool,
        cancel: &CancelToken,
    ) -> Result<()> {
        let path_str = worktree_path.to_str().ok_or_else(|| {
            Error::git_command(format!(
                "Worktree path contains invalid UTF-8: {}",
                crate::path::format_path_for_display(worktree_path)
            ))
        })?;

        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(path_str);
        self.run_git(repo, &args, cancel)?;
        Ok(())
    }

    fn delete_branch(&self, repo: &Path, branch: &str, cancel: &CancelToken) -> Result<()> {
        self.run_git(repo, &["branch", "-D", branch], cancel)?;
        Ok(())
    }
}

//! Git output parsing functions.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// One entry of `git worktree list --porcelain`, before status enrichment.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PorcelainWorktree {
    pub path: PathBuf,
    pub head: String,
    pub branch: Option<String>,
    pub bare: bool,
    pub detached: bool,
}

/// Parse `git worktree list --porcelain` output.
///
/// The format is keyed lines per worktree, blank-line separated:
///
/// ```text
/// worktree /path/to/main
/// HEAD 1234abcd...
/// branch refs/heads/main
///
/// worktree /path/to/bare
/// bare
/// ```
pub(super) fn parse_porcelain_list(output: &str) -> Result<Vec<PorcelainWorktree>> {
    let mut worktrees = Vec::new();
    let mut current: Option<PorcelainWorktree> = None;

    for line in output.lines() {
        if line.is_empty() {
            if let Some(wt) = current.take() {
                worktrees.push(wt);
            }
            continue;
        }

        let (key, value) = match line.split_once(' ') {
            Some((k, v)) => (k, Some(v)),
            None => (line, None),
        };

        match key {
            "worktree" => {
                if let Some(wt) = current.take() {
                    worktrees.push(wt);
                }
                let path = value
                    .ok_or_else(|| Error::git_command("worktree line missing path in porcelain output"))?;
                current = Some(PorcelainWorktree {
                    path: PathBuf::from(path),
                    head: String::new(),
                    branch: None,
                    bare: false,
                    detached: false,
                });
            }
            key => match (key, current.as_mut()) {
                ("HEAD", Some(wt)) => {
                    wt.head = value
                        .ok_or_else(|| Error::git_command("HEAD line missing SHA in porcelain output"))?
                        .to_string();
                }
                ("branch", Some(wt)) => {
                    let branch_ref = value.ok_or_else(|| {
                        Error::git_command("branch line missing ref in porcelain output")
                    })?;
                    // Strip refs/heads/ prefix if present
                    let branch = branch_ref
                        .strip_prefix("refs/heads/")
                        .unwrap_or(branch_ref)
                        .to_string();
                    wt.branch = Some(branch);
                }
                ("bare", Some(wt)) => {
                    wt.bare = true;
                }
                ("detached", Some(wt)) => {
                    wt.detached = true;
                }
                // locked/prunable annotations and future keys are ignored
                _ => {}
            },
        }
    }

    if let Some(wt) = current.take() {
        worktrees.push(wt);
    }

    Ok(worktrees)
}

/// Parse one `<sha> <unix-time>` line of `git show -s --format=%H %ct`.
pub(super) fn parse_commit_line(line: &str) -> Result<(String, i64)> {
    let (sha, time) = line
        .trim()
        .split_once(' ')
        .ok_or_else(|| Error::git_command(format!("malformed commit line: {line:?}")))?;
    let commit_time = time
        .parse::<i64>()
        .map_err(|e| Error::git_command(format!("malformed commit time: {line:?}")).with_source(e))?;
    Ok((sha.to_string(), commit_time))
}

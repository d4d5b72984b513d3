//! Environment-setup hook.
//!
//! After a worktree is created, grove gives a language-version/env tool a
//! chance to prepare the new directory (install toolchains, trust config).
//! The hook is strictly best-effort: failures are logged and swallowed, and
//! creation succeeds regardless.

use std::path::Path;

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::shell_exec::{Cmd, path_to_logging_context};

/// Post-create callback into an environment tool.
pub trait SetupHook: Send + Sync {
    fn setup_worktree(
        &self,
        project_path: &Path,
        worktree_path: &Path,
        cancel: &CancelToken,
    ) -> Result<()>;
}

/// Runs `mise install` in the new worktree so pinned tool versions are ready.
#[derive(Debug, Default, Clone, Copy)]
pub struct MiseHook;

impl MiseHook {
    pub fn new() -> Self {
        MiseHook
    }
}

impl SetupHook for MiseHook {
    fn setup_worktree(
        &self,
        _project_path: &Path,
        worktree_path: &Path,
        cancel: &CancelToken,
    ) -> Result<()> {
        let output = Cmd::new("mise")
            .arg("install")
            .current_dir(worktree_path)
            .context(path_to_logging_context(worktree_path))
            .run(cancel)
            .map_err(|e| Error::git_command(format!("{e:#}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git_command(format!(
                "mise install failed: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Hook that does nothing; used when no environment tool is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl SetupHook for NoopHook {
    fn setup_worktree(&self, _: &Path, _: &Path, _: &CancelToken) -> Result<()> {
        Ok(())
    }
}

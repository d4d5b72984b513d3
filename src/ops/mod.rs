//! Worktree lifecycle operations.
//!
//! [`WorktreeCreator`] and [`WorktreeRemover`] compose the validator, the
//! filesystem probe, and the git capability into the two mutating flows.
//! Both run single-threaded; the capability's mutating operations are never
//! called concurrently on the same repository.

mod create;
mod remove;

pub use create::{CreateOutcome, WorktreeCreator};
pub use remove::{RemoveOutcome, WorktreeRemover};

use std::path::Path;

use normalize_path::NormalizePath;

use crate::error::{Error, Result};
use crate::path::absolutize;

/// Refuse to operate on the process's own working directory.
///
/// Comparison is by normalized absolute path; symlinks are deliberately not
/// resolved, matching how shells report the current directory.
pub fn ensure_not_current_dir(path: &Path) -> Result<()> {
    let Ok(cwd) = std::env::current_dir() else {
        // No current directory (deleted underneath us): nothing to protect.
        return Ok(());
    };

    if absolutize(path).normalize() == cwd.normalize() {
        return Err(Error::current_directory(path));
    }
    Ok(())
}

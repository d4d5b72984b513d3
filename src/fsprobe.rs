//! Filesystem probing behind a capability seam.
//!
//! The discovery engine and the validators only need a handful of filesystem
//! questions; putting them behind [`Filesystem`] keeps those components
//! testable without a real directory tree and mirrors how the git layer is
//! injected.

use std::io;
use std::path::{Path, PathBuf};

/// The filesystem operations the core consumes.
pub trait Filesystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of a directory, in no particular order.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Whether the current process can create entries inside `path`.
    fn is_writable(&self, path: &Path) -> bool;
}

/// Probe the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl OsFilesystem {
    pub fn new() -> Self {
        OsFilesystem
    }
}

impl Filesystem for OsFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.path());
        }
        Ok(entries)
    }

    fn is_writable(&self, path: &Path) -> bool {
        // An actual write attempt is the only check that agrees with every
        // combination of permission bits, ACLs, and read-only mounts.
        path.is_dir() && tempfile::tempfile_in(path).is_ok()
    }
}

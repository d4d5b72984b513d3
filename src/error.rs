//! Error types and formatting.
//!
//! Every fallible operation in grove returns [`Error`]: a structured record
//! carrying a [`ErrorKind`] discriminant, a user-facing message, the path the
//! operation was acting on, an optional wrapped cause, and a one-line
//! actionable suggestion. The suggestion renders as a dimmed hint below the
//! message, the cause is reachable through [`std::error::Error::source`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::path::format_path_for_display;
use crate::styling::{ERROR, ERROR_BOLD, ERROR_EMOJI, HINT, HINT_EMOJI};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of every error grove can surface.
///
/// Each kind maps to a stable process exit code, so scripts can branch on
/// failure modes without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, serde::Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Caller-provided input violates a rule (empty, malformed).
    Validation,
    /// Branch name fails git's ref format.
    InvalidBranchName,
    /// Path is empty, relative, or contains forbidden sequences.
    InvalidPath,
    /// Path exists, or its parent is missing or not writable.
    PathNotWritable,
    /// A path was expected to be a git repo and is not.
    NotRepository,
    /// Operation references a worktree that does not exist.
    WorktreeNotFound,
    /// Refusal to act on the process's own working directory.
    CurrentDirectory,
    /// Safety refusal on non-forced remove.
    UncommittedChanges,
    /// A git invocation returned an error.
    GitCommand,
    /// Both primary and fallback project discovery failed.
    WorkspaceDiscoveryFailed,
    /// The operation was cancelled cooperatively (Ctrl-C, deadline).
    Cancelled,
}

impl ErrorKind {
    /// Process exit code for this kind. Success is 0, unexpected failures 1.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Validation => 2,
            ErrorKind::InvalidBranchName => 3,
            ErrorKind::InvalidPath => 4,
            ErrorKind::PathNotWritable => 5,
            ErrorKind::NotRepository => 6,
            ErrorKind::WorktreeNotFound => 7,
            ErrorKind::CurrentDirectory => 8,
            ErrorKind::UncommittedChanges => 9,
            ErrorKind::GitCommand => 10,
            ErrorKind::WorkspaceDiscoveryFailed => 11,
            ErrorKind::Cancelled => 130,
        }
    }
}

/// Structured error: kind + message + path + wrapped cause + suggestion.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    path: Option<PathBuf>,
    suggestion: Option<String>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
            path: None,
            suggestion: None,
            source: None,
        }
    }

    /// Attach the path the operation was acting on.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Replace the default suggestion with a more specific one.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the underlying cause (preserved through `source()`).
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    // ========================================================================
    // Constructors, one per kind, each with a default actionable suggestion
    // ========================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::Validation, message)
            .with_suggestion("Check the command arguments and try again")
    }

    pub fn invalid_branch_name(branch: &str, reason: impl Into<String>) -> Self {
        Error::new(
            ErrorKind::InvalidBranchName,
            format!(
                "Invalid branch name {ERROR_BOLD}{branch}{ERROR_BOLD:#}: {}",
                reason.into()
            ),
        )
        .with_suggestion("Use a name accepted by 'git check-ref-format --branch'")
    }

    pub fn invalid_path(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::InvalidPath,
            format!(
                "Invalid path {ERROR_BOLD}{}{ERROR_BOLD:#}: {}",
                format_path_for_display(&path),
                reason.into()
            ),
        )
        .with_path(path)
        .with_suggestion("Provide an absolute path without '..' segments")
    }

    pub fn path_not_writable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::PathNotWritable,
            format!(
                "Cannot create {ERROR_BOLD}{}{ERROR_BOLD:#}: {}",
                format_path_for_display(&path),
                reason.into()
            ),
        )
        .with_path(path)
        .with_suggestion("Choose a target inside an existing writable directory")
    }

    pub fn not_repository(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::NotRepository,
            format!(
                "{ERROR_BOLD}{}{ERROR_BOLD:#} is not a git repository",
                format_path_for_display(&path)
            ),
        )
        .with_path(path)
        .with_suggestion("Provide a path inside a git repository")
    }

    pub fn worktree_not_found(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::WorktreeNotFound,
            format!(
                "No worktree found at {ERROR_BOLD}{}{ERROR_BOLD:#}",
                format_path_for_display(&path)
            ),
        )
        .with_path(path)
        .with_suggestion("Run 'gv list' to see known worktrees")
    }

    pub fn current_directory(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::CurrentDirectory,
            format!(
                "Refusing to remove the current directory {ERROR_BOLD}{}{ERROR_BOLD:#}",
                format_path_for_display(&path)
            ),
        )
        .with_path(path)
        .with_suggestion("Change to a different directory first")
    }

    pub fn uncommitted_changes(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Error::new(
            ErrorKind::UncommittedChanges,
            format!(
                "Worktree {ERROR_BOLD}{}{ERROR_BOLD:#} has uncommitted changes",
                format_path_for_display(&path)
            ),
        )
        .with_path(path)
        .with_suggestion("Commit or stash them, or use --force to discard")
    }

    pub fn git_command(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::GitCommand, message)
            .with_suggestion("Run with --verbose to see the failing git command")
    }

    pub fn discovery_failed(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::WorkspaceDiscoveryFailed, message)
            .with_suggestion("Check the configured projects and workspaces paths")
    }

    pub fn cancelled() -> Self {
        Error::new(ErrorKind::Cancelled, "Operation cancelled")
            .with_suggestion("Re-run the command to try again")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ERROR_EMOJI} {ERROR}{}{ERROR:#}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n\n{HINT_EMOJI} {HINT}{suggestion}{HINT:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// Spawn failures and other I/O surface as GitCommand: in practice they come
// from the subprocess layer, and the cause is preserved for diagnostics.
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::git_command(e.to_string()).with_source(e)
    }
}

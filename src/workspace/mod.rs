//! Workspace model and discovery.
//!
//! A workspace is two directory roots: a *projects* root whose immediate
//! children are main git repositories, and a *workspaces* root holding
//! per-project worktree directories. [`DiscoveryEngine`] scans both,
//! [`CurrentWorktreeDetector`] answers where the user currently is.

mod cache;
mod detect;
mod discover;
mod types;

pub use detect::CurrentWorktreeDetector;
pub use discover::{DEFAULT_CACHE_TTL, DEFAULT_CONCURRENCY, DiscoveryEngine};
pub use types::{Project, Worktree, WorktreeStatus};

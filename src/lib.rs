//! Git worktree workspace management.
//!
//! Grove treats a collection of git repositories ("projects") and their
//! auxiliary working trees ("worktrees") as one unified workspace and
//! provides safe, concurrent lifecycle operations over them. The `gv` CLI
//! is a thin layer over this library.
//!
//! The library API is not stable. If you're building tooling on top of
//! grove, please open an issue to discuss your use case.

pub mod cancel;
pub mod config;
pub mod error;
pub mod fsprobe;
pub mod git;
pub mod hook;
pub mod ops;
pub mod path;
pub mod shell_exec;
pub mod styling;
pub mod util;
pub mod validate;
pub mod workspace;

// Re-export the types nearly every consumer touches
pub use cancel::CancelToken;
pub use config::Config;
pub use error::{Error, ErrorKind, Result};

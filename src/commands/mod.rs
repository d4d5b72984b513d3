//! Command handlers for the `gv` binary.

mod create;
mod current;
mod list;
mod remove;

pub use create::handle_create;
pub use current::handle_current;
pub use list::handle_list;
pub use remove::handle_remove;

use std::sync::Arc;

use grove::cancel::CancelToken;
use grove::config::Config;
use grove::fsprobe::{Filesystem, OsFilesystem};
use grove::git::{CliGit, GitCapability};
use grove::hook::{MiseHook, SetupHook};
use grove::ops::{WorktreeCreator, WorktreeRemover};
use grove::path::PathResolver;
use grove::workspace::{CurrentWorktreeDetector, DiscoveryEngine};

/// Composition root: every collaborator wired once, shared by the handlers.
pub struct App {
    pub config: Config,
    pub resolver: PathResolver,
    pub engine: Arc<DiscoveryEngine>,
    pub creator: WorktreeCreator,
    pub remover: WorktreeRemover,
    pub detector: CurrentWorktreeDetector,
    pub cancel: CancelToken,
}

impl App {
    pub fn new(config: Config, cancel: CancelToken) -> Self {
        let git: Arc<dyn GitCapability> = Arc::new(CliGit::new());
        let fs: Arc<dyn Filesystem> = Arc::new(OsFilesystem::new());
        let hook: Arc<dyn SetupHook> = Arc::new(MiseHook::new());

        let engine = Arc::new(DiscoveryEngine::new(Arc::clone(&git), Arc::clone(&fs)));
        let creator = WorktreeCreator::new(
            Arc::clone(&git),
            Arc::clone(&fs),
            hook,
            Arc::clone(&engine),
        );
        let remover = WorktreeRemover::new(Arc::clone(&git), Arc::clone(&engine));
        let detector = CurrentWorktreeDetector::new(Arc::clone(&git));

        App {
            resolver: PathResolver::new(&config),
            config,
            engine,
            creator,
            remover,
            detector,
            cancel,
        }
    }
}

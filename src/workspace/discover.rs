//! Workspace discovery engine.
//!
//! Scans the two-level layout (a projects root holding main repositories,
//! and a workspaces root holding per-project worktree directories),
//! classifying each directory through the git capability. Candidate worktrees are
//! analyzed concurrently by a fixed-size worker pool, and analyses are
//! cached for a bounded time so repeated listings stay cheap.
//!
//! Discovery tolerates partial failure: individual entries that cannot be
//! classified are logged and skipped, and only a majority of failed analyses
//! aborts a scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crossbeam_channel::bounded;

use crate::cancel::CancelToken;
use crate::error::{Error, ErrorKind, Result};
use crate::fsprobe::Filesystem;
use crate::git::GitCapability;
use crate::path::{absolutize, format_path_for_display};

use super::cache::AnalysisCache;
use super::types::{Project, Worktree};

/// How long a worktree analysis stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Worker threads used for concurrent analysis.
pub const DEFAULT_CONCURRENCY: usize = 4;

const MAX_CONCURRENCY: usize = 16;

/// Classifies directories and analyzes worktrees; owns the analysis cache.
pub struct DiscoveryEngine {
    git: Arc<dyn GitCapability>,
    fs: Arc<dyn Filesystem>,
    cache: AnalysisCache,
    concurrency: AtomicUsize,
}

impl DiscoveryEngine {
    pub fn new(git: Arc<dyn GitCapability>, fs: Arc<dyn Filesystem>) -> Self {
        Self::with_cache_ttl(git, fs, DEFAULT_CACHE_TTL)
    }

    pub fn with_cache_ttl(
        git: Arc<dyn GitCapability>,
        fs: Arc<dyn Filesystem>,
        ttl: Duration,
    ) -> Self {
        DiscoveryEngine {
            git,
            fs,
            cache: AnalysisCache::new(ttl),
            concurrency: AtomicUsize::new(DEFAULT_CONCURRENCY),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.load(Ordering::Relaxed)
    }

    /// Set the worker count, clamped to `[1, 16]`. Zero leaves the value
    /// unchanged. Not meant to be called while a discovery is running.
    pub fn set_concurrency(&self, workers: usize) {
        if workers == 0 {
            return;
        }
        self.concurrency
            .store(workers.clamp(1, MAX_CONCURRENCY), Ordering::Relaxed);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop the cached analysis for one path, if any. Called after a
    /// successful create or remove on that path.
    pub fn invalidate(&self, path: &Path) {
        self.cache.invalidate(path);
    }

    /// Enumerate main repositories directly under the projects root.
    ///
    /// A missing root yields an empty list. Entries the capability cannot
    /// classify are logged and skipped; they never abort the enumeration.
    pub fn discover_projects(
        &self,
        projects_path: &Path,
        cancel: &CancelToken,
    ) -> Result<Vec<Project>> {
        self.discover_projects_with(
            projects_path,
            |path, cancel| self.git.is_main_repository(path, cancel),
            cancel,
        )
    }

    /// Like [`discover_projects`](Self::discover_projects), but when the
    /// primary scan errors, retry accepting any git directory. If both
    /// fail, surface the original error wrapped as a discovery failure.
    pub fn discover_projects_with_fallback(
        &self,
        projects_path: &Path,
        cancel: &CancelToken,
    ) -> Result<Vec<Project>> {
        let original = match self.discover_projects(projects_path, cancel) {
            Ok(projects) => return Ok(projects),
            Err(e) if e.kind() == ErrorKind::Cancelled => return Err(e),
            Err(e) => e,
        };

        log::warn!(
            "project discovery failed, retrying with relaxed classifier: {}",
            original.message()
        );

        match self.discover_projects_with(
            projects_path,
            |path, cancel| self.git.is_git_repository(path, cancel),
            cancel,
        ) {
            Ok(projects) => Ok(projects),
            Err(e) if e.kind() == ErrorKind::Cancelled => Err(e),
            Err(fallback) => {
                log::warn!("fallback discovery also failed: {}", fallback.message());
                Err(Error::discovery_failed(format!(
                    "Project discovery failed under {}",
                    format_path_for_display(projects_path)
                ))
                .with_path(projects_path)
                .with_source(original))
            }
        }
    }

    fn discover_projects_with<F>(
        &self,
        projects_path: &Path,
        classify: F,
        cancel: &CancelToken,
    ) -> Result<Vec<Project>>
    where
        F: Fn(&Path, &CancelToken) -> Result<bool>,
    {
        if !self.fs.exists(projects_path) {
            return Ok(Vec::new());
        }

        let entries = self.fs.read_dir(projects_path).map_err(|e| {
            Error::discovery_failed(format!(
                "Cannot read projects root {}: {e}",
                format_path_for_display(projects_path)
            ))
            .with_path(projects_path)
            .with_source(e)
        })?;

        let mut projects = Vec::new();
        for entry in entries {
            cancel.check()?;
            if !self.fs.is_dir(&entry) {
                continue;
            }

            let absolute = absolutize(&entry);
            match classify(&absolute, cancel) {
                Ok(true) => {
                    let Some(name) = Project::name_from_path(&absolute) else {
                        log::warn!("skipping unnamed directory {}", absolute.display());
                        continue;
                    };
                    match Project::new(name, absolute) {
                        Ok(project) => projects.push(project),
                        Err(e) => log::warn!("skipping {}: {}", entry.display(), e.message()),
                    }
                }
                Ok(false) => {}
                Err(e) if e.kind() == ErrorKind::Cancelled => return Err(e),
                Err(e) => {
                    log::warn!("skipping {}: {}", entry.display(), e.message());
                }
            }
        }
        Ok(projects)
    }

    /// Enumerate worktrees under the workspaces root.
    ///
    /// Each immediate child is a project directory; the directory itself and
    /// each of its children may be a (non-bare) worktree. Candidates are
    /// analyzed concurrently; output order is unspecified.
    pub fn discover_worktrees(
        &self,
        workspaces_path: &Path,
        cancel: &CancelToken,
    ) -> Result<Vec<Worktree>> {
        if !self.fs.exists(workspaces_path) {
            return Ok(Vec::new());
        }

        let project_dirs = self.fs.read_dir(workspaces_path).map_err(|e| {
            Error::discovery_failed(format!(
                "Cannot read workspaces root {}: {e}",
                format_path_for_display(workspaces_path)
            ))
            .with_path(workspaces_path)
            .with_source(e)
        })?;

        let mut candidates = Vec::new();
        for project_dir in project_dirs {
            cancel.check()?;
            if !self.fs.is_dir(&project_dir) {
                continue;
            }

            if self.is_worktree_candidate(&project_dir, cancel)? {
                candidates.push(project_dir.clone());
            }

            let children = match self.fs.read_dir(&project_dir) {
                Ok(children) => children,
                Err(e) => {
                    log::warn!("skipping {}: {e}", project_dir.display());
                    continue;
                }
            };
            for child in children {
                cancel.check()?;
                if !self.fs.is_dir(&child) {
                    continue;
                }
                if self.is_worktree_candidate(&child, cancel)? {
                    candidates.push(child);
                }
            }
        }

        self.analyze_candidates(candidates, cancel)
    }

    /// A candidate is any non-bare git directory. Classification errors are
    /// logged and treated as "not a candidate".
    fn is_worktree_candidate(&self, path: &Path, cancel: &CancelToken) -> Result<bool> {
        let is_repo = match self.git.is_git_repository(path, cancel) {
            Ok(value) => value,
            Err(e) if e.kind() == ErrorKind::Cancelled => return Err(e),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e.message());
                return Ok(false);
            }
        };
        if !is_repo {
            return Ok(false);
        }

        match self.git.is_bare_repository(path, cancel) {
            Ok(bare) => Ok(!bare),
            Err(e) if e.kind() == ErrorKind::Cancelled => Err(e),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e.message());
                Ok(false)
            }
        }
    }

    /// Analyze one candidate path, consulting the cache first.
    ///
    /// Cache entries are keyed by the path exactly as supplied here, and a
    /// fresh analysis is stored under that same key. Cancelled analyses are
    /// never cached.
    pub fn analyze_worktree(&self, path: &Path, cancel: &CancelToken) -> Result<Worktree> {
        if path.as_os_str().is_empty() {
            return Err(
                Error::validation("Worktree path is empty")
                    .with_suggestion("Provide a worktree path"),
            );
        }

        if let Some(hit) = self.cache.get(path) {
            return Ok(hit);
        }

        cancel.check()?;
        let absolute = absolutize(path);
        let info = self.git.get_worktree_status(&absolute, cancel)?;
        let worktree = Worktree::try_from(info)?;

        cancel.check()?;
        self.cache.insert(path.to_path_buf(), worktree.clone());
        Ok(worktree)
    }

    /// Fan candidates out over the worker pool and collect the results.
    ///
    /// Workers pull from a bounded channel sized to the input and emit into
    /// result/error channels of the same capacity, so no send ever blocks.
    /// Joining happens via the thread scope; the collector then drains both
    /// channels, tolerating close in either order.
    fn analyze_candidates(
        &self,
        candidates: Vec<PathBuf>,
        cancel: &CancelToken,
    ) -> Result<Vec<Worktree>> {
        let total = candidates.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.concurrency().min(total).max(1);
        let (path_tx, path_rx) = bounded::<PathBuf>(total);
        let (result_tx, result_rx) = bounded::<Worktree>(total);
        let (error_tx, error_rx) = bounded::<Error>(total);

        for candidate in candidates {
            // Capacity equals the input length; these sends cannot block.
            path_tx.send(candidate).expect("candidate channel full");
        }
        drop(path_tx);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let path_rx = path_rx.clone();
                let result_tx = result_tx.clone();
                let error_tx = error_tx.clone();
                let cancel = cancel.clone();
                scope.spawn(move || {
                    while let Ok(path) = path_rx.recv() {
                        if cancel.is_cancelled() {
                            let _ = error_tx.send(Error::cancelled());
                            break;
                        }
                        match self.analyze_worktree(&path, &cancel) {
                            Ok(worktree) => {
                                let _ = result_tx.send(worktree);
                            }
                            Err(error) => {
                                let _ = error_tx.send(error);
                            }
                        }
                    }
                });
            }
            drop(path_rx);
            drop(result_tx);
            drop(error_tx);
        });

        let successes: Vec<Worktree> = result_rx.iter().collect();
        let failures: Vec<Error> = error_rx.iter().collect();

        cancel.check()?;

        if !failures.is_empty() && failures.len() * 2 > total {
            let failed = failures.len();
            let first = failures
                .into_iter()
                .next()
                .expect("non-empty failure list");
            return Err(Error::discovery_failed(format!(
                "{failed} of {total} worktree analyses failed"
            ))
            .with_source(first));
        }

        for failure in &failures {
            log::warn!("skipping worktree: {}", failure.message());
        }
        Ok(successes)
    }
}

//! Time-bounded cache of worktree analyses.
//!
//! Keyed by the path exactly as the caller supplied it (possibly relative).
//! Reads take shared access and treat expired entries as absent; eviction is
//! lazy, so an expired entry lingers until overwritten or cleared.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use super::types::Worktree;

#[derive(Debug)]
struct CacheEntry {
    worktree: Worktree,
    inserted_at: Instant,
}

#[derive(Debug)]
pub(super) struct AnalysisCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    ttl: Duration,
}

impl AnalysisCache {
    pub(super) fn new(ttl: Duration) -> Self {
        AnalysisCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub(super) fn get(&self, key: &Path) -> Option<Worktree> {
        let entries = self.entries.read().expect("cache lock poisoned");
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.worktree.clone())
    }

    pub(super) fn insert(&self, key: PathBuf, worktree: Worktree) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                worktree,
                inserted_at: Instant::now(),
            },
        );
    }

    pub(super) fn invalidate(&self, key: &Path) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.remove(key);
    }

    pub(super) fn clear(&self) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.clear();
    }
}

//! Discovery engine: project enumeration, two-level worktree scanning,
//! concurrent analysis, cache behavior, and partial-failure policy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use grove::cancel::CancelToken;
use grove::error::ErrorKind;
use grove::fsprobe::{Filesystem, OsFilesystem};
use grove::git::GitCapability;
use grove::workspace::{DEFAULT_CONCURRENCY, DiscoveryEngine};
use rstest::rstest;

use crate::common::{FIXED_COMMIT_TIME, FlakyFs, MockGit, WorkspaceFixture, info};

fn engine_with(git: Arc<MockGit>) -> DiscoveryEngine {
    DiscoveryEngine::new(git, Arc::new(OsFilesystem::new()))
}

#[rstest]
fn discovers_projects_in_mixed_content() {
    let fixture = WorkspaceFixture::new();
    let alpha = fixture.add_dir("projects/alpha");
    let beta = fixture.add_dir("projects/beta");
    fixture.add_dir("projects/notes"); // plain directory, not a repo

    let git = Arc::new(MockGit::new());
    git.add_main_repo(&alpha);
    git.add_main_repo(&beta);

    let engine = engine_with(git);
    let projects = engine
        .discover_projects(&fixture.projects, &CancelToken::new())
        .unwrap();

    let found: HashSet<(String, PathBuf)> = projects
        .into_iter()
        .map(|p| (p.name, p.git_repo_path))
        .collect();
    let expected: HashSet<(String, PathBuf)> =
        [("alpha".to_string(), alpha), ("beta".to_string(), beta)]
            .into_iter()
            .collect();
    assert_eq!(found, expected);
}

#[rstest]
fn repeated_project_discovery_is_stable() {
    let fixture = WorkspaceFixture::new();
    let alpha = fixture.add_dir("projects/alpha");
    let git = Arc::new(MockGit::new());
    git.add_main_repo(&alpha);
    let engine = engine_with(git);
    let cancel = CancelToken::new();

    let first: HashSet<_> = engine
        .discover_projects(&fixture.projects, &cancel)
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.git_repo_path))
        .collect();
    let second: HashSet<_> = engine
        .discover_projects(&fixture.projects, &cancel)
        .unwrap()
        .into_iter()
        .map(|p| (p.name, p.git_repo_path))
        .collect();
    assert_eq!(first, second);
}

#[rstest]
fn missing_projects_root_is_empty_not_an_error() {
    let engine = engine_with(Arc::new(MockGit::new()));
    let projects = engine
        .discover_projects(Path::new("/definitely/not/here"), &CancelToken::new())
        .unwrap();
    assert!(projects.is_empty());
}

#[rstest]
fn fallback_retries_after_primary_failure() {
    let fixture = WorkspaceFixture::new();
    let alpha = fixture.add_dir("projects/alpha");

    // Not a main repo, but still a git dir: only the relaxed pass finds it
    let git = Arc::new(MockGit::new());
    git.add_git_dir(&alpha);

    let engine = DiscoveryEngine::new(git, Arc::new(FlakyFs::failing_once()));
    let projects = engine
        .discover_projects_with_fallback(&fixture.projects, &CancelToken::new())
        .unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "alpha");
}

#[rstest]
fn fallback_failure_surfaces_discovery_failed() {
    let fixture = WorkspaceFixture::new();

    struct AlwaysFailingFs;
    impl Filesystem for AlwaysFailingFs {
        fn exists(&self, _: &Path) -> bool {
            true
        }
        fn is_dir(&self, _: &Path) -> bool {
            true
        }
        fn read_dir(&self, _: &Path) -> std::io::Result<Vec<PathBuf>> {
            Err(std::io::Error::other("injected failure"))
        }
        fn is_writable(&self, _: &Path) -> bool {
            true
        }
    }

    let engine = DiscoveryEngine::new(Arc::new(MockGit::new()), Arc::new(AlwaysFailingFs));
    let err = engine
        .discover_projects_with_fallback(&fixture.projects, &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WorkspaceDiscoveryFailed);
    // The original failure is preserved as the cause
    assert!(std::error::Error::source(&err).is_some());
}

#[rstest]
fn discovers_worktrees_in_two_level_layout() {
    let fixture = WorkspaceFixture::new();
    let proj1 = fixture.add_dir("workspaces/proj1");
    let feat_x = fixture.add_dir("workspaces/proj1/feat-x");
    fixture.add_dir("workspaces/proj1/stale"); // plain dir
    fixture.add_dir("workspaces/empty"); // plain dir

    let git = Arc::new(MockGit::new());
    git.add_status(info(&proj1, "main"));
    git.add_status(info(&feat_x, "feat-x"));

    let engine = engine_with(Arc::clone(&git));
    let worktrees = engine
        .discover_worktrees(&fixture.workspaces, &CancelToken::new())
        .unwrap();

    let paths: HashSet<PathBuf> = worktrees.iter().map(|w| w.path.clone()).collect();
    assert_eq!(paths, [proj1, feat_x].into_iter().collect());
    assert_eq!(git.count("get_worktree_status"), 2);
}

#[rstest]
fn missing_workspaces_root_is_empty_not_an_error() {
    let engine = engine_with(Arc::new(MockGit::new()));
    let worktrees = engine
        .discover_worktrees(Path::new("/definitely/not/here"), &CancelToken::new())
        .unwrap();
    assert!(worktrees.is_empty());
}

#[rstest]
fn bare_repositories_are_never_returned() {
    let fixture = WorkspaceFixture::new();
    let mirror = fixture.add_dir("workspaces/mirror");
    let live = fixture.add_dir("workspaces/live");

    let git = Arc::new(MockGit::new());
    git.add_bare_repo(&mirror);
    git.add_status(info(&live, "main"));

    let engine = engine_with(git);
    let worktrees = engine
        .discover_worktrees(&fixture.workspaces, &CancelToken::new())
        .unwrap();
    assert_eq!(worktrees.len(), 1);
    assert_eq!(worktrees[0].path, live);
}

#[rstest]
fn analysis_runs_concurrently_across_the_pool() {
    let fixture = WorkspaceFixture::new();
    let latency = Duration::from_millis(25);
    let git = Arc::new(MockGit::new().with_latency(latency));
    for i in 0..10 {
        let dir = fixture.add_dir(&format!("workspaces/p{i}"));
        git.add_status(info(&dir, &format!("b{i}")));
    }

    let engine = engine_with(git);
    assert_eq!(engine.concurrency(), DEFAULT_CONCURRENCY);

    let start = Instant::now();
    let worktrees = engine
        .discover_worktrees(&fixture.workspaces, &CancelToken::new())
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(worktrees.len(), 10);
    // Four workers over ten 25ms analyses: well under the serial 250ms
    assert!(
        elapsed < latency * 10,
        "expected concurrent analysis, took {elapsed:?}"
    );
}

#[rstest]
#[case(6, true)]
#[case(4, false)]
fn majority_failures_abort_the_scan(#[case] failures: usize, #[case] expect_error: bool) {
    let fixture = WorkspaceFixture::new();
    let git = Arc::new(MockGit::new());
    for i in 0..10 {
        let dir = fixture.add_dir(&format!("workspaces/p{i}"));
        if i < failures {
            git.fail_status(&dir);
        } else {
            git.add_status(info(&dir, &format!("b{i}")));
        }
    }

    let engine = engine_with(git);
    let result = engine.discover_worktrees(&fixture.workspaces, &CancelToken::new());

    if expect_error {
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WorkspaceDiscoveryFailed);
        assert!(std::error::Error::source(&err).is_some());
    } else {
        assert_eq!(result.unwrap().len(), 10 - failures);
    }
}

#[rstest]
fn cache_hit_within_ttl_skips_git() {
    let git = Arc::new(MockGit::new());
    git.add_status(info("/w/alpha/feat", "feat"));
    let engine = engine_with(Arc::clone(&git));
    let cancel = CancelToken::new();

    let first = engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    let second = engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(git.count("get_worktree_status"), 1);
    // Commit time flows straight through; no wall-clock in the entity
    assert_eq!(first.last_updated.timestamp(), FIXED_COMMIT_TIME);
}

#[rstest]
fn cache_expires_after_ttl() {
    let git = Arc::new(MockGit::new());
    git.add_status(info("/w/alpha/feat", "feat"));
    let engine = DiscoveryEngine::with_cache_ttl(
        Arc::clone(&git) as Arc<dyn GitCapability>,
        Arc::new(OsFilesystem::new()),
        Duration::from_millis(50),
    );
    let cancel = CancelToken::new();

    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    assert_eq!(git.count("get_worktree_status"), 1, "hit before expiry");

    std::thread::sleep(Duration::from_millis(80));
    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    assert_eq!(git.count("get_worktree_status"), 2, "miss after expiry");
}

#[rstest]
fn clear_cache_forces_exactly_one_new_analysis() {
    let git = Arc::new(MockGit::new());
    git.add_status(info("/w/alpha/feat", "feat"));
    let engine = engine_with(Arc::clone(&git));
    let cancel = CancelToken::new();

    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    engine.clear_cache();
    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    engine
        .analyze_worktree(Path::new("/w/alpha/feat"), &cancel)
        .unwrap();
    assert_eq!(git.count("get_worktree_status"), 2);
}

#[rstest]
fn failed_analyses_do_not_pollute_the_cache() {
    let fixture = WorkspaceFixture::new();
    let good = fixture.add_dir("workspaces/good");
    let bad = fixture.add_dir("workspaces/bad");

    let git = Arc::new(MockGit::new());
    git.add_status(info(&good, "main"));
    git.fail_status(&bad);

    let engine = engine_with(Arc::clone(&git));
    let cancel = CancelToken::new();

    // 1 of 2 failed: below the majority threshold, so the scan succeeds
    let worktrees = engine.discover_worktrees(&fixture.workspaces, &cancel).unwrap();
    assert_eq!(worktrees.len(), 1);

    // The failure was not cached: analyzing the bad path hits git again
    let before = git.count("get_worktree_status");
    let _ = engine.analyze_worktree(&bad, &cancel);
    assert_eq!(git.count("get_worktree_status"), before + 1);
}

#[rstest]
fn cancelled_scan_surfaces_cancelled() {
    let fixture = WorkspaceFixture::new();
    let dir = fixture.add_dir("workspaces/p0");
    let git = Arc::new(MockGit::new());
    git.add_status(info(&dir, "main"));

    let engine = engine_with(git);
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = engine
        .discover_worktrees(&fixture.workspaces, &cancel)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

//! Worktree creation: validation ordering, hook behavior, cache
//! invalidation, and fallback targets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grove::cancel::CancelToken;
use grove::error::ErrorKind;
use grove::fsprobe::{Filesystem, OsFilesystem};
use grove::git::GitCapability;
use grove::hook::SetupHook;
use grove::ops::WorktreeCreator;
use grove::workspace::DiscoveryEngine;
use rstest::rstest;

use crate::common::{CountingHook, MockGit, WorkspaceFixture};

struct CreateFixture {
    fixture: WorkspaceFixture,
    git: Arc<MockGit>,
    hook: Arc<CountingHook>,
    engine: Arc<DiscoveryEngine>,
    creator: WorktreeCreator,
    project: PathBuf,
    parent: PathBuf,
}

fn setup(hook: CountingHook) -> CreateFixture {
    let fixture = WorkspaceFixture::new();
    let project = fixture.add_dir("projects/alpha");
    let parent = fixture.add_dir("workspaces/alpha");

    let git = Arc::new(MockGit::new());
    git.add_main_repo(&project);

    let fs: Arc<dyn Filesystem> = Arc::new(OsFilesystem::new());
    let hook = Arc::new(hook);
    let engine = Arc::new(DiscoveryEngine::new(
        Arc::clone(&git) as Arc<dyn GitCapability>,
        Arc::clone(&fs),
    ));
    let creator = WorktreeCreator::new(
        Arc::clone(&git) as Arc<dyn GitCapability>,
        fs,
        Arc::clone(&hook) as Arc<dyn SetupHook>,
        Arc::clone(&engine),
    );

    CreateFixture {
        fixture,
        git,
        hook,
        engine,
        creator,
        project,
        parent,
    }
}

#[rstest]
fn create_happy_path() {
    let f = setup(CountingHook::new());
    let cancel = CancelToken::new();
    let target = f.parent.join("feature-login");

    let outcome = f
        .creator
        .create(&f.project, "feature/login", &target, &cancel)
        .unwrap();

    assert_eq!(outcome.target, target);
    assert!(!outcome.branch_existed);
    assert_eq!(f.hook.call_count(), 1);
    assert_eq!(
        f.git.created(),
        vec![(f.project.clone(), "feature/login".to_string(), target.clone())]
    );

    // The new worktree is immediately analyzable with the right branch
    let worktree = f.engine.analyze_worktree(&target, &cancel).unwrap();
    assert_eq!(worktree.branch, "feature/login");
}

#[rstest]
fn empty_project_path_is_a_validation_error() {
    let f = setup(CountingHook::new());
    let err = f
        .creator
        .create(Path::new(""), "feat", &f.parent.join("x"), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.suggestion().is_some());
    assert!(f.git.created().is_empty());
}

#[rstest]
fn invalid_branch_short_circuits_before_git() {
    let f = setup(CountingHook::new());
    let err = f
        .creator
        .create(&f.project, "bad branch", &f.parent.join("x"), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidBranchName);
    assert!(f.git.created().is_empty());
    assert_eq!(f.hook.call_count(), 0);
}

#[rstest]
fn existing_target_is_rejected() {
    let f = setup(CountingHook::new());
    let target = f.fixture.add_dir("workspaces/alpha/occupied");
    let err = f
        .creator
        .create(&f.project, "feat", &target, &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PathNotWritable);
    assert!(f.git.created().is_empty());
}

#[rstest]
fn non_repository_project_is_rejected() {
    let f = setup(CountingHook::new());
    let plain = f.fixture.add_dir("projects/not-a-repo");
    let err = f
        .creator
        .create(&plain, "feat", &f.parent.join("x"), &CancelToken::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotRepository);
    assert!(f.git.created().is_empty());
}

#[rstest]
fn hook_failure_is_swallowed() {
    let f = setup(CountingHook::failing());
    let target = f.parent.join("feat");
    let outcome = f
        .creator
        .create(&f.project, "feat", &target, &CancelToken::new());
    assert!(outcome.is_ok(), "hook failures must not fail creation");
    assert_eq!(f.hook.call_count(), 1);
}

#[rstest]
fn reports_preexisting_branch() {
    let f = setup(CountingHook::new());
    f.git.add_branch(&f.project, "feat");
    let outcome = f
        .creator
        .create(&f.project, "feat", &f.parent.join("feat"), &CancelToken::new())
        .unwrap();
    assert!(outcome.branch_existed);
}

#[rstest]
fn fallback_substitutes_a_viable_sibling() {
    let f = setup(CountingHook::new());
    // The requested target is occupied; the sanitized-branch sibling is free
    let target = f.fixture.add_dir("workspaces/alpha/occupied");

    let outcome = f
        .creator
        .create_with_fallback(&f.project, "feat/x", &target, &CancelToken::new())
        .unwrap();

    assert_eq!(outcome.target, f.parent.join("feat-x"));
    assert_eq!(f.git.created().len(), 1);
}

#[rstest]
fn fallback_returns_original_error_when_nothing_is_viable() {
    let f = setup(CountingHook::new());
    let target = f.fixture.add_dir("workspaces/alpha/occupied");
    // Occupy every candidate as well
    f.fixture.add_dir("workspaces/alpha/feat");
    f.fixture.add_dir("workspaces/alpha/alpha-feat");

    let err = f
        .creator
        .create_with_fallback(&f.project, "feat", &target, &CancelToken::new())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::PathNotWritable);
    assert!(
        err.path().is_some_and(|p| p.ends_with("occupied")),
        "the original target's error is surfaced"
    );
    assert!(f.git.created().is_empty());
}

#[rstest]
fn create_then_forced_remove_round_trips() {
    let f = setup(CountingHook::new());
    let cancel = CancelToken::new();
    let target = f.parent.join("feat");

    f.creator.create(&f.project, "feat", &target, &cancel).unwrap();
    assert!(f.git.is_git_repository(&target, &cancel).unwrap());

    f.git.add_repo_root(&target, &f.project);
    let remover = grove::ops::WorktreeRemover::new(Arc::clone(&f.git) as Arc<dyn GitCapability>, Arc::clone(&f.engine));
    remover.remove(&target, true, false, &cancel).unwrap();

    assert!(!f.git.is_git_repository(&target, &cancel).unwrap());
}

#[rstest]
fn lifecycle_mutations_invalidate_the_cache() {
    let f = setup(CountingHook::new());
    let cancel = CancelToken::new();
    let target = f.parent.join("feat");

    f.creator.create(&f.project, "feat", &target, &cancel).unwrap();
    let cached = f.engine.analyze_worktree(&target, &cancel).unwrap();
    assert_eq!(cached.branch, "feat");

    f.git.add_repo_root(&target, &f.project);
    let remover = grove::ops::WorktreeRemover::new(Arc::clone(&f.git) as Arc<dyn GitCapability>, Arc::clone(&f.engine));
    remover.remove(&target, true, false, &cancel).unwrap();

    // Recreate on a different branch: a stale cache entry would still say "feat"
    f.creator.create(&f.project, "feat2", &target, &cancel).unwrap();
    let fresh = f.engine.analyze_worktree(&target, &cancel).unwrap();
    assert_eq!(fresh.branch, "feat2");
}

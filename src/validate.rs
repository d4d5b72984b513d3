//! Input validation.
//!
//! Validators are pure where possible and accumulate every violation instead
//! of stopping at the first one; callers surface the first error and keep the
//! rest for diagnostics. Results compose: merging concatenates errors and
//! warnings and ANDs validity.

use std::path::{Component, Path};

use crate::error::{Error, Result};
use crate::fsprobe::Filesystem;

/// Characters git's check-ref-format rejects outright.
const FORBIDDEN_BRANCH_CHARS: [char; 7] = ['~', '^', ':', '?', '*', '[', '\\'];

/// Accumulated outcome of one or more validation rules.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<Error>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Concatenate another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Surface the first error; the full list is consumed for diagnostics.
    pub fn into_result(mut self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            for extra in self.errors.drain(1..) {
                log::debug!("additional validation error: {}", extra.message());
            }
            Err(self.errors.remove(0))
        }
    }
}

/// Validate a branch name against git's ref-format rules.
///
/// The enforced set is the union from `git check-ref-format`: no spaces or
/// control characters, no `..`, `@{`, or `//`, none of `~ ^ : ? * [ \`, no
/// leading or trailing `.`, `/`, or `-`, not `HEAD`, not ending in `.lock`.
pub fn validate_branch_name(branch: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if branch.is_empty() {
        result.push_error(Error::invalid_branch_name(branch, "name is empty"));
        return result;
    }

    if branch == "HEAD" {
        result.push_error(Error::invalid_branch_name(branch, "'HEAD' is reserved"));
    }

    if branch.chars().any(|c| c == ' ' || c.is_ascii_control()) {
        result.push_error(Error::invalid_branch_name(
            branch,
            "contains spaces or control characters",
        ));
    }

    if let Some(forbidden) = branch.chars().find(|c| FORBIDDEN_BRANCH_CHARS.contains(c)) {
        result.push_error(Error::invalid_branch_name(
            branch,
            format!("contains forbidden character '{forbidden}'"),
        ));
    }

    if branch.contains("..") {
        result.push_error(Error::invalid_branch_name(branch, "contains '..'"));
    }

    if branch.contains("@{") {
        result.push_error(Error::invalid_branch_name(branch, "contains '@{'"));
    }

    if branch.contains("//") {
        result.push_error(Error::invalid_branch_name(
            branch,
            "contains consecutive slashes",
        ));
    }

    if branch.ends_with(".lock") {
        result.push_error(Error::invalid_branch_name(branch, "ends with '.lock'"));
    }

    let starts_badly = branch.starts_with(['.', '/', '-']);
    let ends_badly = branch.ends_with(['.', '/', '-']);
    if starts_badly || ends_badly {
        result.push_error(Error::invalid_branch_name(
            branch,
            "starts or ends with '.', '/', or '-'",
        ));
    }

    result
}

/// Validate a filesystem path string: non-empty, absolute, no NUL bytes, and
/// no `..` segments.
pub fn validate_path(path: &str) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if path.is_empty() {
        result.push_error(Error::invalid_path(path, "path is empty"));
        return result;
    }

    if path.contains('\0') {
        result.push_error(Error::invalid_path(path, "contains a null byte"));
        return result;
    }

    let as_path = Path::new(path);
    if !as_path.is_absolute() {
        result.push_error(Error::invalid_path(path, "path is not absolute"));
    }

    if as_path
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        result.push_error(Error::invalid_path(path, "contains '..' segments"));
    }

    result
}

/// Compound rule for worktree creation.
///
/// Branch-name checks run first; the I/O-dependent writability probe only
/// runs once they pass, so a bad branch never costs filesystem calls.
pub fn validate_worktree_creation(
    branch: &str,
    target: &Path,
    fs: &dyn Filesystem,
) -> ValidationResult {
    let mut result = validate_branch_name(branch);
    if !result.is_valid() {
        return result;
    }

    result.merge(validate_path(&target.to_string_lossy()));
    if !result.is_valid() {
        return result;
    }

    result.merge(validate_target_writable(target, fs));
    result
}

/// The target must not exist; its parent must exist and be writable.
pub fn validate_target_writable(target: &Path, fs: &dyn Filesystem) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if fs.exists(target) {
        result.push_error(Error::path_not_writable(target, "path already exists"));
        return result;
    }

    let Some(parent) = target.parent() else {
        result.push_error(Error::path_not_writable(target, "path has no parent"));
        return result;
    };

    if !fs.exists(parent) {
        result.push_error(
            Error::path_not_writable(target, "parent directory does not exist")
                .with_suggestion("Create the parent directory first"),
        );
        return result;
    }

    if !fs.is_writable(parent) {
        result.push_error(Error::path_not_writable(
            target,
            "parent directory is not writable",
        ));
    }

    result
}

//! Path resolution and display helpers.
//!
//! [`PathResolver`] maps workspace-relative identifiers like `Projects/foo`,
//! `Workspaces/foo/feat-x`, or `.` onto absolute filesystem paths using the
//! configured roots. The resolver is pure; it never touches the filesystem.

use std::path::{Path, PathBuf};

use normalize_path::NormalizePath;

use crate::config::Config;

/// Literal first segment that maps onto the projects root.
const PROJECTS_SEGMENT: &str = "Projects";

/// Literal first segment that maps onto the workspaces root.
const WORKSPACES_SEGMENT: &str = "Workspaces";

/// Maps workspace-relative identifiers onto absolute paths.
///
/// Resolution rules, first match wins:
/// 1. absolute identifiers pass through unchanged
/// 2. `.` resolves to the fallback workspace root, then the projects root
/// 3. `Projects[/rest]` joins the projects root
/// 4. `Workspaces[/rest]` joins the workspaces root
/// 5. anything else joins the fallback workspace root when one is configured
///
/// The `Projects`/`Workspaces` prefixes are literal segments, not reserved
/// words: they only match when followed by a separator or end-of-string, so
/// `ProjectsAbc` falls through to rule 5.
#[derive(Debug, Clone)]
pub struct PathResolver {
    config: Config,
}

impl PathResolver {
    pub fn new(config: &Config) -> Self {
        PathResolver {
            config: config.clone(),
        }
    }

    pub fn resolve(&self, identifier: &str) -> PathBuf {
        let as_path = Path::new(identifier);
        if as_path.is_absolute() {
            return as_path.to_path_buf();
        }

        if identifier == "." {
            if !self.config.workspace.as_os_str().is_empty() {
                return self.config.workspace.clone();
            }
            if !self.config.projects_path.as_os_str().is_empty() {
                return self.config.projects_path.clone();
            }
            return as_path.to_path_buf();
        }

        if let Some(rest) = strip_segment(identifier, PROJECTS_SEGMENT) {
            return self.config.projects_path.join(rest);
        }

        if let Some(rest) = strip_segment(identifier, WORKSPACES_SEGMENT) {
            return self.config.workspaces_path.join(rest);
        }

        if !self.config.workspace.as_os_str().is_empty() {
            return self.config.workspace.join(identifier);
        }

        as_path.to_path_buf()
    }
}

/// Strip a literal leading segment, requiring a separator (or end) after it.
///
/// Returns the remainder without its leading separator; the remainder is
/// empty when the identifier is exactly the segment.
fn strip_segment<'a>(identifier: &'a str, segment: &str) -> Option<&'a str> {
    let rest = identifier.strip_prefix(segment)?;
    if rest.is_empty() {
        return Some(rest);
    }
    let mut chars = rest.chars();
    match chars.next() {
        Some('/') | Some('\\') => Some(chars.as_str()),
        _ => None,
    }
}

/// Resolve a possibly-relative path to absolute form.
///
/// Prefers the canonical form when the path exists (via `dunce`, which avoids
/// Windows verbatim prefixes git cannot handle); falls back to joining the
/// current directory and normalizing lexically, so paths that do not exist
/// yet still get a stable absolute form.
pub fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = dunce::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.normalize();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path).normalize(),
        Err(_) => path.normalize(),
    }
}

/// Get the user's home directory.
///
/// Uses the `home` crate which handles platform-specific detection:
/// - Unix: `$HOME` environment variable
/// - Windows: `USERPROFILE` or `HOMEDRIVE`/`HOMEPATH`
pub fn home_dir() -> Option<PathBuf> {
    home::home_dir()
}

/// Format a filesystem path for user-facing output.
///
/// Replaces home directory prefix with `~` (e.g., `/Users/alex/Projects/gv`
/// -> `~/Projects/gv`). Paths outside home are returned unchanged.
pub fn format_path_for_display(path: &Path) -> String {
    if let Some(home) = home_dir()
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        if stripped.as_os_str().is_empty() {
            return "~".to_string();
        }

        let mut display_path = PathBuf::from("~");
        display_path.push(stripped);
        return display_path.display().to_string();
    }

    path.display().to_string()
}

//! `gv create` - create a worktree for a branch of a project.

use std::path::PathBuf;

use color_print::cformat;
use grove::Result;
use grove::path::format_path_for_display;
use grove::styling::{HINT, HINT_EMOJI, SUCCESS, SUCCESS_EMOJI, println};

use super::App;

pub fn handle_create(
    app: &App,
    project: &str,
    branch: &str,
    path: Option<&str>,
) -> Result<()> {
    let project_path = app.resolver.resolve(project);

    let target = match path {
        Some(identifier) => app.resolver.resolve(identifier),
        None => {
            let derived = default_target(app, &project_path, branch);
            // The derived parent is grove's own layout; create it on demand
            // so first use doesn't require a manual mkdir.
            if let Some(parent) = derived.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }
            derived
        }
    };

    let outcome = app
        .creator
        .create_with_fallback(&project_path, branch, &target, &app.cancel)?;

    let shown = format_path_for_display(&outcome.target);
    println!(
        "{SUCCESS_EMOJI} {SUCCESS}Created worktree for {}{SUCCESS:#}",
        cformat!("<bold>{branch}</>")
    );
    println!("   {}", shown);
    if outcome.branch_existed {
        println!("{HINT_EMOJI} {HINT}Checked out existing branch{HINT:#}");
    } else {
        println!("{HINT_EMOJI} {HINT}Created new branch{HINT:#}");
    }
    Ok(())
}

/// `<workspaces>/<project-name>/<sanitized-branch>`, falling back to a
/// sibling of the project when no workspaces root is configured.
fn default_target(app: &App, project_path: &std::path::Path, branch: &str) -> PathBuf {
    let sanitized = sanitize_filename::sanitize(branch.replace('/', "-"));
    let project_name = project_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("worktree");

    if app.config.workspaces_path.as_os_str().is_empty() {
        project_path.with_file_name(format!("{project_name}-{sanitized}"))
    } else {
        app.config.workspaces_path.join(project_name).join(sanitized)
    }
}

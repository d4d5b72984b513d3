//! `gv remove` - remove a worktree, optionally deleting its branch.

use color_print::cformat;
use grove::Result;
use grove::ops::ensure_not_current_dir;
use grove::path::format_path_for_display;
use grove::styling::{SUCCESS, SUCCESS_EMOJI, println};

use super::App;

pub fn handle_remove(app: &App, path: &str, force: bool, delete_branch: bool) -> Result<()> {
    let worktree_path = app.resolver.resolve(path);

    ensure_not_current_dir(&worktree_path)?;

    let outcome = app
        .remover
        .remove(&worktree_path, force, delete_branch, &app.cancel)?;

    println!(
        "{SUCCESS_EMOJI} {SUCCESS}Removed worktree {}{SUCCESS:#}",
        cformat!("<bold>{}</>", format_path_for_display(&outcome.worktree_path))
    );
    if let Some(branch) = &outcome.deleted_branch {
        println!(
            "{SUCCESS_EMOJI} {SUCCESS}Deleted branch {}{SUCCESS:#}",
            cformat!("<bold>{branch}</>")
        );
    }
    Ok(())
}

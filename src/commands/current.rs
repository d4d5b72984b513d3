//! `gv current` - show the worktree containing the current directory.

use grove::Result;
use grove::error::Error;
use grove::path::format_path_for_display;
use grove::styling::{CURRENT, DIM, HINT, HINT_EMOJI, println};
use grove::util::{format_age, get_now};

use super::App;
use crate::cli::OutputFormat;

pub fn handle_current(app: &App, format: OutputFormat) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let detected = app.detector.detect(&cwd, &app.cancel)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&detected)
                .map_err(|e| Error::validation(format!("Failed to serialize to JSON: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Table => match detected {
            Some(worktree) => {
                let age = format_age(worktree.last_updated.timestamp(), get_now());
                println!(
                    "{CURRENT}{}{CURRENT:#} {DIM}({}, {age}){DIM:#}",
                    worktree.branch, worktree.status
                );
                println!("{DIM}{}{DIM:#}", format_path_for_display(&worktree.path));
            }
            None => {
                println!(
                    "{HINT_EMOJI} {HINT}Not inside a linked worktree{HINT:#}"
                );
            }
        },
    }
    Ok(())
}

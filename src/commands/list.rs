//! `gv list` - list projects and their worktrees.

use std::path::Path;

use grove::Result;
use grove::error::Error;
use grove::path::format_path_for_display;
use grove::styling::{DIM, HINT, HINT_EMOJI, SUCCESS, WARNING, println};
use grove::util::{format_age, get_now};
use grove::workspace::{Project, Worktree, WorktreeStatus};

use super::App;
use crate::cli::OutputFormat;

pub fn handle_list(app: &App, format: OutputFormat) -> Result<()> {
    let mut projects = app
        .engine
        .discover_projects_with_fallback(&app.config.projects_path, &app.cancel)?;
    let worktrees = app
        .engine
        .discover_worktrees(&app.config.workspaces_path, &app.cancel)?;

    let unassigned = assign_worktrees(&mut projects, worktrees, &app.config.workspaces_path);

    match format {
        OutputFormat::Json => {
            #[derive(serde::Serialize)]
            struct ListOutput<'a> {
                projects: &'a [Project],
                unassigned: &'a [Worktree],
            }
            let json = serde_json::to_string_pretty(&ListOutput {
                projects: &projects,
                unassigned: &unassigned,
            })
            .map_err(|e| Error::validation(format!("Failed to serialize to JSON: {e}")))?;
            println!("{json}");
        }
        OutputFormat::Table => render_table(&projects, &unassigned),
    }
    Ok(())
}

/// Attach each worktree to the project whose name matches its directory
/// under the workspaces root; the rest stay unassigned.
fn assign_worktrees(
    projects: &mut [Project],
    worktrees: Vec<Worktree>,
    workspaces_path: &Path,
) -> Vec<Worktree> {
    let mut unassigned = Vec::new();
    'next: for worktree in worktrees {
        if let Ok(relative) = worktree.path.strip_prefix(workspaces_path)
            && let Some(project_name) = relative.components().next()
        {
            let project_name = project_name.as_os_str().to_string_lossy();
            for project in projects.iter_mut() {
                if project.name == project_name {
                    project.worktrees.push(worktree);
                    continue 'next;
                }
            }
        }
        unassigned.push(worktree);
    }
    unassigned
}

fn render_table(projects: &[Project], unassigned: &[Worktree]) {
    struct Row {
        project: String,
        branch: String,
        status: Option<WorktreeStatus>,
        age: String,
        path: String,
    }

    let now = get_now();
    let mut rows = Vec::new();
    for project in projects {
        rows.push(Row {
            project: project.name.clone(),
            branch: "-".to_string(),
            status: None,
            age: "-".to_string(),
            path: format_path_for_display(&project.git_repo_path),
        });
        for worktree in &project.worktrees {
            rows.push(worktree_row(&project.name, worktree, now));
        }
    }
    for worktree in unassigned {
        rows.push(worktree_row("-", worktree, now));
    }

    if rows.is_empty() {
        println!("{HINT_EMOJI} {HINT}No projects or worktrees found{HINT:#}");
        return;
    }

    fn worktree_row(project: &str, worktree: &Worktree, now: i64) -> Row {
        Row {
            project: project.to_string(),
            branch: worktree.branch.clone(),
            status: Some(worktree.status),
            age: format_age(worktree.last_updated.timestamp(), now),
            path: format_path_for_display(&worktree.path),
        }
    }

    let project_width = column_width("PROJECT", rows.iter().map(|r| r.project.as_str()));
    let branch_width = column_width("BRANCH", rows.iter().map(|r| r.branch.as_str()));
    let status_width = "STATUS".len();
    let age_width = column_width("AGE", rows.iter().map(|r| r.age.as_str()));

    println!(
        "{DIM}{:<project_width$}  {:<branch_width$}  {:<status_width$}  {:<age_width$}  PATH{DIM:#}",
        "PROJECT", "BRANCH", "STATUS", "AGE"
    );
    for row in &rows {
        let status = match row.status {
            Some(WorktreeStatus::Clean) => format!("{SUCCESS}{:<status_width$}{SUCCESS:#}", "clean"),
            Some(WorktreeStatus::Dirty) => format!("{WARNING}{:<status_width$}{WARNING:#}", "dirty"),
            None => format!("{:<status_width$}", "-"),
        };
        println!(
            "{:<project_width$}  {:<branch_width$}  {status}  {:<age_width$}  {DIM}{}{DIM:#}",
            row.project, row.branch, row.age, row.path
        );
    }

    let worktree_count: usize =
        projects.iter().map(|p| p.worktrees.len()).sum::<usize>() + unassigned.len();
    println!(
        "\n{DIM}{} project{}, {} worktree{}{DIM:#}",
        projects.len(),
        if projects.len() == 1 { "" } else { "s" },
        worktree_count,
        if worktree_count == 1 { "" } else { "s" },
    );
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values.map(str::len).chain([header.len()]).max().unwrap_or(0)
}

use clap::builder::styling::{AnsiColor, Color, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Custom styles for help output - matches grove's color scheme
fn help_styles() -> Styles {
    Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .usage(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(anstyle::Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON output
    Json,
}

#[derive(Parser)]
#[command(name = "gv")]
#[command(about = "Git worktree workspace management", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(styles = help_styles())]
#[command(arg_required_else_help = true)]
#[command(after_long_help = "\
Getting started

  gv create alpha feature/login    Create a worktree for a branch
  gv list                          Show every project and worktree
  gv remove Workspaces/alpha/feat  Remove a worktree

Identifiers like 'Projects/alpha' and 'Workspaces/alpha/feat' resolve
against the roots in ~/.config/grove/config.toml.")]
pub struct Cli {
    /// Working directory for this command
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        help_heading = "Global Options"
    )]
    pub directory: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "file", help_heading = "Global Options")]
    pub config: Option<PathBuf>,

    /// Show every git command as it runs
    #[arg(short, long, global = true, help_heading = "Global Options")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a worktree for a branch of a project
    Create {
        /// Project identifier (e.g. 'Projects/alpha', an absolute path, or '.')
        project: String,
        /// Branch to check out; created if it does not exist
        branch: String,
        /// Target path; defaults to '<workspaces>/<project>/<branch>'
        path: Option<String>,
    },
    /// Remove a worktree
    Remove {
        /// Worktree identifier or path
        path: String,
        /// Remove even with uncommitted changes
        #[arg(long)]
        force: bool,
        /// Also delete the checked-out branch after removal
        #[arg(long)]
        delete_branch: bool,
    },
    /// List projects and their worktrees
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Show the worktree containing the current directory
    Current {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

//! Logged subprocess execution.
//!
//! All external commands grove runs go through [`Cmd`] so that every
//! invocation gets consistent debug logging and timing traces:
//!
//! ```text
//! $ git worktree list --porcelain [alpha]    # with context
//! $ mise install                             # without context
//! [gv-trace] context=alpha cmd="git ..." dur=12.3ms ok=true
//! ```
//!
//! The `context` is typically the worktree directory name for git commands.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Instant;

use anyhow::Context as _;

use crate::cancel::CancelToken;

/// Builder for a logged subprocess invocation.
#[derive(Debug)]
pub struct Cmd {
    program: String,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    context: Option<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Cmd {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            context: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Short label shown next to the logged command line.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Run to completion, capturing stdout and stderr.
    ///
    /// Checks the cancellation token before spawning; a fired token is
    /// reported as an interrupted I/O error so callers can wrap it uniformly.
    pub fn run(self, cancel: &CancelToken) -> anyhow::Result<Output> {
        if cancel.is_cancelled() {
            anyhow::bail!("cancelled before running {}", self.program);
        }

        let cmd_str = self.command_string();
        match &self.context {
            Some(ctx) => log::debug!("$ {cmd_str} [{ctx}]"),
            None => log::debug!("$ {cmd_str}"),
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let t0 = Instant::now();
        let result = command
            .output()
            .with_context(|| format!("Failed to execute: {cmd_str}"));
        let duration_ms = t0.elapsed().as_secs_f64() * 1000.0;

        match (&result, &self.context) {
            (Ok(output), Some(ctx)) => log::debug!(
                "[gv-trace] context={ctx} cmd=\"{cmd_str}\" dur={duration_ms:.1}ms ok={}",
                output.status.success()
            ),
            (Ok(output), None) => log::debug!(
                "[gv-trace] cmd=\"{cmd_str}\" dur={duration_ms:.1}ms ok={}",
                output.status.success()
            ),
            (Err(e), Some(ctx)) => {
                log::debug!("[gv-trace] context={ctx} cmd=\"{cmd_str}\" dur={duration_ms:.1}ms err=\"{e:#}\"")
            }
            (Err(e), None) => {
                log::debug!("[gv-trace] cmd=\"{cmd_str}\" dur={duration_ms:.1}ms err=\"{e:#}\"")
            }
        }

        result
    }

    fn command_string(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            let args: Vec<_> = self.args.iter().map(|a| a.to_string_lossy()).collect();
            format!("{} {}", self.program, args.join(" "))
        }
    }
}

/// Short display name for a path, used as logging context.
pub fn path_to_logging_context(path: &Path) -> String {
    if path.to_str() == Some(".") {
        ".".to_string()
    } else {
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(".")
            .to_string()
    }
}

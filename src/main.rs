use std::process;

use clap::Parser;

use grove::cancel::CancelToken;
use grove::config::{Config, set_config_path};
use grove::styling::println;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{App, handle_create, handle_current, handle_list, handle_remove};

fn main() {
    let cli = Cli::parse();

    // Initialize base path from -C flag if provided
    if let Some(path) = &cli.directory
        && let Err(e) = std::env::set_current_dir(path)
    {
        eprintln!("gv: cannot change to {}: {e}", path.display());
        process::exit(1);
    }

    // Initialize config path from --config flag if provided
    if let Some(path) = cli.config.clone() {
        set_config_path(path);
    }

    init_logging(cli.verbose);

    let cancel = CancelToken::new();
    if let Err(e) = cancel.register_signals() {
        log::warn!("could not register signal handlers: {e}");
    }

    let result = run(&cli, cancel);

    if let Err(e) = result {
        println!("{e}");
        process::exit(e.kind().exit_code());
    }
}

fn run(cli: &Cli, cancel: CancelToken) -> grove::Result<()> {
    let config = Config::load()?;
    let app = App::new(config, cancel);

    match &cli.command {
        Commands::Create {
            project,
            branch,
            path,
        } => handle_create(&app, project, branch, path.as_deref()),
        Commands::Remove {
            path,
            force,
            delete_branch,
        } => handle_remove(&app, path, *force, *delete_branch),
        Commands::List { format } => handle_list(&app, *format),
        Commands::Current { format } => handle_current(&app, *format),
    }
}

/// Configure logging based on --verbose flag or RUST_LOG env var.
///
/// Worker threads are mapped to single letters so interleaved discovery
/// logs stay readable.
fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "debug" } else { "off" }),
    )
    .format(|buf, record| {
        use anstyle::Style;
        use std::io::Write;

        let msg = record.args().to_string();

        // Map thread ID to a single character (a-z, then A-Z)
        let thread_id = format!("{:?}", std::thread::current().id());
        let thread_num = thread_id
            .strip_prefix("ThreadId(")
            .and_then(|s| s.strip_suffix(")"))
            .and_then(|s| s.parse::<usize>().ok())
            .map(|n| {
                if n <= 26 {
                    char::from(b'a' + (n - 1) as u8)
                } else if n <= 52 {
                    char::from(b'A' + (n - 27) as u8)
                } else {
                    '?'
                }
            })
            .unwrap_or('?');

        let dim = Style::new().dimmed();

        // Commands start with $, make only the command bold (not $ or [context])
        if let Some(rest) = msg.strip_prefix("$ ") {
            let bold = Style::new().bold();

            if let Some(bracket_pos) = rest.find(" [") {
                let command = &rest[..bracket_pos];
                let context = &rest[bracket_pos..];
                writeln!(
                    buf,
                    "{dim}[{thread_num}]{dim:#} $ {bold}{command}{bold:#}{context}"
                )
            } else {
                writeln!(buf, "{dim}[{thread_num}]{dim:#} $ {bold}{rest}{bold:#}")
            }
        } else {
            writeln!(buf, "{dim}[{thread_num}]{dim:#} {msg}")
        }
    })
    .init();
}

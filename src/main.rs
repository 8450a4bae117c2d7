use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use clap::Parser;
use flowlog::cli::commands::Cli;
use flowlog::cli::handlers;
use flowlog::io::data_dir::{log_path, resolve_data_dir};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    init_logging(&data_dir);

    let result = match cli.command {
        // No subcommand → launch TUI
        None => flowlog::tui::run(&data_dir),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Send tracing output to `flowlog.log` in the data directory. The terminal
/// belongs to the TUI and to command output, so nothing is logged there.
/// Level comes from `FLOWLOG_LOG` (default `warn`).
fn init_logging(data_dir: &Path) {
    if std::fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(data_dir))
    else {
        return;
    };
    let filter = EnvFilter::try_from_env("FLOWLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

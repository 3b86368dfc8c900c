//! FsMonitor — document and workspace size in a status bar.
//!
//! Thin binary entry point that plays the editor host on a terminal: the
//! status item is printed to stdout, editor events are read as commands
//! from stdin, and saves are picked up by polling. All logic lives in the
//! `fsmonitor-core` and `fsmonitor-host` crates.

use anyhow::{Context, Result};
use clap::Parser;
use fsmonitor_core::config::JsonConfigSource;
use fsmonitor_core::platform::StdFileSystem;
use fsmonitor_host::commands::start_command_reader;
use fsmonitor_host::events::event_channel;
use fsmonitor_host::monitor::start_save_watcher;
use fsmonitor_host::widgets::TerminalStatusBar;
use fsmonitor_host::{FsMonitorApp, MonitorState};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Show the size of the open document and of the workspace folders.
///
/// Reads commands from stdin: `open <path>`, `close`, `save`,
/// `workspace <dir>...`, `toggle`, `reload`, `quit`.
#[derive(Parser)]
#[command(name = "fsmonitor", version, about, long_about = None)]
struct Cli {
    /// Workspace folders whose combined size is shown.
    folders: Vec<PathBuf>,

    /// Document that is open when the monitor starts.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Settings file (JSON).
    #[arg(short, long, default_value = "fsmonitor.json")]
    settings: PathBuf,

    /// How often to check the document and settings for changes, in milliseconds.
    #[arg(long, default_value_t = 1_000)]
    poll_ms: u64,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the status line.
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("FsMonitor starting");

    let mut state = MonitorState::new(
        Box::new(TerminalStatusBar::stdout()),
        Box::new(JsonConfigSource::new(&cli.settings)),
        Arc::new(StdFileSystem),
    );
    state.set_workspace_folders(cli.folders);
    state.set_active_document(cli.file);

    let (tx, rx) = event_channel();
    let watcher = start_save_watcher(
        Some(cli.settings.clone()),
        Duration::from_millis(cli.poll_ms.max(1)),
        tx.clone(),
    )
    .context("failed to start save watcher")?;
    start_command_reader(BufReader::new(std::io::stdin()), tx)
        .context("failed to start command reader")?;

    FsMonitorApp::new(state).with_watcher(watcher).run(rx);

    Ok(())
}

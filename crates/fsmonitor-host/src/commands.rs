/// Line commands — a textual stand-in for editor events.
///
/// Each line read from the command stream maps to one [`HostEvent`]:
///
/// | Command                | Event                                  |
/// |------------------------|----------------------------------------|
/// | `open <path>`          | `ActiveEditorChanged(Some(path))`      |
/// | `close`                | `ActiveEditorChanged(None)`            |
/// | `save [path]`          | `DocumentSaved(path)`                  |
/// | `workspace [dir ...]`  | `WorkspaceFoldersChanged(dirs)`        |
/// | `reload`               | `ConfigurationChanged`                 |
/// | `toggle`               | `ToggleOnOff`                          |
/// | `quit` / `exit`        | `Shutdown`                             |
///
/// Blank lines and lines starting with `#` are ignored.
use crate::events::HostEvent;
use crossbeam_channel::Sender;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("`{0}` needs a path")]
    MissingPath(&'static str),
}

/// Parse one command line. `Ok(None)` for blank lines and comments.
pub fn parse_command(line: &str) -> Result<Option<HostEvent>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let path = (!rest.is_empty()).then(|| PathBuf::from(rest));

    let event = match verb.to_ascii_lowercase().as_str() {
        "open" => HostEvent::ActiveEditorChanged(Some(path.ok_or(CommandError::MissingPath("open"))?)),
        "close" => HostEvent::ActiveEditorChanged(None),
        "save" => HostEvent::DocumentSaved(path),
        "workspace" => {
            HostEvent::WorkspaceFoldersChanged(rest.split_whitespace().map(PathBuf::from).collect())
        }
        "reload" => HostEvent::ConfigurationChanged,
        "toggle" => HostEvent::ToggleOnOff,
        "quit" | "exit" => HostEvent::Shutdown,
        _ => return Err(CommandError::Unknown(verb.to_string())),
    };
    Ok(Some(event))
}

/// Read commands from `reader` on a background thread and forward them.
///
/// End of input is reported as [`HostEvent::Shutdown`]. Unparseable lines
/// are logged and skipped.
pub fn start_command_reader<R>(reader: R, tx: Sender<HostEvent>) -> io::Result<thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("fsmonitor-commands".to_owned())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("Could not read command: {err}");
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(Some(event)) => {
                        if tx.send(event).is_err() {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => warn!("{err}"),
                }
            }
            debug!("Command stream closed");
            let _ = tx.send(HostEvent::Shutdown);
        })
}

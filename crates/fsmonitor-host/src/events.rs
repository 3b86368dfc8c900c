/// Events that drive the monitor — lightweight messages sent from producer
/// threads (save watcher, command reader) to the app thread via a
/// crossbeam channel.
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;

/// Maximum number of events that may queue up before producers block.
///
/// Every event triggers a full recomputation, so a deep backlog is never
/// useful; a small bound keeps a slow aggregation from accumulating work.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something happened in the editor host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Focus moved to another document, or to none.
    ActiveEditorChanged(Option<PathBuf>),
    /// A document was saved. `None` means the active document.
    DocumentSaved(Option<PathBuf>),
    /// The set of workspace folders changed. Empty means no workspace.
    WorkspaceFoldersChanged(Vec<PathBuf>),
    /// The settings document changed and must be reloaded.
    ConfigurationChanged,
    /// The item was clicked or the toggle command was invoked.
    ToggleOnOff,
    /// Stop processing events and dispose the status item.
    Shutdown,
}

/// Create the bounded event channel.
pub fn event_channel() -> (Sender<HostEvent>, Receiver<HostEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}

/// Status bar collaborators for FsMonitor.

pub mod recording;
pub mod status_bar;

pub use recording::{ItemState, RecordingStatusBar};
pub use status_bar::{ItemSpec, StatusBar, StatusItem, TerminalStatusBar};

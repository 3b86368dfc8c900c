/// In-memory status bar that records every item it hands out.
///
/// Useful for embedding the monitor in a host that polls state instead of
/// receiving callbacks, and for asserting on the exact item state in tests.
use super::status_bar::{ItemSpec, StatusBar, StatusItem};
use parking_lot::Mutex;
use std::sync::Arc;

/// Snapshot of one status item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemState {
    pub spec: ItemSpec,
    pub text: String,
    pub tooltip: String,
    pub command: Option<String>,
    pub error_background: bool,
    pub visible: bool,
    pub disposed: bool,
    /// Number of text changes applied to the item.
    pub text_updates: u64,
}

impl ItemState {
    fn new(spec: ItemSpec) -> Self {
        Self {
            spec,
            text: String::new(),
            tooltip: String::new(),
            command: None,
            error_background: false,
            visible: false,
            disposed: false,
            text_updates: 0,
        }
    }
}

type SharedItem = Arc<Mutex<ItemState>>;

/// Cloneable handle; every clone observes the same items.
#[derive(Clone, Default)]
pub struct RecordingStatusBar {
    items: Arc<Mutex<Vec<SharedItem>>>,
}

impl RecordingStatusBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots of every item ever created, oldest first.
    pub fn items(&self) -> Vec<ItemState> {
        self.items.lock().iter().map(|item| item.lock().clone()).collect()
    }

    /// The most recent item that has not been disposed.
    pub fn current(&self) -> Option<ItemState> {
        self.items
            .lock()
            .iter()
            .rev()
            .map(|item| item.lock().clone())
            .find(|item| !item.disposed)
    }

    /// Text of the current item if it is visible.
    pub fn visible_text(&self) -> Option<String> {
        self.current()
            .filter(|item| item.visible)
            .map(|item| item.text)
    }
}

impl StatusBar for RecordingStatusBar {
    fn create_item(&self, spec: ItemSpec) -> Box<dyn StatusItem> {
        let state = Arc::new(Mutex::new(ItemState::new(spec)));
        self.items.lock().push(Arc::clone(&state));
        Box::new(RecordingItem { state })
    }
}

struct RecordingItem {
    state: SharedItem,
}

impl RecordingItem {
    fn update(&mut self, f: impl FnOnce(&mut ItemState)) {
        let mut state = self.state.lock();
        if !state.disposed {
            f(&mut *state);
        }
    }
}

impl StatusItem for RecordingItem {
    fn set_text(&mut self, text: &str) {
        self.update(|s| {
            s.text = text.to_owned();
            s.text_updates += 1;
        });
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.update(|s| s.tooltip = tooltip.to_owned());
    }

    fn set_command(&mut self, command: &str) {
        self.update(|s| s.command = Some(command.to_owned()));
    }

    fn set_error_background(&mut self, error: bool) {
        self.update(|s| s.error_background = error);
    }

    fn show(&mut self) {
        self.update(|s| s.visible = true);
    }

    fn hide(&mut self) {
        self.update(|s| s.visible = false);
    }

    fn dispose(&mut self) {
        self.update(|s| {
            s.visible = false;
            s.disposed = true;
        });
    }
}

/// The FsMonitor event loop.
///
/// Drains [`HostEvent`]s one at a time into [`MonitorState`]. Each event
/// runs its aggregation to completion before the next one is taken, so
/// updates never interleave.
use crate::events::HostEvent;
use crate::monitor::WatchHandle;
use crate::state::MonitorState;
use crossbeam_channel::Receiver;
use tracing::info;

pub struct FsMonitorApp {
    state: MonitorState,
    watcher: Option<WatchHandle>,
}

impl FsMonitorApp {
    pub fn new(state: MonitorState) -> Self {
        Self {
            state,
            watcher: None,
        }
    }

    /// Keep `watcher` following the active document while the app runs.
    pub fn with_watcher(mut self, watcher: WatchHandle) -> Self {
        if let Some(document) = self.state.active_document() {
            watcher.watch_document(Some(document.to_path_buf()));
        }
        self.watcher = Some(watcher);
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Draw the initial status, then process events until `Shutdown` or
    /// until every sender is gone. The status item is disposed and the
    /// watcher stopped on the way out.
    pub fn run(mut self, events: Receiver<HostEvent>) -> MonitorState {
        info!("FsMonitor running");
        self.state.update_status_bar();

        for event in events.iter() {
            if let (HostEvent::ActiveEditorChanged(document), Some(watcher)) =
                (&event, self.watcher.as_ref())
            {
                watcher.watch_document(document.clone());
            }
            if !self.state.handle(event) {
                break;
            }
        }

        info!("FsMonitor shutting down");
        self.state.dispose();
        // A watcher blocked on a full channel only wakes once the receiver
        // is gone.
        drop(events);
        if let Some(watcher) = self.watcher.take() {
            watcher.join();
        }
        self.state
    }
}

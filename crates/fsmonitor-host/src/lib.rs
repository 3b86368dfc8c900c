/// FsMonitor Host — the host-integration layer.
///
/// Owns the status item lifecycle and turns editor events into status
/// updates. Aggregation and settings live in `fsmonitor-core`.
pub mod app;
pub mod commands;
pub mod events;
pub mod monitor;
pub mod state;
pub mod widgets;

pub use app::FsMonitorApp;
pub use events::HostEvent;
pub use state::MonitorState;

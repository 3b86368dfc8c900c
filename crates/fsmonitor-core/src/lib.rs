/// FsMonitor Core — folder-size aggregation, formatting, and settings.
///
/// This crate contains all business logic with zero UI dependencies.
/// The host-integration layer (status item, editor events) lives in
/// `fsmonitor-host`.
///
/// # Modules
///
/// - [`model`] — Directory entries, aggregation results, size formatting.
/// - [`platform`] — The filesystem collaborator and its `std::fs` implementation.
/// - [`aggregate`] — Recursive, filterable folder-size aggregation.
/// - [`config`] — User settings and the JSON settings source.
pub mod aggregate;
pub mod config;
pub mod model;
pub mod platform;

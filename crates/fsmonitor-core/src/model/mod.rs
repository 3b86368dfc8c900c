/// Data model for folder-size aggregation.
///
/// Re-exports the entry and result types plus the formatting helpers.
pub mod entry;
pub mod size;

pub use entry::{DirectoryEntry, EntryKind, FolderSize};

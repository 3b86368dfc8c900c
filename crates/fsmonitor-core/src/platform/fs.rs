/// Filesystem collaborator for the aggregator.
///
/// The aggregator never touches `std::fs` directly. It asks a [`FileSystem`]
/// for directory listings and file lengths, which keeps the traversal logic
/// independent of the host (real disk, editor virtual filesystem, test
/// fixture).
use crate::model::{DirectoryEntry, EntryKind};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Directory listing and file size queries.
///
/// Implementations must be shareable across threads so the parallel
/// strategy can fan out over one instance.
pub trait FileSystem: Send + Sync {
    /// List the immediate children of `path`. Order is unspecified.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>>;

    /// Length in bytes of the file at `path`.
    fn file_size(&self, path: &Path) -> io::Result<u64>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        (**self).read_dir(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        (**self).file_size(path)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        (**self).read_dir(path)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        (**self).file_size(path)
    }
}

/// [`FileSystem`] backed by `std::fs`.
///
/// Symbolic links are never followed: a link is reported as a `File` whose
/// size is the length of the link itself, so link loops cannot make a walk
/// recurse forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            // A child that fails to read is reported on its own; the rest of
            // the listing stays usable.
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!("Unreadable entry in {}: {err}", path.display());
                    entries.push(DirectoryEntry::unreadable(OsString::new()));
                    continue;
                }
            };
            // `DirEntry::file_type` does not traverse symlinks.
            let kind = match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => EntryKind::Directory,
                Ok(_) => EntryKind::File,
                Err(err) => {
                    debug!("Could not stat {}: {err}", entry.path().display());
                    EntryKind::Unreadable
                }
            };
            entries.push(DirectoryEntry::new(entry.file_name(), kind));
        }
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::symlink_metadata(path)?.len())
    }
}

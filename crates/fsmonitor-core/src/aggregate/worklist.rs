/// Sequential aggregation over an explicit worklist.
///
/// Directories waiting to be listed sit on a stack instead of the call
/// stack, so arbitrarily deep trees cannot overflow it and at most one
/// directory handle is open at any time.
use super::{size_file, ExclusionFilter};
use crate::model::{EntryKind, FolderSize};
use crate::platform::FileSystem;
use std::path::{Path, PathBuf};
use tracing::debug;

pub(crate) fn walk<F: FileSystem>(fs: &F, filter: &ExclusionFilter, root: &Path) -> FolderSize {
    let mut total = FolderSize::default();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match fs.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!("Skipping unreadable directory {}: {err}", dir.display());
                total += FolderSize::unreadable();
                continue;
            }
        };

        for entry in entries {
            if filter.matches(&entry.name) {
                continue;
            }
            let path = entry.path_in(&dir);
            match entry.kind {
                EntryKind::Directory => pending.push(path),
                EntryKind::File => total += size_file(fs, &path),
                EntryKind::Unreadable => total += FolderSize::unreadable(),
            }
        }
    }

    total
}

/// Bounded-concurrency aggregation on a dedicated rayon pool.
///
/// Each directory lists its children and fans the subtrees out as rayon
/// tasks; results are summed on the way back up. Work only ever runs on the
/// pool's worker threads, so the number of simultaneously open directory
/// or file handles never exceeds the pool size.
use super::{size_file, ExclusionFilter};
use crate::model::{EntryKind, FolderSize};
use crate::platform::FileSystem;
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

pub(crate) fn walk<F: FileSystem>(fs: &F, filter: &ExclusionFilter, dir: &Path) -> FolderSize {
    let entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!("Skipping unreadable directory {}: {err}", dir.display());
            return FolderSize::unreadable();
        }
    };

    entries
        .par_iter()
        .filter(|entry| !filter.matches(&entry.name))
        .map(|entry| {
            let path = entry.path_in(dir);
            match entry.kind {
                EntryKind::Directory => walk(fs, filter, &path),
                EntryKind::File => size_file(fs, &path),
                EntryKind::Unreadable => FolderSize::unreadable(),
            }
        })
        .sum()
}

/// Build the worker pool for `max_threads` threads (`0` = one per CPU).
pub(crate) fn build_pool(max_threads: usize) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
    let threads = if max_threads == 0 {
        num_cpus::get()
    } else {
        max_threads
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("fsmonitor-aggregate-{i}"))
        .build()
}

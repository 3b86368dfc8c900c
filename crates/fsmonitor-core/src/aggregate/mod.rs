/// Folder-size aggregation — recursive, filterable byte totals.
///
/// Provides two traversal strategies with identical results:
/// - **Worklist:** sequential walk over an explicit stack of directories.
/// - **Parallel:** recursive fan-out on a fixed-size rayon pool, which caps
///   how many filesystem handles are open at once.
///
/// Read failures never abort an aggregation. A directory that cannot be
/// listed or a file that cannot be sized contributes zero and is counted in
/// [`FolderSize::unreadable`] so callers can tell a partial total apart from
/// a genuinely small one.
pub mod filter;
mod parallel;
mod worklist;

pub use filter::ExclusionFilter;

use crate::model::FolderSize;
use crate::platform::{FileSystem, StdFileSystem};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// How the aggregator walks a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// One directory at a time on the calling thread.
    #[default]
    Worklist,
    /// Fan out over a dedicated pool of `max_threads` workers
    /// (`0` = one per CPU).
    Parallel { max_threads: usize },
}

/// Sums file lengths below one or more roots, skipping excluded entries.
///
/// Holds no state between calls: every aggregation starts from scratch, so
/// repeated calls against an unchanged tree return the same result.
pub struct FolderSizeAggregator<F: FileSystem = StdFileSystem> {
    fs: F,
    filter: ExclusionFilter,
    pool: Option<rayon::ThreadPool>,
}

impl FolderSizeAggregator<StdFileSystem> {
    /// Aggregator over the real filesystem with no exclusions.
    pub fn std() -> Self {
        Self::new(StdFileSystem)
    }
}

impl<F: FileSystem> FolderSizeAggregator<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            filter: ExclusionFilter::none(),
            pool: None,
        }
    }

    pub fn with_filter(mut self, filter: ExclusionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Select the traversal strategy.
    ///
    /// If the worker pool for [`Strategy::Parallel`] cannot be created the
    /// aggregator stays on the worklist strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.pool = match strategy {
            Strategy::Worklist => None,
            Strategy::Parallel { max_threads } => match parallel::build_pool(max_threads) {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!("Could not start aggregation pool, walking sequentially: {err}");
                    None
                }
            },
        };
        self
    }

    pub fn filter(&self) -> &ExclusionFilter {
        &self.filter
    }

    /// The strategy actually in use.
    pub fn strategy(&self) -> Strategy {
        match &self.pool {
            Some(pool) => Strategy::Parallel {
                max_threads: pool.current_num_threads(),
            },
            None => Strategy::Worklist,
        }
    }

    /// Total size of every non-excluded file below `root`.
    pub fn aggregate(&self, root: &Path) -> FolderSize {
        let start = Instant::now();
        let size = match &self.pool {
            Some(pool) => pool.install(|| parallel::walk(&self.fs, &self.filter, root)),
            None => worklist::walk(&self.fs, &self.filter, root),
        };
        debug!(
            "Aggregated {}: {} bytes in {} files ({} unreadable) in {:?}",
            root.display(),
            size.bytes,
            size.files,
            size.unreadable,
            start.elapsed()
        );
        size
    }

    /// Sum of the independent aggregation of each root.
    ///
    /// Roots share no state; with the parallel strategy they are walked
    /// concurrently in no particular order.
    pub fn aggregate_roots<P: AsRef<Path> + Sync>(&self, roots: &[P]) -> FolderSize {
        match &self.pool {
            Some(pool) => pool.install(|| {
                use rayon::prelude::*;
                roots
                    .par_iter()
                    .map(|root| parallel::walk(&self.fs, &self.filter, root.as_ref()))
                    .sum()
            }),
            None => roots.iter().map(|root| self.aggregate(root.as_ref())).sum(),
        }
    }

    /// Size of a workspace made of `roots`.
    ///
    /// Returns `None` when there is no workspace folder at all, which callers
    /// display as "no size" rather than "0 B".
    pub fn aggregate_workspace<P: AsRef<Path> + Sync>(&self, roots: &[P]) -> Option<FolderSize> {
        if roots.is_empty() {
            return None;
        }
        Some(self.aggregate_roots(roots))
    }

    /// Size of a single file, or `None` when it cannot be queried.
    pub fn file_size(&self, path: &Path) -> Option<u64> {
        match self.fs.file_size(path) {
            Ok(size) => Some(size),
            Err(err) => {
                debug!("Could not size {}: {err}", path.display());
                None
            }
        }
    }
}

/// Aggregate `root` on the real filesystem with the worklist strategy.
pub fn aggregate(root: &Path, filter: &ExclusionFilter) -> FolderSize {
    FolderSizeAggregator::std()
        .with_filter(filter.clone())
        .aggregate(root)
}

/// Size one file for the walkers, folding a failure into an unreadable entry.
fn size_file<F: FileSystem>(fs: &F, path: &Path) -> FolderSize {
    match fs.file_size(path) {
        Ok(len) => FolderSize::file(len),
        Err(err) => {
            debug!("Skipping unreadable file {}: {err}", path.display());
            FolderSize::unreadable()
        }
    }
}

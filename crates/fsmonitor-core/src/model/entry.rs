/// Directory entries and aggregation results.
///
/// A `DirectoryEntry` is what the listing collaborator hands back for one
/// child of a directory. A `FolderSize` is the outcome of aggregating a
/// subtree: the byte total plus enough bookkeeping to tell an empty tree
/// apart from one that could only be partially read.
use compact_str::CompactString;
use std::ffi::{OsStr, OsString};
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

/// Kind of a directory entry as seen by the aggregator.
///
/// Anything that is not a real directory (regular files, symlinks, devices)
/// is a `File` and contributes its own reported length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Listed, but its type could not be determined. Counts as one
    /// unreadable entry without affecting its siblings.
    Unreadable,
}

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Display form of the name, used for exclusion matching. Lossy for
    /// names that are not valid UTF-8.
    pub name: CompactString,
    /// The name exactly as the filesystem reported it.
    os_name: OsString,
    pub kind: EntryKind,
}

impl DirectoryEntry {
    pub fn new(os_name: impl Into<OsString>, kind: EntryKind) -> Self {
        let os_name = os_name.into();
        Self {
            name: CompactString::new(os_name.to_string_lossy()),
            os_name,
            kind,
        }
    }

    pub fn file(name: impl Into<OsString>) -> Self {
        Self::new(name, EntryKind::File)
    }

    pub fn dir(name: impl Into<OsString>) -> Self {
        Self::new(name, EntryKind::Directory)
    }

    pub fn unreadable(name: impl Into<OsString>) -> Self {
        Self::new(name, EntryKind::Unreadable)
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn os_name(&self) -> &OsStr {
        &self.os_name
    }

    /// Path of this entry inside `parent`, built from the raw name.
    pub fn path_in(&self, parent: &Path) -> PathBuf {
        parent.join(&self.os_name)
    }
}

/// Result of aggregating one or more subtrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FolderSize {
    /// Sum of the lengths of every counted file.
    pub bytes: u64,
    /// Number of files that contributed to `bytes`.
    pub files: u64,
    /// Entries (files or whole directories) that failed to read and were
    /// counted as zero.
    pub unreadable: u64,
}

impl FolderSize {
    /// Result for a single file of `bytes` length.
    pub fn file(bytes: u64) -> Self {
        Self {
            bytes,
            files: 1,
            unreadable: 0,
        }
    }

    /// Result for an entry that could not be read.
    pub fn unreadable() -> Self {
        Self {
            bytes: 0,
            files: 0,
            unreadable: 1,
        }
    }

    /// `true` when at least one entry was skipped because of a read failure,
    /// meaning `bytes` may under-report the real size.
    pub fn is_partial(&self) -> bool {
        self.unreadable > 0
    }
}

impl Add for FolderSize {
    type Output = FolderSize;

    fn add(self, rhs: FolderSize) -> FolderSize {
        FolderSize {
            bytes: self.bytes.saturating_add(rhs.bytes),
            files: self.files.saturating_add(rhs.files),
            unreadable: self.unreadable.saturating_add(rhs.unreadable),
        }
    }
}

impl AddAssign for FolderSize {
    fn add_assign(&mut self, rhs: FolderSize) {
        *self = *self + rhs;
    }
}

impl Sum for FolderSize {
    fn sum<I: Iterator<Item = FolderSize>>(iter: I) -> Self {
        iter.fold(FolderSize::default(), Add::add)
    }
}

/// Platform functionality — the filesystem collaborator consumed by the
/// aggregator and its `std::fs` implementation.

pub mod fs;

pub use fs::{FileSystem, StdFileSystem};

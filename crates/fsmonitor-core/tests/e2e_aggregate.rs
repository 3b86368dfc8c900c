/// End-to-end aggregation tests against a real temporary filesystem.
///
/// These exercise `StdFileSystem` together with both traversal strategies,
/// so directory listing, symlink handling, exclusion and summing are all
/// covered with no mocking.
use fsmonitor_core::aggregate::{aggregate, ExclusionFilter, FolderSizeAggregator, Strategy};
use fsmonitor_core::config::{ConfigSource, JsonConfigSource};
use fsmonitor_core::model::size::format_size;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Build the reference project:
///
/// ```text
/// proj/
///   a.txt            (10 bytes)
///   b.txt            (20 bytes)
///   node_modules/
///     c.txt          (1 000 bytes)
/// ```
fn build_project(root: &Path) {
    fs::create_dir_all(root.join("node_modules")).unwrap();
    write_bytes(&root.join("a.txt"), 10);
    write_bytes(&root.join("b.txt"), 20);
    write_bytes(&root.join("node_modules").join("c.txt"), 1_000);
}

/// A deeper tree: `depth` nested directories each holding one 100-byte file.
fn build_deep_tree(root: &Path, depth: usize) -> u64 {
    let mut dir = root.to_path_buf();
    for level in 0..depth {
        dir = dir.join(format!("level{level}"));
        fs::create_dir_all(&dir).unwrap();
        write_bytes(&dir.join("data.bin"), 100);
    }
    depth as u64 * 100
}

fn write_bytes(path: &Path, n: usize) {
    let mut f = fs::File::create(path).unwrap();
    f.write_all(&vec![0u8; n]).unwrap();
}

fn strategies() -> [Strategy; 3] {
    [
        Strategy::Worklist,
        Strategy::Parallel { max_threads: 1 },
        Strategy::Parallel { max_threads: 4 },
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[test]
fn project_total_without_exclusion() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_project(tmp.path());

    assert_eq!(aggregate(tmp.path(), &ExclusionFilter::none()).bytes, 1_030);
}

#[test]
fn project_total_with_node_modules_excluded() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    build_project(tmp.path());

    let size = aggregate(tmp.path(), &ExclusionFilter::new("node_modules"));
    assert_eq!(size.bytes, 30);
    assert_eq!(size.files, 2);
    assert_eq!(format_size(size.bytes), "30 B");
}

#[test]
fn empty_directory_is_zero() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let size = aggregate(tmp.path(), &ExclusionFilter::none());
    assert_eq!(size.bytes, 0);
    assert_eq!(size.files, 0);
    assert!(!size.is_partial());
}

#[test]
fn strategies_agree_on_deep_trees() {
    let tmp = TempDir::new().expect("failed to create temp dir");
    let expected = build_deep_tree(tmp.path(), 40);

    for strategy in strategies() {
        let agg = FolderSizeAggregator::std().with_strategy(strategy);
        assert_eq!(agg.aggregate(tmp.path()).bytes, expected, "{strategy:?}");
    }
}

#[test]
fn disjoint_roots_sum_to_multi_root_total() {
    let one = TempDir::new().unwrap();
    let two = TempDir::new().unwrap();
    build_project(one.path());
    write_bytes(&two.path().join("x.bin"), 500);

    for strategy in strategies() {
        let agg = FolderSizeAggregator::std().with_strategy(strategy);
        let separate = agg.aggregate(one.path()).bytes + agg.aggregate(two.path()).bytes;
        let combined = agg.aggregate_roots(&[one.path(), two.path()]);
        assert_eq!(combined.bytes, separate);
        assert_eq!(combined.bytes, 1_530);
    }
}

#[test]
fn missing_root_contributes_zero() {
    let tmp = TempDir::new().unwrap();
    build_project(tmp.path());
    let gone = tmp.path().join("deleted");

    let agg = FolderSizeAggregator::std();
    let size = agg.aggregate_roots(&[tmp.path().to_path_buf(), gone]);
    assert_eq!(size.bytes, 1_030);
    assert_eq!(size.unreadable, 1);
}

#[test]
fn repeated_aggregation_is_stable() {
    let tmp = TempDir::new().unwrap();
    build_project(tmp.path());
    build_deep_tree(&tmp.path().join("deep"), 5);

    let agg = FolderSizeAggregator::std().with_strategy(Strategy::Parallel { max_threads: 0 });
    let first = agg.aggregate(tmp.path());
    for _ in 0..3 {
        assert_eq!(agg.aggregate(tmp.path()), first);
    }
}

#[cfg(unix)]
#[test]
fn symlink_loop_terminates() {
    let tmp = TempDir::new().unwrap();
    build_project(tmp.path());
    std::os::unix::fs::symlink(tmp.path(), tmp.path().join("node_modules").join("self")).unwrap();

    let size = FolderSizeAggregator::std()
        .with_filter(ExclusionFilter::new("node_modules"))
        .aggregate(tmp.path());
    assert_eq!(size.bytes, 30);
}

// Linux only: macOS filesystems reject names that are not valid UTF-8.
#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_counted_in_full() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let tmp = TempDir::new().unwrap();
    write_bytes(&tmp.path().join("ok.bin"), 10);
    write_bytes(&tmp.path().join(OsStr::from_bytes(b"bad\xff.bin")), 1_000);
    let sub = tmp.path().join(OsStr::from_bytes(b"dir\xfe"));
    fs::create_dir(&sub).unwrap();
    write_bytes(&sub.join("inner.bin"), 500);

    for strategy in strategies() {
        let size = FolderSizeAggregator::std()
            .with_strategy(strategy)
            .aggregate(tmp.path());
        assert_eq!(size.bytes, 1_510, "{strategy:?}");
        assert_eq!(size.files, 3);
        assert!(!size.is_partial());
    }
    assert_eq!(aggregate(tmp.path(), &ExclusionFilter::none()).bytes, 1_510);
}

#[test]
fn settings_file_drives_the_filter() {
    let tmp = TempDir::new().unwrap();
    build_project(&tmp.path().join("proj"));
    let settings_path = tmp.path().join("settings.json");
    fs::write(&settings_path, r#"{ "fsMonitor": { "ignoreNodeModules": true } }"#).unwrap();

    let settings = JsonConfigSource::new(&settings_path).load().unwrap();
    let agg = FolderSizeAggregator::std()
        .with_filter(settings.exclusion_filter())
        .with_strategy(settings.strategy());

    assert_eq!(agg.aggregate(&tmp.path().join("proj")).bytes, 30);
}

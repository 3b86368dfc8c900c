/// Save watcher — turns on-disk changes into host events.
///
/// Polls the modification time of the active document and of the settings
/// file on a background thread. A changed document produces
/// [`HostEvent::DocumentSaved`]; a changed settings file produces
/// [`HostEvent::ConfigurationChanged`].
///
/// # Usage
///
/// ```ignore
/// let (tx, rx) = event_channel();
/// let handle = start_save_watcher(Some(settings_path), Duration::from_secs(1), tx)?;
/// handle.watch_document(Some(PathBuf::from("src/main.rs")));
/// // receive events on rx
/// handle.stop();
/// ```
///
/// # Cancellation
///
/// [`WatchHandle::stop`] sets a flag the thread checks at least every
/// [`CANCEL_POLL`]; it also exits as soon as the event receiver is dropped.
use crate::events::HostEvent;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime};
use tracing::{debug, trace};

/// Longest the thread sleeps before re-checking the cancel flag.
pub const CANCEL_POLL: Duration = Duration::from_millis(200);

/// What the watcher is currently looking at.
#[derive(Debug, Default)]
struct WatchTargets {
    document: Option<PathBuf>,
    settings: Option<PathBuf>,
}

/// Handle to a running save watcher.
///
/// Dropping the handle does not stop the thread; call [`WatchHandle::stop`].
pub struct WatchHandle {
    cancel: Arc<AtomicBool>,
    targets: Arc<Mutex<WatchTargets>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl WatchHandle {
    /// Follow a different document, or none. The new document's current
    /// modification time becomes the baseline, so switching never reports a
    /// save on its own.
    pub fn watch_document(&self, document: Option<PathBuf>) {
        self.targets.lock().document = document;
    }

    /// Signal the background thread to stop. Non-blocking.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Stop and wait for the thread to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Start polling every `interval`.
pub fn start_save_watcher(
    settings: Option<PathBuf>,
    interval: Duration,
    tx: Sender<HostEvent>,
) -> io::Result<WatchHandle> {
    let cancel = Arc::new(AtomicBool::new(false));
    let targets = Arc::new(Mutex::new(WatchTargets {
        document: None,
        settings,
    }));

    let cancel_clone = Arc::clone(&cancel);
    let targets_clone = Arc::clone(&targets);
    let thread = thread::Builder::new()
        .name("fsmonitor-watcher".to_owned())
        .spawn(move || run_watcher(targets_clone, cancel_clone, interval, tx))?;

    Ok(WatchHandle {
        cancel,
        targets,
        thread: Some(thread),
    })
}

// ─── Background thread ──────────────────────────────────────────────────────

fn run_watcher(
    targets: Arc<Mutex<WatchTargets>>,
    cancel: Arc<AtomicBool>,
    interval: Duration,
    tx: Sender<HostEvent>,
) {
    debug!("Watcher: started, polling every {interval:?}");
    let mut seen: HashMap<PathBuf, Option<SystemTime>> = HashMap::new();

    'outer: loop {
        let (document, settings) = {
            let targets = targets.lock();
            (targets.document.clone(), targets.settings.clone())
        };

        // Forget paths we no longer watch so a later re-watch starts fresh.
        seen.retain(|path, _| {
            Some(path) == document.as_ref() || Some(path) == settings.as_ref()
        });

        let mut events = Vec::new();
        if let Some(path) = document {
            if changed(&mut seen, &path) {
                events.push(HostEvent::DocumentSaved(Some(path)));
            }
        }
        if let Some(path) = settings {
            if changed(&mut seen, &path) {
                events.push(HostEvent::ConfigurationChanged);
            }
        }
        for event in events {
            trace!("Watcher: sending {event:?}");
            if tx.send(event).is_err() {
                break 'outer;
            }
        }

        // Sleep in short slices so `stop` takes effect promptly.
        let deadline = Instant::now() + interval;
        loop {
            if cancel.load(Ordering::Relaxed) {
                break 'outer;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(CANCEL_POLL.min(deadline - now));
        }
    }

    debug!("Watcher: stopped");
}

/// Record the current modification time of `path` and report whether it
/// differs from the previous observation. The first observation is only a
/// baseline. A file that appears or disappears counts as a change.
fn changed(seen: &mut HashMap<PathBuf, Option<SystemTime>>, path: &Path) -> bool {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
    match seen.insert(path.to_path_buf(), modified) {
        Some(previous) => previous != modified,
        None => false,
    }
}

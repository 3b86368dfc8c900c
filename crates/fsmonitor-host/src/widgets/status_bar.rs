/// Status bar collaborator — the host-owned bar and the item we place on it.
///
/// The controller never draws anything itself. It asks a [`StatusBar`] for
/// an item, updates it, and disposes it when settings move it elsewhere or
/// the monitor shuts down.
use fsmonitor_core::config::Alignment;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::warn;

/// Identifier of the size item.
pub const ITEM_ID: &str = "fsMonitor.fileSizeStatus";

/// Command bound to clicks on the item.
pub const TOGGLE_COMMAND: &str = "fsMonitor.toggleOnOff";

/// Placement of a new status item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub id: String,
    pub alignment: Alignment,
    pub priority: i32,
}

/// A single item on the host's status bar.
pub trait StatusItem: Send {
    fn set_text(&mut self, text: &str);
    fn set_tooltip(&mut self, tooltip: &str);
    fn set_command(&mut self, command: &str);
    /// Paint the item with the host's error colours.
    fn set_error_background(&mut self, error: bool);
    fn show(&mut self);
    fn hide(&mut self);
    /// Remove the item from the bar. Later calls on a disposed item are ignored.
    fn dispose(&mut self);
}

/// The host's status bar.
pub trait StatusBar: Send {
    fn create_item(&self, spec: ItemSpec) -> Box<dyn StatusItem>;
}

/// Status bar that prints each visible change of its items as one line.
///
/// Lines look like `[left:100] file 2.5 KB | folder 1.01 MB`. Icon
/// placeholders such as `$(file)` are rendered as plain words and error
/// styling as a trailing `(!)`.
pub struct TerminalStatusBar<W: Write + Send + 'static> {
    out: Arc<Mutex<W>>,
}

impl TerminalStatusBar<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalStatusBar<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(out)),
        }
    }

    /// Shared handle to the underlying writer.
    pub fn writer(&self) -> Arc<Mutex<W>> {
        Arc::clone(&self.out)
    }
}

impl<W: Write + Send + 'static> StatusBar for TerminalStatusBar<W> {
    fn create_item(&self, spec: ItemSpec) -> Box<dyn StatusItem> {
        Box::new(TerminalStatusItem {
            spec,
            text: String::new(),
            error: false,
            visible: false,
            disposed: false,
            last_line: None,
            out: Arc::clone(&self.out),
        })
    }
}

struct TerminalStatusItem<W: Write + Send> {
    spec: ItemSpec,
    text: String,
    error: bool,
    visible: bool,
    disposed: bool,
    /// Last line written, so unchanged redraws stay silent.
    last_line: Option<String>,
    out: Arc<Mutex<W>>,
}

impl<W: Write + Send> TerminalStatusItem<W> {
    fn redraw(&mut self) {
        if !self.visible || self.disposed {
            return;
        }
        let mut line = format!(
            "[{}:{}] {}",
            self.spec.alignment.label(),
            self.spec.priority,
            render_icons(&self.text)
        );
        if self.error {
            line.push_str(" (!)");
        }
        if self.last_line.as_deref() == Some(line.as_str()) {
            return;
        }

        let mut out = self.out.lock();
        if let Err(err) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            warn!("Could not write status line: {err}");
            return;
        }
        self.last_line = Some(line);
    }
}

impl<W: Write + Send> StatusItem for TerminalStatusItem<W> {
    fn set_text(&mut self, text: &str) {
        self.text = text.to_owned();
        self.redraw();
    }

    // Tooltips and click commands have no terminal rendering.
    fn set_tooltip(&mut self, _tooltip: &str) {}

    fn set_command(&mut self, _command: &str) {}

    fn set_error_background(&mut self, error: bool) {
        self.error = error;
        self.redraw();
    }

    fn show(&mut self) {
        self.visible = true;
        self.redraw();
    }

    fn hide(&mut self) {
        self.visible = false;
        self.last_line = None;
    }

    fn dispose(&mut self) {
        self.hide();
        self.disposed = true;
    }
}

/// Replace `$(icon)` placeholders with the bare icon name.
fn render_icons(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                out.push_str(&after[..end]);
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

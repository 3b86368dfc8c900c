/// Monitor state management.
///
/// Centralises everything the status item shows: the enabled switch, the
/// current settings, the workspace folders and the active document. Every
/// trigger recomputes the sizes from scratch and fully overwrites the item
/// text, so the last update to finish is the one on screen.
use crate::events::HostEvent;
use crate::widgets::status_bar::{ItemSpec, StatusBar, StatusItem, ITEM_ID, TOGGLE_COMMAND};
use chrono::{DateTime, Local};
use fsmonitor_core::aggregate::FolderSizeAggregator;
use fsmonitor_core::config::{ConfigSource, Settings};
use fsmonitor_core::model::size::{format_count, format_size};
use fsmonitor_core::model::FolderSize;
use fsmonitor_core::platform::FileSystem;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name shown in tooltips and log lines.
pub const DISPLAY_NAME: &str = "FS Monitor";

/// Item text while the monitor is switched off.
pub const DISABLED_TEXT: &str = "Disabled";

/// Item text between switching on and the first computed sizes.
pub const ENABLING_TEXT: &str = "Enabling...";

/// Documents whose path ends with this suffix are editor-internal views of
/// version control state, not files worth sizing.
const IGNORED_DOCUMENT_SUFFIX: &str = ".git";

type SharedFs = Arc<dyn FileSystem>;

/// All monitor state.
pub struct MonitorState {
    bar: Box<dyn StatusBar>,
    config: Box<dyn ConfigSource>,
    fs: SharedFs,
    aggregator: FolderSizeAggregator<SharedFs>,
    settings: Settings,
    enabled: bool,
    item: Option<Box<dyn StatusItem>>,

    // ── Editor context ─────────────────────────────────
    workspace_folders: Vec<PathBuf>,
    active_document: Option<PathBuf>,

    // ── Last update ────────────────────────────────────
    last_folder_size: Option<FolderSize>,
    last_updated: Option<DateTime<Local>>,
}

impl MonitorState {
    /// Load settings and create the (hidden) status item.
    ///
    /// Unreadable settings are logged and replaced by the defaults.
    pub fn new(bar: Box<dyn StatusBar>, config: Box<dyn ConfigSource>, fs: SharedFs) -> Self {
        let settings = config.load().unwrap_or_else(|err| {
            warn!("{err}; using default settings");
            Settings::default()
        });
        let aggregator = build_aggregator(&fs, &settings);

        let mut state = Self {
            bar,
            config,
            fs,
            aggregator,
            enabled: settings.enabled,
            settings,
            item: None,
            workspace_folders: Vec::new(),
            active_document: None,
            last_folder_size: None,
            last_updated: None,
        };
        let mut item = state.create_status_item();
        item.hide();
        state.item = Some(item);

        info!(
            "{DISPLAY_NAME} was successfully activated ({})",
            if state.enabled { "enabled" } else { "disabled" }
        );
        state
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn workspace_folders(&self) -> &[PathBuf] {
        &self.workspace_folders
    }

    pub fn active_document(&self) -> Option<&Path> {
        self.active_document.as_deref()
    }

    /// Folder total computed by the most recent update, if any.
    pub fn last_folder_size(&self) -> Option<FolderSize> {
        self.last_folder_size
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }

    pub fn set_workspace_folders(&mut self, folders: Vec<PathBuf>) {
        self.workspace_folders = folders;
    }

    pub fn set_active_document(&mut self, document: Option<PathBuf>) {
        self.active_document = document;
    }

    /// Apply one host event. Returns `false` once the monitor should stop.
    pub fn handle(&mut self, event: HostEvent) -> bool {
        debug!("Handling {event:?}");
        match event {
            HostEvent::ActiveEditorChanged(document) => {
                self.set_active_document(document);
                self.update_status_bar();
            }
            HostEvent::DocumentSaved(_) => self.update_status_bar(),
            HostEvent::WorkspaceFoldersChanged(folders) => {
                self.set_workspace_folders(folders);
                self.update_status_bar();
            }
            HostEvent::ConfigurationChanged => self.update_configuration(),
            HostEvent::ToggleOnOff => self.toggle_on_off(),
            HostEvent::Shutdown => return false,
        }
        true
    }

    /// Recompute both sizes and redraw the item.
    ///
    /// When neither a document nor a workspace is available the item is
    /// hidden rather than showing a zero.
    pub fn update_status_bar(&mut self) {
        if !self.enabled {
            if let Some(item) = self.item.as_mut() {
                item.set_text(DISABLED_TEXT);
                item.set_error_background(true);
                item.show();
            }
            return;
        }

        let file_size = self.current_file_size();
        let folder_size = self
            .aggregator
            .aggregate_workspace(&self.workspace_folders);
        self.last_folder_size = folder_size;
        self.last_updated = Some(Local::now());

        if let Some(size) = folder_size.filter(FolderSize::is_partial) {
            warn!(
                "{} entries could not be read; workspace size may be under-reported",
                size.unreadable
            );
        }

        let text = compose_status_text(
            file_size.map(format_size).as_deref(),
            folder_size.map(|s| format_size(s.bytes)).as_deref(),
        );
        let tooltip = self.tooltip(folder_size);

        let Some(item) = self.item.as_mut() else {
            return;
        };
        match text {
            Some(text) => {
                debug!("Status: {text}");
                item.set_text(&text);
                item.set_tooltip(&tooltip);
                item.show();
            }
            None => {
                debug!("Nothing to size, hiding status item");
                item.hide();
            }
        }
    }

    /// Flip the enabled switch and persist it.
    ///
    /// A failure to persist is logged; the switch still flips for this
    /// session.
    pub fn toggle_on_off(&mut self) {
        self.enabled = !self.enabled;
        self.settings.enabled = self.enabled;
        if let Err(err) = self.config.set_enabled(self.enabled) {
            warn!("Could not persist enabled = {}: {err}", self.enabled);
        }

        if self.enabled {
            if let Some(item) = self.item.as_mut() {
                item.set_error_background(false);
                item.set_text(ENABLING_TEXT);
                item.show();
            }
            self.update_status_bar();
            info!("{DISPLAY_NAME} has been enabled!");
        } else {
            if let Some(item) = self.item.as_mut() {
                item.set_text(DISABLED_TEXT);
                item.set_error_background(true);
                item.show();
            }
            info!("{DISPLAY_NAME} has been disabled!");
        }
    }

    /// Reload settings, recreate the item at its new position and redraw.
    ///
    /// If the settings cannot be read the previous ones stay in effect.
    pub fn update_configuration(&mut self) {
        match self.config.load() {
            Ok(settings) => {
                self.aggregator = build_aggregator(&self.fs, &settings);
                self.enabled = settings.enabled;
                self.settings = settings;
            }
            Err(err) => {
                warn!("{err}; keeping previous settings");
            }
        }

        if let Some(mut old) = self.item.take() {
            old.hide();
            old.dispose();
        }
        self.item = Some(self.create_status_item());
        self.update_status_bar();
    }

    /// Remove the item from the bar.
    pub fn dispose(&mut self) {
        if let Some(mut item) = self.item.take() {
            item.dispose();
        }
    }

    fn create_status_item(&self) -> Box<dyn StatusItem> {
        let mut item = self.bar.create_item(ItemSpec {
            id: ITEM_ID.to_string(),
            alignment: self.settings.position,
            priority: self.settings.priority,
        });
        item.set_command(TOGGLE_COMMAND);
        item.set_tooltip(&format!("Toggle {DISPLAY_NAME} On/Off"));

        if !self.enabled {
            item.set_text(DISABLED_TEXT);
            item.set_error_background(true);
            info!("{DISPLAY_NAME} has been disabled!");
        }
        item
    }

    fn current_file_size(&self) -> Option<u64> {
        let document = self.active_document.as_deref()?;
        if document
            .to_string_lossy()
            .ends_with(IGNORED_DOCUMENT_SUFFIX)
        {
            return None;
        }
        self.aggregator.file_size(document)
    }

    fn tooltip(&self, folder_size: Option<FolderSize>) -> String {
        let mut tooltip = format!("Toggle {DISPLAY_NAME} On/Off");
        if let Some(size) = folder_size {
            tooltip.push_str(&format!("\n{} files", format_count(size.files)));
            if size.is_partial() {
                tooltip.push_str(&format!(
                    " ({} unreadable, partial)",
                    format_count(size.unreadable)
                ));
            }
        }
        if let Some(updated) = self.last_updated {
            tooltip.push_str(&format!("\nUpdated {}", updated.format("%H:%M:%S")));
        }
        tooltip
    }
}

fn build_aggregator(fs: &SharedFs, settings: &Settings) -> FolderSizeAggregator<SharedFs> {
    FolderSizeAggregator::new(Arc::clone(fs))
        .with_filter(settings.exclusion_filter())
        .with_strategy(settings.strategy())
}

/// Build the item text from the formatted sizes.
///
/// Returns `None` when there is nothing to show.
pub fn compose_status_text(file: Option<&str>, folder: Option<&str>) -> Option<String> {
    match (file, folder) {
        (None, None) => None,
        (Some(file), None) => Some(format!("$(file) {file}")),
        (None, Some(folder)) => Some(format!("$(folder) {folder}")),
        (Some(file), Some(folder)) => Some(format!("$(file) {file} | $(folder) {folder}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::RecordingStatusBar;
    use fsmonitor_core::config::{Alignment, ConfigError};
    use fsmonitor_core::model::DirectoryEntry;
    use parking_lot::Mutex;
    use std::io;

    /// Settings held in memory; records every persisted switch.
    #[derive(Clone, Default)]
    struct MemoryConfig {
        settings: Arc<Mutex<Settings>>,
        fail_writes: bool,
    }

    impl ConfigSource for MemoryConfig {
        fn load(&self) -> Result<Settings, ConfigError> {
            Ok(self.settings.lock().clone())
        }

        fn set_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
            if self.fail_writes {
                return Err(ConfigError::Io {
                    path: PathBuf::from("memory"),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                });
            }
            self.settings.lock().enabled = enabled;
            Ok(())
        }
    }

    /// `/ws` holds `a.txt` (10) and `node_modules/big.js` (2048).
    struct FixedFs;

    impl FileSystem for FixedFs {
        fn read_dir(&self, path: &Path) -> io::Result<Vec<DirectoryEntry>> {
            match path.to_str() {
                Some("/ws") => Ok(vec![
                    DirectoryEntry::file("a.txt"),
                    DirectoryEntry::dir("node_modules"),
                ]),
                Some("/ws/node_modules") => Ok(vec![DirectoryEntry::file("big.js")]),
                _ => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        fn file_size(&self, path: &Path) -> io::Result<u64> {
            match path.to_str() {
                Some("/ws/a.txt") => Ok(10),
                Some("/ws/node_modules/big.js") => Ok(2048),
                Some("/ws/.git") => Ok(1),
                _ => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }
    }

    fn monitor(settings: Settings) -> (MonitorState, RecordingStatusBar, MemoryConfig) {
        let bar = RecordingStatusBar::new();
        let config = MemoryConfig {
            settings: Arc::new(Mutex::new(settings)),
            fail_writes: false,
        };
        let state = MonitorState::new(
            Box::new(bar.clone()),
            Box::new(config.clone()),
            Arc::new(FixedFs),
        );
        (state, bar, config)
    }

    #[test]
    fn test_compose_status_text() {
        assert_eq!(compose_status_text(None, None), None);
        assert_eq!(
            compose_status_text(Some("1 KB"), None).as_deref(),
            Some("$(file) 1 KB")
        );
        assert_eq!(
            compose_status_text(None, Some("2 MB")).as_deref(),
            Some("$(folder) 2 MB")
        );
        assert_eq!(
            compose_status_text(Some("1 KB"), Some("2 MB")).as_deref(),
            Some("$(file) 1 KB | $(folder) 2 MB")
        );
    }

    #[test]
    fn test_new_item_is_hidden_with_toggle_command() {
        let (_state, bar, _) = monitor(Settings::default());
        let item = bar.current().unwrap();
        assert!(!item.visible);
        assert_eq!(item.command.as_deref(), Some(TOGGLE_COMMAND));
        assert_eq!(item.spec.id, ITEM_ID);
        assert_eq!(item.spec.priority, 100);
    }

    #[test]
    fn test_nothing_to_show_hides_item() {
        let (mut state, bar, _) = monitor(Settings::default());
        state.update_status_bar();
        assert_eq!(bar.visible_text(), None);
        assert_eq!(state.last_folder_size(), None);
    }

    #[test]
    fn test_file_and_folder_text() {
        let (mut state, bar, _) = monitor(Settings::default());
        state.set_workspace_folders(vec![PathBuf::from("/ws")]);
        state.set_active_document(Some(PathBuf::from("/ws/a.txt")));
        state.update_status_bar();

        assert_eq!(
            bar.visible_text().as_deref(),
            Some("$(file) 10 B | $(folder) 2.01 KB")
        );
        assert!(bar.current().unwrap().tooltip.contains("2 files"));
    }

    #[test]
    fn test_exclusion_from_settings() {
        let (mut state, bar, _) = monitor(Settings {
            ignore_node_modules: true,
            ..Settings::default()
        });
        assert!(state.handle(HostEvent::WorkspaceFoldersChanged(vec![PathBuf::from("/ws")])));
        assert_eq!(bar.visible_text().as_deref(), Some("$(folder) 10 B"));
    }

    #[test]
    fn test_git_documents_are_not_sized() {
        let (mut state, bar, _) = monitor(Settings::default());
        state.handle(HostEvent::ActiveEditorChanged(Some(PathBuf::from("/ws/.git"))));
        assert_eq!(bar.visible_text(), None);

        state.handle(HostEvent::ActiveEditorChanged(Some(PathBuf::from("/ws/a.txt"))));
        assert_eq!(bar.visible_text().as_deref(), Some("$(file) 10 B"));
    }

    #[test]
    fn test_unreadable_document_is_omitted() {
        let (mut state, bar, _) = monitor(Settings::default());
        state.set_workspace_folders(vec![PathBuf::from("/ws")]);
        state.handle(HostEvent::ActiveEditorChanged(Some(PathBuf::from("/ws/gone.txt"))));
        assert_eq!(bar.visible_text().as_deref(), Some("$(folder) 2.01 KB"));
    }

    #[test]
    fn test_partial_workspace_is_flagged_in_tooltip() {
        let (mut state, bar, _) = monitor(Settings::default());
        state.handle(HostEvent::WorkspaceFoldersChanged(vec![
            PathBuf::from("/ws"),
            PathBuf::from("/missing"),
        ]));
        assert_eq!(bar.visible_text().as_deref(), Some("$(folder) 2.01 KB"));
        assert!(state.last_folder_size().unwrap().is_partial());
        assert!(bar.current().unwrap().tooltip.contains("partial"));
    }

    #[test]
    fn test_disabled_shows_disabled_and_skips_work() {
        let (mut state, bar, _) = monitor(Settings {
            enabled: false,
            ..Settings::default()
        });
        state.set_workspace_folders(vec![PathBuf::from("/ws")]);
        state.update_status_bar();

        let item = bar.current().unwrap();
        assert!(item.visible);
        assert!(item.error_background);
        assert_eq!(item.text, DISABLED_TEXT);
        assert_eq!(state.last_folder_size(), None);
    }

    #[test]
    fn test_toggle_twice_restores_sizes_and_persists() {
        let (mut state, bar, config) = monitor(Settings::default());
        state.handle(HostEvent::WorkspaceFoldersChanged(vec![PathBuf::from("/ws")]));

        state.handle(HostEvent::ToggleOnOff);
        assert!(!state.enabled());
        assert!(!config.settings.lock().enabled);
        assert_eq!(bar.visible_text().as_deref(), Some(DISABLED_TEXT));

        state.handle(HostEvent::ToggleOnOff);
        assert!(state.enabled());
        assert!(config.settings.lock().enabled);
        let item = bar.current().unwrap();
        assert!(!item.error_background);
        assert_eq!(item.text, "$(folder) 2.01 KB");
    }

    #[test]
    fn test_toggle_survives_persist_failure() {
        let bar = RecordingStatusBar::new();
        let config = MemoryConfig {
            fail_writes: true,
            ..MemoryConfig::default()
        };
        let mut state = MonitorState::new(Box::new(bar.clone()), Box::new(config), Arc::new(FixedFs));

        state.toggle_on_off();
        assert!(!state.enabled());
        assert_eq!(bar.visible_text().as_deref(), Some(DISABLED_TEXT));
    }

    #[test]
    fn test_configuration_change_recreates_item() {
        let (mut state, bar, config) = monitor(Settings::default());
        state.set_workspace_folders(vec![PathBuf::from("/ws")]);
        state.update_status_bar();

        {
            let mut settings = config.settings.lock();
            settings.position = Alignment::Right;
            settings.priority = 3;
            settings.exclude = Some("node_modules".into());
        }
        state.handle(HostEvent::ConfigurationChanged);

        let items = bar.items();
        assert_eq!(items.len(), 2);
        assert!(items[0].disposed);
        let current = bar.current().unwrap();
        assert_eq!(current.spec.alignment, Alignment::Right);
        assert_eq!(current.spec.priority, 3);
        assert_eq!(bar.visible_text().as_deref(), Some("$(folder) 10 B"));
    }

    #[test]
    fn test_configuration_can_disable() {
        let (mut state, bar, config) = monitor(Settings::default());
        config.settings.lock().enabled = false;
        state.handle(HostEvent::ConfigurationChanged);

        assert!(!state.enabled());
        assert_eq!(bar.visible_text().as_deref(), Some(DISABLED_TEXT));
    }

    #[test]
    fn test_shutdown_stops_and_dispose_removes_item() {
        let (mut state, bar, _) = monitor(Settings::default());
        assert!(!state.handle(HostEvent::Shutdown));
        state.dispose();
        assert!(bar.current().is_none());
    }
}

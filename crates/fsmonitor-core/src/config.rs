/// User settings — what to show, where, and what to leave out of the totals.
///
/// Settings live in a JSON document. Three layouts are accepted so the same
/// file can be shared with an editor's own settings:
///
/// ```text
/// { "enabled": true, "exclude": "node_modules" }              // flat
/// { "fsMonitor": { "enabled": true } }                         // section
/// { "fsMonitor.enabled": true, "editor.fontSize": 12 }         // dotted
/// ```
///
/// Unknown keys are ignored. Missing keys take their defaults.
use crate::aggregate::{ExclusionFilter, Strategy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Settings section name, also the prefix for dotted keys.
pub const SECTION: &str = "fsMonitor";

/// Pattern used by the legacy `ignoreNodeModules` switch.
pub const NODE_MODULES: &str = "node_modules";

/// Errors raised while reading or writing the settings document.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("settings file {0} must contain a JSON object")]
    NotAnObject(PathBuf),
}

/// Side of the status bar the item is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
}

impl Alignment {
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Resolved user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Master switch. When off the item only shows `Disabled`.
    pub enabled: bool,
    pub position: Alignment,
    /// Higher values are placed further towards the edge of the bar.
    pub priority: i32,
    /// Entries whose name contains this pattern are left out of folder totals.
    pub exclude: Option<String>,
    /// Older switch equivalent to `exclude = "node_modules"`.
    pub ignore_node_modules: bool,
    /// Upper bound on concurrent filesystem work. Unset or `1` walks
    /// sequentially, `0` uses one worker per CPU.
    pub max_concurrency: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            position: Alignment::Left,
            priority: 100,
            exclude: None,
            ignore_node_modules: false,
            max_concurrency: None,
        }
    }
}

impl Settings {
    /// Parse settings from any of the accepted document layouts.
    pub fn from_document(doc: &Value) -> Result<Self, serde_json::Error> {
        let section = match doc {
            Value::Object(map) => section_of(map),
            _ => Map::new(),
        };
        serde_json::from_value(Value::Object(section))
    }

    /// The exclusion filter the aggregator should use.
    ///
    /// An explicit `exclude` pattern wins over `ignoreNodeModules`.
    pub fn exclusion_filter(&self) -> ExclusionFilter {
        match self.exclude.as_deref() {
            Some(pattern) if !pattern.is_empty() => ExclusionFilter::new(pattern),
            _ if self.ignore_node_modules => ExclusionFilter::new(NODE_MODULES),
            _ => ExclusionFilter::none(),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self.max_concurrency {
            None | Some(1) => Strategy::Worklist,
            Some(max_threads) => Strategy::Parallel { max_threads },
        }
    }
}

/// Layout a settings document was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Flat,
    Section,
    Dotted,
}

fn layout_of(map: &Map<String, Value>) -> Layout {
    if map.get(SECTION).is_some_and(Value::is_object) {
        Layout::Section
    } else if map.keys().any(|k| dotted_key(k).is_some()) {
        Layout::Dotted
    } else {
        Layout::Flat
    }
}

fn dotted_key(key: &str) -> Option<&str> {
    key.strip_prefix(SECTION)?.strip_prefix('.')
}

/// Extract the flat `fsMonitor` settings object from a document.
fn section_of(map: &Map<String, Value>) -> Map<String, Value> {
    match layout_of(map) {
        Layout::Section => match map.get(SECTION) {
            Some(Value::Object(section)) => section.clone(),
            _ => Map::new(),
        },
        Layout::Dotted => map
            .iter()
            .filter_map(|(k, v)| dotted_key(k).map(|k| (k.to_string(), v.clone())))
            .collect(),
        Layout::Flat => map.clone(),
    }
}

/// Source of [`Settings`], read once per status update.
pub trait ConfigSource: Send {
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Persist the master switch.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), ConfigError>;
}

/// [`ConfigSource`] backed by a JSON file on disk.
///
/// A missing file means "all defaults". Writing preserves every key other
/// than the one being changed and keeps the document's layout.
#[derive(Debug, Clone)]
pub struct JsonConfigSource {
    path: PathBuf,
}

impl JsonConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw document. `Ok(None)` when the file does not exist.
    fn read_document(&self) -> Result<Option<Map<String, Value>>, ConfigError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(Some(Map::new()));
        }
        let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            _ => Err(ConfigError::NotAnObject(self.path.clone())),
        }
    }
}

impl ConfigSource for JsonConfigSource {
    fn load(&self) -> Result<Settings, ConfigError> {
        let Some(map) = self.read_document()? else {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        };
        serde_json::from_value(Value::Object(section_of(&map))).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), ConfigError> {
        let mut map = self.read_document()?.unwrap_or_default();
        match layout_of(&map) {
            Layout::Section => {
                if let Some(Value::Object(section)) = map.get_mut(SECTION) {
                    section.insert("enabled".into(), Value::Bool(enabled));
                }
            }
            Layout::Dotted => {
                map.insert(format!("{SECTION}.enabled"), Value::Bool(enabled));
            }
            Layout::Flat => {
                map.insert("enabled".into(), Value::Bool(enabled));
            }
        }

        let mut text = serde_json::to_string_pretty(&Value::Object(map)).map_err(|source| {
            ConfigError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        text.push('\n');
        std::fs::write(&self.path, text).map_err(|source| ConfigError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

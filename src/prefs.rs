//! Persisted UI state.
//!
//! A [`PreferenceStore`] is a plain string key/value store. [`Preferences`]
//! layers typed, best-effort accessors on top of it: a missing or unreadable
//! value reads as the default and a failed write is logged and dropped, except
//! for the content tree snapshot whose write result is reported to the caller.

use crate::error::{Error, Result};
use crate::model::ContentTree;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const KEY_TREE: &str = "content_tree";
const KEY_TREE_TIME: &str = "content_tree_time";
const KEY_OUTLINE_WIDTH: &str = "outline_width";
const KEY_OUTLINE_COLLAPSED: &str = "outline_collapsed";
const KEY_THEME: &str = "theme";

/// Default outline panel width in pixels.
pub const DEFAULT_OUTLINE_WIDTH: u32 = 260;
/// Narrowest outline panel.
pub const MIN_OUTLINE_WIDTH: u32 = 200;
/// Widest outline panel.
pub const MAX_OUTLINE_WIDTH: u32 = 500;

/// String key/value storage for UI state.
pub trait PreferenceStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Volatile store, used in tests and when no profile directory exists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Other("preference store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Other("preference store poisoned".into()))?;
        values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open a store at `path`. A missing or corrupt file starts empty.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                log::warn!("Ignoring unreadable preference file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, text)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Other("preference store poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Other("preference store poisoned".into()))?;
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}

/// Viewer whose toolbar state is remembered separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarKind {
    /// Paginated document viewer
    Paginated,
    /// Flow document viewer
    Flow,
}

impl ToolbarKind {
    fn key(&self) -> &'static str {
        match self {
            ToolbarKind::Paginated => "paginated_toolbar_collapsed",
            ToolbarKind::Flow => "flow_toolbar_collapsed",
        }
    }
}

/// Built-in color themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreset {
    #[default]
    Light,
    Dark,
    Sepia,
    Nord,
    Dracula,
    Solarized,
}

impl ThemePreset {
    /// Every preset, in menu order.
    pub const ALL: [ThemePreset; 6] = [
        ThemePreset::Light,
        ThemePreset::Dark,
        ThemePreset::Sepia,
        ThemePreset::Nord,
        ThemePreset::Dracula,
        ThemePreset::Solarized,
    ];

    /// Stored name of the preset.
    pub fn name(&self) -> &'static str {
        match self {
            ThemePreset::Light => "light",
            ThemePreset::Dark => "dark",
            ThemePreset::Sepia => "sepia",
            ThemePreset::Nord => "nord",
            ThemePreset::Dracula => "dracula",
            ThemePreset::Solarized => "solarized",
        }
    }

    /// Look a preset up by stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// The reader's theme choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSelection {
    /// A built-in preset
    Preset(ThemePreset),
    /// Custom variable set (variable name to value)
    Custom(BTreeMap<String, String>),
}

impl Default for ThemeSelection {
    fn default() -> Self {
        ThemeSelection::Preset(ThemePreset::default())
    }
}

impl ThemeSelection {
    /// Encode for storage: the preset name, or the variable set as a JSON object.
    pub fn encode(&self) -> String {
        match self {
            ThemeSelection::Preset(preset) => preset.name().to_string(),
            ThemeSelection::Custom(vars) => {
                serde_json::to_string(vars).unwrap_or_else(|_| "{}".to_string())
            }
        }
    }

    /// Decode a stored value. Unknown names and malformed objects read as the default.
    pub fn decode(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with('{') {
            match serde_json::from_str::<BTreeMap<String, String>>(raw) {
                Ok(vars) => ThemeSelection::Custom(vars),
                Err(e) => {
                    log::warn!("Discarding malformed custom theme: {}", e);
                    ThemeSelection::default()
                }
            }
        } else {
            ThemePreset::from_name(raw)
                .map(ThemeSelection::Preset)
                .unwrap_or_default()
        }
    }
}

/// A cached content tree with the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSnapshot {
    /// The cached tree
    pub tree: ContentTree,
    /// When the tree was fetched, if recorded
    pub fetched_at: Option<DateTime<Utc>>,
}

/// Clamp an outline panel width into the allowed range.
pub fn clamp_outline_width(width: u32) -> u32 {
    width.clamp(MIN_OUTLINE_WIDTH, MAX_OUTLINE_WIDTH)
}

/// Typed accessors over a [`PreferenceStore`].
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

impl Preferences {
    /// Wrap a store.
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// In-memory preferences.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("Failed to persist preference {}: {}", key, e);
        }
    }

    fn read_bool(&self, key: &str) -> bool {
        self.store.get(key).as_deref() == Some("true")
    }

    /// The cached content tree, if one was stored and is readable.
    pub fn cached_tree(&self) -> Option<TreeSnapshot> {
        let raw = self.store.get(KEY_TREE)?;
        let tree = match serde_json::from_str::<ContentTree>(&raw) {
            Ok(tree) => tree,
            Err(e) => {
                log::warn!("Ignoring unreadable content tree snapshot: {}", e);
                return None;
            }
        };
        let fetched_at = self
            .store
            .get(KEY_TREE_TIME)
            .and_then(|t| t.parse::<i64>().ok())
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());
        Some(TreeSnapshot { tree, fetched_at })
    }

    /// Replace the cached content tree.
    pub fn store_tree(&self, tree: &ContentTree, fetched_at: DateTime<Utc>) -> Result<()> {
        let json = serde_json::to_string(tree)?;
        self.store.set(KEY_TREE, &json)?;
        self.store
            .set(KEY_TREE_TIME, &fetched_at.timestamp_millis().to_string())?;
        Ok(())
    }

    /// Drop the cached content tree.
    pub fn clear_tree(&self) -> Result<()> {
        self.store.remove(KEY_TREE)?;
        self.store.remove(KEY_TREE_TIME)
    }

    /// Outline panel width, clamped into range.
    pub fn outline_width(&self) -> u32 {
        self.store
            .get(KEY_OUTLINE_WIDTH)
            .and_then(|w| w.trim().parse::<u32>().ok())
            .map(clamp_outline_width)
            .unwrap_or(DEFAULT_OUTLINE_WIDTH)
    }

    /// Store the outline panel width; returns the clamped value actually stored.
    pub fn set_outline_width(&self, width: u32) -> u32 {
        let width = clamp_outline_width(width);
        self.write(KEY_OUTLINE_WIDTH, &width.to_string());
        width
    }

    /// Whether the outline panel is collapsed.
    pub fn outline_collapsed(&self) -> bool {
        self.read_bool(KEY_OUTLINE_COLLAPSED)
    }

    /// Remember whether the outline panel is collapsed.
    pub fn set_outline_collapsed(&self, collapsed: bool) {
        self.write(KEY_OUTLINE_COLLAPSED, if collapsed { "true" } else { "false" });
    }

    /// Whether a viewer's toolbar is collapsed.
    pub fn toolbar_collapsed(&self, kind: ToolbarKind) -> bool {
        self.read_bool(kind.key())
    }

    /// Remember whether a viewer's toolbar is collapsed.
    pub fn set_toolbar_collapsed(&self, kind: ToolbarKind, collapsed: bool) {
        self.write(kind.key(), if collapsed { "true" } else { "false" });
    }

    /// The stored theme selection.
    pub fn theme(&self) -> ThemeSelection {
        self.store
            .get(KEY_THEME)
            .map(|raw| ThemeSelection::decode(&raw))
            .unwrap_or_default()
    }

    /// Store the theme selection.
    pub fn set_theme(&self, theme: &ThemeSelection) {
        self.write(KEY_THEME, &theme.encode());
    }
}

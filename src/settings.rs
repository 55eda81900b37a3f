//! Layered, persistent user settings.
//!
//! A two-level `section → key → value` JSON mapping with a fixed default
//! schema. The effective mapping is always *complete*: on load the persisted
//! file is deep-merged over the defaults (loaded values win key-by-key,
//! defaults fill anything the file omits, unknown extra keys are preserved),
//! so adding a new default key never needs a migration step and an old
//! settings file can never produce a mapping missing a required key.
//!
//! Every [`SettingsStore::set`] persists the whole mapping synchronously —
//! there is no separate "save" step to forget. Read or parse failures on
//! load fall back to pure defaults and are logged, never propagated: a
//! corrupt settings file must not stop the application from starting.

use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Persistent application settings, backed by a single JSON file.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Map<String, Value>,
}

/// The complete default schema. Sections: general, conversion, ui, advanced.
pub fn default_settings() -> Map<String, Value> {
    let defaults = json!({
        "general": {
            "theme": "system",
            "language": "nl",
            "auto_update_check": true,
            "remember_last_folder": true,
            "last_input_folder": "",
            "last_output_folder": ""
        },
        "conversion": {
            "default_dpi": 300,
            "default_format": "PNG",
            "quality": 95,
            "compression": "none",
            "preserve_metadata": true,
            "auto_open_output": false
        },
        "ui": {
            "window_width": 700,
            "window_height": 600,
            "show_preview": true,
            "show_stats": true,
            "compact_mode": false
        },
        "advanced": {
            "thread_count": 0,
            "memory_limit": 512,
            "temp_folder": "",
            "log_level": "INFO"
        }
    });
    match defaults {
        Value::Object(map) => map,
        _ => unreachable!("default schema is a JSON object"),
    }
}

/// Per-user settings file location: `~/.pdf2img/settings.json`.
///
/// Falls back to a path relative to the working directory when no home
/// directory can be determined (containers, odd CI environments).
fn default_settings_path() -> PathBuf {
    match directories::BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(".pdf2img").join("settings.json"),
        None => {
            warn!("No home directory found; storing settings in the working directory");
            PathBuf::from(".pdf2img-settings.json")
        }
    }
}

impl SettingsStore {
    /// Open the per-user settings store, loading and merging the persisted
    /// file if present.
    pub fn open() -> Self {
        Self::open_at(default_settings_path())
    }

    /// Open a settings store backed by an explicit file path.
    ///
    /// The injectable path is what makes the store testable; production
    /// callers use [`SettingsStore::open`].
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut store = Self {
            path,
            settings: default_settings(),
        };
        store.load();
        store
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the persisted file, merging it over the defaults.
    ///
    /// A missing file means first run: pure defaults. A broken file is
    /// logged and ignored — the user keeps a working application and the
    /// next `set` rewrites the file cleanly.
    pub fn load(&mut self) {
        self.settings = match std::fs::read_to_string(&self.path) {
            Ok(text) => match serde_json::from_str::<Map<String, Value>>(&text) {
                Ok(loaded) => merge_settings(&default_settings(), &loaded),
                Err(e) => {
                    warn!("Settings file {} is not valid JSON ({e}); using defaults", self.path.display());
                    default_settings()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => default_settings(),
            Err(e) => {
                warn!("Failed to read settings file {} ({e}); using defaults", self.path.display());
                default_settings()
            }
        };
    }

    /// Look up a single value.
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.settings.get(section)?.as_object()?.get(key)
    }

    /// Look up a single value, falling back to `default` when absent.
    pub fn get_or(&self, section: &str, key: &str, default: Value) -> Value {
        self.get(section, key).cloned().unwrap_or(default)
    }

    /// Set a single value and persist the full mapping immediately.
    ///
    /// Write-through, no batching: every mutation is durable on return.
    /// A persist failure is logged, not raised — the in-memory value still
    /// takes effect for this session.
    pub fn set(&mut self, section: &str, key: &str, value: Value) {
        let entry = self
            .settings
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(key.to_string(), value);
        }
        self.persist();
    }

    /// Discard all customisation, revert to defaults, and persist.
    pub fn reset(&mut self) {
        self.settings = default_settings();
        self.persist();
    }

    /// Snapshot of the full effective mapping.
    pub fn all(&self) -> &Map<String, Value> {
        &self.settings
    }

    /// Serialise the full mapping to an external file.
    pub fn export(&self, path: &Path) -> std::io::Result<()> {
        write_json(path, &self.settings)
    }

    /// Load a mapping from an external file, running it through the same
    /// merge as [`SettingsStore::load`], then persist.
    pub fn import(&mut self, path: &Path) -> std::io::Result<()> {
        let text = std::fs::read_to_string(path)?;
        let imported: Map<String, Value> = serde_json::from_str(&text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.settings = merge_settings(&default_settings(), &imported);
        self.persist();
        Ok(())
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Failed to create settings directory {}: {e}", parent.display());
                    return;
                }
            }
        }
        match write_json(&self.path, &self.settings) {
            Ok(()) => debug!("Settings persisted to {}", self.path.display()),
            Err(e) => warn!("Failed to persist settings to {}: {e}", self.path.display()),
        }
    }
}

/// Merge `loaded` over a copy of `defaults`.
///
/// Sections present in both are updated key-by-key with loaded values
/// winning; sections only in `loaded` are added verbatim; sections only in
/// `defaults` keep their full default contents. A known section whose
/// persisted value is not an object is ignored: the effective mapping must
/// always contain every default key, so a scalar can never replace a whole
/// section.
fn merge_settings(defaults: &Map<String, Value>, loaded: &Map<String, Value>) -> Map<String, Value> {
    let mut result = defaults.clone();
    for (section, values) in loaded {
        match (result.get_mut(section), values.as_object()) {
            (Some(Value::Object(base)), Some(incoming)) => {
                for (k, v) in incoming {
                    base.insert(k.clone(), v.clone());
                }
            }
            (Some(_), _) => {
                warn!("Ignoring non-object value for settings section '{section}'");
            }
            (None, _) => {
                result.insert(section.clone(), values.clone());
            }
        }
    }
    result
}

fn write_json(path: &Path, map: &Map<String, Value>) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(map)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, text)
}

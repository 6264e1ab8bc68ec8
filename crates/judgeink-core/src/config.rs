//! Process-wide tool defaults.
//!
//! The defaults outlive any single canvas: every canvas seeds its tool state
//! from them, and Normal-pen changes are written back.

use crate::color::SerializableColor;
use crate::constants::{DEFAULT_COLOR, DEFAULT_WIDTH};
use crate::input::InputMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Errors reading or writing the defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Persisted subset of the tool configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolDefaults {
    pub color: SerializableColor,
    pub width: f64,
    pub input_mode: InputMode,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR,
            width: DEFAULT_WIDTH,
            input_mode: InputMode::default(),
        }
    }
}

impl ToolDefaults {
    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &ToolDefaultsPatch) {
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(mode) = patch.input_mode {
            self.input_mode = mode;
        }
    }
}

/// Partial update to [`ToolDefaults`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolDefaultsPatch {
    pub color: Option<SerializableColor>,
    pub width: Option<f64>,
    pub input_mode: Option<InputMode>,
}

/// Store for the process-wide defaults.
pub trait DefaultsStore: Send + Sync {
    /// Current defaults; falls back to built-in values when nothing is stored.
    fn load_defaults(&self) -> ToolDefaults;

    /// Merge `patch` into the stored defaults.
    fn save_defaults(&self, patch: ToolDefaultsPatch) -> Result<(), ConfigError>;
}

/// In-memory defaults for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryDefaults {
    defaults: RwLock<ToolDefaults>,
}

impl MemoryDefaults {
    pub fn new(defaults: ToolDefaults) -> Self {
        Self {
            defaults: RwLock::new(defaults),
        }
    }
}

impl DefaultsStore for MemoryDefaults {
    fn load_defaults(&self) -> ToolDefaults {
        match self.defaults.read() {
            Ok(d) => d.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    fn save_defaults(&self, patch: ToolDefaultsPatch) -> Result<(), ConfigError> {
        let mut defaults = self
            .defaults
            .write()
            .map_err(|e| ConfigError::Lock(e.to_string()))?;
        defaults.apply(&patch);
        Ok(())
    }
}

/// Defaults kept in a JSON file.
///
/// The file is read once at construction and rewritten on every save.
pub struct FileDefaults {
    path: PathBuf,
    cached: RwLock<ToolDefaults>,
}

impl FileDefaults {
    /// Open (or lazily create) the defaults file at `path`.
    ///
    /// A missing or unreadable file yields the built-in defaults.
    pub fn new(path: PathBuf) -> Self {
        let cached = match Self::read(&path) {
            Ok(Some(d)) => d,
            Ok(None) => ToolDefaults::default(),
            Err(e) => {
                log::warn!("Ignoring tool defaults at {}: {}", path.display(), e);
                ToolDefaults::default()
            }
        };
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    /// Defaults file in the platform config directory.
    ///
    /// On Unix: `~/.config/judgeink/tool_defaults.json`
    /// On Windows: `%APPDATA%\judgeink\tool_defaults.json`
    pub fn default_location() -> Result<Self, ConfigError> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ConfigError::Io("Could not determine config directory".to_string()))?;
        Ok(Self::new(base.join("judgeink").join("tool_defaults.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Option<ToolDefaults>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| ConfigError::Serialization(e.to_string()))
    }

    fn write(&self, defaults: &ToolDefaults) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        let json = serde_json::to_string_pretty(defaults)
            .map_err(|e| ConfigError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)
            .map_err(|e| ConfigError::Io(format!("Failed to write {}: {}", self.path.display(), e)))
    }
}

impl DefaultsStore for FileDefaults {
    fn load_defaults(&self) -> ToolDefaults {
        match self.cached.read() {
            Ok(d) => d.clone(),
            Err(e) => e.into_inner().clone(),
        }
    }

    fn save_defaults(&self, patch: ToolDefaultsPatch) -> Result<(), ConfigError> {
        let mut cached = self
            .cached
            .write()
            .map_err(|e| ConfigError::Lock(e.to_string()))?;
        cached.apply(&patch);
        self.write(&cached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_patch_applies_only_present_fields() {
        let mut defaults = ToolDefaults::default();
        defaults.apply(&ToolDefaultsPatch {
            width: Some(11.0),
            ..Default::default()
        });
        assert!((defaults.width - 11.0).abs() < f64::EPSILON);
        assert_eq!(defaults.color, DEFAULT_COLOR);
        assert_eq!(defaults.input_mode, InputMode::FingerOnly);
    }

    #[test]
    fn test_memory_defaults() {
        let store = MemoryDefaults::default();
        store
            .save_defaults(ToolDefaultsPatch {
                input_mode: Some(InputMode::StylusOnly),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(store.load_defaults().input_mode, InputMode::StylusOnly);
    }

    #[test]
    fn test_file_defaults_persist_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("tool_defaults.json");

        let first = FileDefaults::new(path.clone());
        assert_eq!(first.load_defaults(), ToolDefaults::default());
        first
            .save_defaults(ToolDefaultsPatch {
                color: Some(SerializableColor::new(1, 2, 3, 255)),
                width: Some(6.5),
                input_mode: Some(InputMode::StylusOnly),
            })
            .unwrap();

        let second = FileDefaults::new(path);
        let loaded = second.load_defaults();
        assert_eq!(loaded.color, SerializableColor::new(1, 2, 3, 255));
        assert!((loaded.width - 6.5).abs() < f64::EPSILON);
        assert_eq!(loaded.input_mode, InputMode::StylusOnly);
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool_defaults.json");
        fs::write(&path, "{not json").unwrap();
        let store = FileDefaults::new(path);
        assert_eq!(store.load_defaults(), ToolDefaults::default());
    }

    #[test]
    fn test_partial_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool_defaults.json");
        fs::write(&path, r#"{"width": 12.0}"#).unwrap();
        let loaded = FileDefaults::new(path).load_defaults();
        assert!((loaded.width - 12.0).abs() < f64::EPSILON);
        assert_eq!(loaded.color, DEFAULT_COLOR);
    }
}

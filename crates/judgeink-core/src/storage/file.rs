//! File-based storage implementation.

use super::{BoxFuture, StorageError, StorageResult, StrokeStore};
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Stores each owner's stroke list as a JSON file in a base directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Base directory for stroke files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/judgeink/strokes/`
    /// On Windows: `%LOCALAPPDATA%\judgeink\strokes\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Self::new(base.join("judgeink").join("strokes"))
    }

    /// File path holding an owner's record.
    fn record_path(&self, owner_id: &str) -> PathBuf {
        // Owner ids come from the host app; keep them filename-safe.
        let safe_id: String = owner_id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl StrokeStore for FileStorage {
    fn get(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let path = self.record_path(owner_id);
        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            fs::read_to_string(&path)
                .map(Some)
                .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
        })
    }

    fn set(&self, owner_id: &str, payload: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.record_path(owner_id);
        let payload = payload.to_string();
        Box::pin(async move {
            // Readers only ever see a complete record.
            let tmp = path.with_extension("json.tmp");
            fs::write(&tmp, payload)
                .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", tmp.display(), e)))?;
            fs::rename(&tmp, &path).map_err(|e| {
                StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
            })
        })
    }

    fn delete(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.record_path(owner_id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
                })?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_set_get() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.set("judge-7", r#"[{"path":"M0 0 L1 1"}]"#)).unwrap();
        let loaded = block_on(storage.get("judge-7")).unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"[{"path":"M0 0 L1 1"}]"#));
        assert!(dir.path().join("judge-7.json").exists());
        assert!(!dir.path().join("judge-7.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_missing() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(block_on(storage.get("nobody")).unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_base_dir() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("a").join("b");
        let storage = FileStorage::new(base.clone()).unwrap();
        assert!(base.is_dir());
        assert_eq!(storage.base_path(), base.as_path());
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        block_on(storage.set("judge-1", "[]")).unwrap();
        block_on(storage.delete("judge-1")).unwrap();
        assert_eq!(block_on(storage.get("judge-1")).unwrap(), None);
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.set("event/42:judge*3", "[]")).unwrap();
        assert!(dir.path().join("event_42_judge_3.json").exists());
        assert_eq!(
            block_on(storage.get("event/42:judge*3")).unwrap().as_deref(),
            Some("[]")
        );
    }
}

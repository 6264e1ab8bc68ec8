//! In-memory storage implementation.

use super::{BoxFuture, StorageError, StorageResult, StrokeStore};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one record.
    pub fn with_record(owner_id: &str, payload: &str) -> Self {
        let storage = Self::new();
        if let Ok(mut records) = storage.records.write() {
            records.insert(owner_id.to_string(), payload.to_string());
        }
        storage
    }

    /// Number of owners with a stored record.
    pub fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StrokeStore for MemoryStorage {
    fn get(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>> {
        let owner_id = owner_id.to_string();
        Box::pin(async move {
            let records = self
                .records
                .read()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            Ok(records.get(&owner_id).cloned())
        })
    }

    fn set(&self, owner_id: &str, payload: &str) -> BoxFuture<'_, StorageResult<()>> {
        let owner_id = owner_id.to_string();
        let payload = payload.to_string();
        Box::pin(async move {
            let mut records = self
                .records
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            records.insert(owner_id, payload);
            Ok(())
        })
    }

    fn delete(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let owner_id = owner_id.to_string();
        Box::pin(async move {
            let mut records = self
                .records
                .write()
                .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
            records.remove(&owner_id);
            Ok(())
        })
    }
}

//! Persistence of stroke sets.
//!
//! A [`StrokeStore`] keeps one serialized stroke list per owner. The
//! [`PersistenceAdapter`] sits in front of it and coalesces bursts of
//! mutations into a single write through a [`Scheduler`].

mod autosave;
mod file;
mod memory;
mod scheduler;

pub use autosave::PersistenceAdapter;
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future returned by stores and run by schedulers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backing store holding one serialized stroke list per owner.
///
/// Each `set` replaces the owner's record wholesale.
pub trait StrokeStore: Send + Sync {
    /// Fetch the owner's payload, `None` if nothing was ever stored.
    fn get(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<Option<String>>>;

    /// Overwrite the owner's payload.
    fn set(&self, owner_id: &str, payload: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Remove the owner's record. Removing a missing record is not an error.
    fn delete(&self, owner_id: &str) -> BoxFuture<'_, StorageResult<()>>;
}

//! Debounced persistence of a canvas's stroke set.
//!
//! Every mutation hands the adapter a full snapshot. The adapter keeps only
//! the newest one and re-arms a quiet-period timer; when the timer fires the
//! newest snapshot is serialized and written. Failures are logged and the
//! snapshot is kept, so the next save (or a flush) retries it.

use super::{Scheduler, StrokeStore};
use crate::codec::{decode_strokes, encode_strokes};
use crate::constants::DEFAULT_QUIET_PERIOD;
use crate::stroke::Stroke;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

struct Shared {
    owner_id: String,
    store: Arc<dyn StrokeStore>,
    latest: Mutex<Option<Vec<Stroke>>>,
    /// Serializes writes. The snapshot is taken only while holding it.
    write_lock: tokio::sync::Mutex<()>,
}

impl Shared {
    fn latest(&self) -> MutexGuard<'_, Option<Vec<Stroke>>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write_latest(&self) {
        let _write = self.write_lock.lock().await;
        let Some(strokes) = self.latest().take() else {
            return;
        };

        let payload = match encode_strokes(&strokes) {
            Ok(payload) => payload,
            Err(e) => {
                log::error!("Failed to encode strokes for {}: {}", self.owner_id, e);
                return;
            }
        };

        match self.store.set(&self.owner_id, &payload).await {
            Ok(()) => log::debug!("Saved {} strokes for {}", strokes.len(), self.owner_id),
            Err(e) => {
                log::error!("Failed to save strokes for {}: {}", self.owner_id, e);
                let mut latest = self.latest();
                if latest.is_none() {
                    *latest = Some(strokes);
                }
            }
        }
    }
}

/// Persistence front-end for one owner's strokes.
pub struct PersistenceAdapter {
    shared: Arc<Shared>,
    scheduler: Arc<dyn Scheduler>,
    quiet_period: Duration,
}

impl std::fmt::Debug for PersistenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceAdapter")
            .field("owner_id", &self.shared.owner_id)
            .field("quiet_period", &self.quiet_period)
            .finish_non_exhaustive()
    }
}

impl PersistenceAdapter {
    pub fn new(
        owner_id: impl Into<String>,
        store: Arc<dyn StrokeStore>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                owner_id: owner_id.into(),
                store,
                latest: Mutex::new(None),
                write_lock: tokio::sync::Mutex::new(()),
            }),
            scheduler,
            quiet_period: DEFAULT_QUIET_PERIOD,
        }
    }

    /// Override the quiet period.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.shared.owner_id
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Read the owner's strokes.
    ///
    /// Never fails: store errors and unreadable payloads yield an empty
    /// list, and individual bad records are skipped.
    pub async fn load(&self) -> Vec<Stroke> {
        let owner_id = &self.shared.owner_id;
        let payload = match self.shared.store.get(owner_id).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("Failed to load strokes for {}: {}", owner_id, e);
                return Vec::new();
            }
        };

        match decode_strokes(&payload) {
            Ok(decoded) => {
                if decoded.skipped > 0 {
                    log::warn!(
                        "Dropped {} unreadable strokes for {}",
                        decoded.skipped,
                        owner_id
                    );
                }
                decoded.strokes
            }
            Err(e) => {
                log::error!("Discarding stored strokes for {}: {}", owner_id, e);
                Vec::new()
            }
        }
    }

    /// Record `strokes` as the newest state and restart the quiet period.
    pub fn schedule_save(&self, strokes: Vec<Stroke>) {
        *self.shared.latest() = Some(strokes);
        let shared = Arc::clone(&self.shared);
        self.scheduler.schedule(
            self.quiet_period,
            Box::pin(async move { shared.write_latest().await }),
        );
    }

    /// Whether a snapshot is waiting to be written.
    pub fn has_unsaved(&self) -> bool {
        self.shared.latest().is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.scheduler.has_pending()
    }

    /// Cancel the timer and write the newest snapshot now.
    pub async fn flush(&self) {
        self.scheduler.cancel_pending();
        self.shared.write_latest().await;
    }
}

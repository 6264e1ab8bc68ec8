//! Single-slot delayed task scheduling.
//!
//! A [`Scheduler`] holds at most one pending task. Scheduling a new task
//! replaces the pending one atomically, which is what turns a burst of
//! saves into a single write.

use super::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// Runs one delayed task at a time.
pub trait Scheduler: Send + Sync {
    /// Cancel any pending task and arm `task` to run after `delay`.
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>);

    /// Drop the pending task, if any. A task that already started keeps running.
    fn cancel_pending(&self);

    /// Whether a task is armed and has not started yet.
    fn has_pending(&self) -> bool;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct ManualState {
    now: Duration,
    pending: Option<(Duration, BoxFuture<'static, ()>)>,
    fired: usize,
}

/// Scheduler driven by a simulated clock.
///
/// Nothing runs until [`advance`](Self::advance) moves the clock past the
/// pending deadline; the task is then driven to completion on the calling
/// thread.
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.pending.as_ref().map(|(at, _)| *at))
            .field("fired", &state.fired)
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: Duration::ZERO,
                pending: None,
                fired: 0,
            }),
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        lock(&self.state).now
    }

    /// Number of tasks that have run.
    pub fn fired(&self) -> usize {
        lock(&self.state).fired
    }

    /// Move the clock forward, running the pending task if it is due.
    /// Returns true if a task ran.
    pub fn advance(&self, by: Duration) -> bool {
        let due = {
            let mut state = lock(&self.state);
            state.now += by;
            let now = state.now;
            match state.pending.take() {
                Some((deadline, task)) if deadline <= now => {
                    state.fired += 1;
                    Some(task)
                }
                other => {
                    state.pending = other;
                    None
                }
            }
        };
        match due {
            Some(task) => {
                pollster::block_on(task);
                true
            }
            None => false,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        let mut state = lock(&self.state);
        let deadline = state.now + delay;
        state.pending = Some((deadline, task));
    }

    fn cancel_pending(&self) {
        lock(&self.state).pending = None;
    }

    fn has_pending(&self) -> bool {
        lock(&self.state).pending.is_some()
    }
}

#[derive(Default)]
struct TokioSlot {
    generation: u64,
    pending: Option<AbortHandle>,
}

/// Scheduler backed by tokio timers.
///
/// Each armed task carries a generation number; a timer that wakes after
/// being superseded sees a newer generation and exits without running.
pub struct TokioScheduler {
    handle: Handle,
    slot: Arc<Mutex<TokioSlot>>,
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("generation", &lock(&self.slot).generation)
            .finish_non_exhaustive()
    }
}

impl TokioScheduler {
    /// Scheduler spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            slot: Arc::new(Mutex::new(TokioSlot::default())),
        }
    }

    /// Scheduler on the runtime of the calling context.
    ///
    /// Returns `None` outside a tokio runtime.
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: BoxFuture<'static, ()>) {
        let mut slot = lock(&self.slot);
        if let Some(previous) = slot.pending.take() {
            previous.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        let shared = Arc::clone(&self.slot);
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            {
                let mut slot = lock(&shared);
                if slot.generation != generation {
                    return;
                }
                slot.pending = None;
            }
            task.await;
        });
        slot.pending = Some(join.abort_handle());
    }

    fn cancel_pending(&self) {
        let mut slot = lock(&self.slot);
        slot.generation += 1;
        if let Some(pending) = slot.pending.take() {
            pending.abort();
        }
    }

    fn has_pending(&self) -> bool {
        lock(&self.slot).pending.is_some()
    }
}

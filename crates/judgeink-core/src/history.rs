//! Bounded undo/redo history of committed strokes.

use crate::codec::StrokeRecord;
use crate::constants::{CAP_STROKES, CAP_UNDO};
use crate::stroke::Stroke;
use std::collections::VecDeque;

/// Committed strokes plus the redo buffer.
///
/// Both lists are capped independently; overflow drops the oldest entry.
/// Undone strokes are kept in record form and rebuilt on redo.
#[derive(Debug, Clone)]
pub struct History {
    committed: VecDeque<Stroke>,
    redo_buffer: VecDeque<StrokeRecord>,
    cap_strokes: usize,
    cap_undo: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_caps(CAP_STROKES, CAP_UNDO)
    }

    /// History with custom caps (each at least 1).
    pub fn with_caps(cap_strokes: usize, cap_undo: usize) -> Self {
        Self {
            committed: VecDeque::new(),
            redo_buffer: VecDeque::new(),
            cap_strokes: cap_strokes.max(1),
            cap_undo: cap_undo.max(1),
        }
    }

    /// History seeded with previously persisted strokes.
    ///
    /// Keeps the newest strokes when `strokes` exceeds the cap.
    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        let mut history = Self::new();
        for stroke in strokes {
            history.push_committed(stroke);
        }
        history
    }

    /// Commit a new stroke. Clears the redo buffer.
    pub fn commit(&mut self, stroke: Stroke) {
        self.redo_buffer.clear();
        self.push_committed(stroke);
        log::debug!("Committed stroke ({} in history)", self.committed.len());
    }

    /// Move the newest committed stroke to the redo buffer.
    /// Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(stroke) = self.committed.pop_back() else {
            return false;
        };
        self.redo_buffer.push_back(StrokeRecord::from_stroke(&stroke));
        if self.redo_buffer.len() > self.cap_undo {
            self.redo_buffer.pop_front();
            log::debug!("Redo buffer full, dropped oldest entry");
        }
        true
    }

    /// Re-commit the most recently undone stroke.
    /// Returns false if the redo buffer was empty or the entry no longer decodes.
    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_buffer.pop_back() else {
            return false;
        };
        match record.to_stroke() {
            Ok(stroke) => {
                self.push_committed(stroke);
                true
            }
            Err(e) => {
                log::warn!("Dropping undecodable redo entry: {}", e);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_buffer.is_empty()
    }

    /// Number of committed strokes.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Number of undone strokes available for redo.
    pub fn redo_len(&self) -> usize {
        self.redo_buffer.len()
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.committed.iter()
    }

    /// Owned copy of the committed strokes, oldest first.
    pub fn snapshot(&self) -> Vec<Stroke> {
        self.committed.iter().cloned().collect()
    }

    fn push_committed(&mut self, stroke: Stroke) {
        self.committed.push_back(stroke);
        if self.committed.len() > self.cap_strokes {
            self.committed.pop_front();
            log::debug!("Stroke cap reached, evicted oldest stroke");
        }
    }
}

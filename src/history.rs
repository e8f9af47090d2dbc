//! Snapshot-based undo/redo.
//!
//! The history stores whole copies of the document. Index 0 is the baseline
//! captured when the document was opened; every committed mutation appends a
//! snapshot, and the cursor always addresses the current state. Scenes hold
//! tens of elements, so full copies are cheap next to an inverse-operation log.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

/// Undo/redo stack over snapshots of `T`.
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: Vec<T>,
    cursor: usize,
    /// Maximum snapshots kept, baseline included. `0` means unbounded.
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Start a history whose baseline is `initial`.
    #[must_use]
    pub fn new(initial: T, limit: usize) -> Self {
        Self { snapshots: vec![initial], cursor: 0, limit }
    }

    /// Discard all snapshots and start over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push(initial);
        self.cursor = 0;
    }

    /// Record a new current state, dropping any redo branch.
    pub fn commit(&mut self, state: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(state);
        if self.limit > 0 && self.snapshots.len() > self.limit {
            let excess = self.snapshots.len() - self.limit;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the baseline.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Step forward one snapshot. `None` at the newest snapshot.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    /// The snapshot the cursor addresses.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.cursor)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of stored snapshots, baseline included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; a history holds at least its baseline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

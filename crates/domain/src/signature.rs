// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Undo/redo history for the client signature captured at execution.
//!
//! Each stroke produces a complete, immutable snapshot of the signature.
//! The history keeps at most [`SIGNATURE_HISTORY_LIMIT`] snapshots and a
//! cursor into them; undo and redo only move the cursor. The API replays a
//! submitted pad through this history and stores [`SignatureHistory::commit`]
//! as the execution stage's client signature.

use std::collections::VecDeque;

/// Maximum number of snapshots retained.
pub const SIGNATURE_HISTORY_LIMIT: usize = 50;

/// A bounded history of signature snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignatureHistory {
    snapshots: VecDeque<String>,
    /// Number of snapshots currently applied. Zero means blank.
    cursor: usize,
}

impl SignatureHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: 0,
        }
    }

    /// Records a new snapshot, discarding anything that was undone.
    pub fn push(&mut self, snapshot: String) {
        self.snapshots.truncate(self.cursor);
        self.snapshots.push_back(snapshot);
        if self.snapshots.len() > SIGNATURE_HISTORY_LIMIT {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len();
    }

    /// Steps back one snapshot. Returns false if already blank.
    pub fn undo(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Re-applies the next undone snapshot. Returns false if none.
    pub fn redo(&mut self) -> bool {
        if self.cursor >= self.snapshots.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// The signature as currently displayed.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.snapshots.get(i))
            .map(String::as_str)
    }

    /// Returns true if an undo is possible.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if a redo is possible.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns true if nothing has been drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Clears the canvas and its history.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }

    /// The snapshot to store with the execution stage.
    #[must_use]
    pub fn commit(&self) -> Option<String> {
        self.current().map(str::to_string)
    }
}

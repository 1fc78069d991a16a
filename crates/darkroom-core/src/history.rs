//! Bounded linear undo/redo log of adjustment snapshots.
//!
//! The log always holds at least one entry and `entries[index]` is the live
//! [`Adjustments`]. Pushing while not at the tail drops the redo future.

use std::collections::VecDeque;

use crate::config::MAX_HISTORY;
use crate::Adjustments;

/// Snapshot log with a cursor.
#[derive(Debug, Clone)]
pub struct History {
    /// Snapshots, oldest first
    entries: VecDeque<Adjustments>,
    /// Position of the live snapshot
    index: usize,
    /// Maximum number of entries kept
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// History holding only the default adjustments, capped at [`MAX_HISTORY`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// History holding only the default adjustments. A capacity of 0 is
    /// treated as 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = VecDeque::with_capacity(capacity);
        entries.push_back(Adjustments::default());
        Self {
            entries,
            index: 0,
            capacity,
        }
    }

    /// The live snapshot.
    pub fn current(&self) -> Adjustments {
        // `index` always points inside `entries`
        self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; the log keeps at least one snapshot.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a new live snapshot.
    ///
    /// Everything after the cursor is discarded, then the oldest entries are
    /// dropped until the log fits its capacity.
    pub fn push(&mut self, adjustments: Adjustments) {
        self.entries.truncate(self.index + 1);
        self.entries.push_back(adjustments);

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back. Returns the new live snapshot, or `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<Adjustments> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward. Returns the new live snapshot, or `None` at the tail.
    pub fn redo(&mut self) -> Option<Adjustments> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// Back to a single default snapshot.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.entries.push_back(Adjustments::default());
        self.index = 0;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::AdjustmentKey;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Push(f32),
        Undo,
        Redo,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (-100.0f32..=100.0).prop_map(Op::Push),
            1 => Just(Op::Undo),
            1 => Just(Op::Redo),
        ]
    }

    proptest! {
        /// Property: length stays within capacity and the cursor stays inside.
        #[test]
        fn prop_bounds_hold(
            capacity in 1usize..=40,
            ops in prop::collection::vec(op_strategy(), 0..120),
        ) {
            let mut history = History::with_capacity(capacity);
            for op in ops {
                match op {
                    Op::Push(v) => history.push(Adjustments::default().with(AdjustmentKey::Contrast, v)),
                    Op::Undo => { history.undo(); }
                    Op::Redo => { history.redo(); }
                }
                prop_assert!(history.len() <= capacity);
                prop_assert!(history.len() >= 1);
                prop_assert!(history.index() < history.len());
            }
        }

        /// Property: undo restores the prior snapshot and redo brings the push back.
        #[test]
        fn prop_undo_redo_inverse(
            prior in prop::collection::vec(-100.0f32..=100.0, 0..10),
            value in -100.0f32..=100.0,
        ) {
            let mut history = History::new();
            for v in prior {
                history.push(Adjustments::default().with(AdjustmentKey::Shadows, v));
            }
            let before = history.current();
            let pushed = before.with(AdjustmentKey::Tint, value);
            history.push(pushed);

            prop_assert_eq!(history.undo(), Some(before));
            prop_assert_eq!(history.redo(), Some(pushed));
            prop_assert_eq!(history.current(), pushed);
        }
    }
}

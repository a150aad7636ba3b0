//! Linear undo/redo buffer of whole-tree snapshots.

/// Snapshot history with a cursor.
///
/// `entries[index]` is the state currently shown. Pushing after an undo
/// discards the redo tail; there is no branching.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    capacity: Option<usize>,
}

impl<T: Clone> History<T> {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            capacity: None,
        }
    }

    /// Keep at most `capacity` entries; older ones are dropped first.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity.max(1));
        self.enforce_capacity();
        self
    }

    /// Record a new state, discarding anything redoable.
    pub fn push(&mut self, state: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(state);
        self.index = self.entries.len() - 1;
        self.enforce_capacity();
    }

    /// Step back; `None` at the oldest entry.
    pub fn undo(&mut self) -> Option<T> {
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        Some(self.entries[self.index].clone())
    }

    /// Step forward; `None` at the newest entry.
    pub fn redo(&mut self) -> Option<T> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(self.entries[self.index].clone())
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The entry under the cursor.
    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Drop everything and start over from `state`.
    pub fn reset(&mut self, state: T) {
        self.entries = vec![state];
        self.index = 0;
    }

    fn enforce_capacity(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        if self.entries.len() > capacity {
            let excess = self.entries.len() - capacity;
            self.entries.drain(..excess);
            self.index = self.index.saturating_sub(excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walk() {
        let mut history = History::new(0);
        history.push(1);
        history.push(2);

        assert_eq!(history.undo(), Some(1));
        assert_eq!(history.undo(), Some(0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(1));
        assert_eq!(history.redo(), Some(2));
        assert_eq!(history.redo(), None);
        assert_eq!(*history.current(), 2);
    }

    #[test]
    fn test_push_truncates_redo() {
        let mut history = History::new("a");
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();
        history.push("d");

        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some("a"));
        assert_eq!(history.redo(), Some("d"));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = History::new(0).with_capacity(3);
        for i in 1..=5 {
            history.push(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.undo(), Some(4));
        assert_eq!(history.undo(), Some(3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_flags() {
        let mut history = History::new(0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.is_empty());
        history.push(1);
        assert!(history.can_undo());
        history.undo();
        assert!(history.can_redo());

        history.reset(9);
        assert_eq!(history.len(), 1);
        assert_eq!(*history.current(), 9);
    }
}

//! Cursor-addressed entry stack shared by every history adapter.

use crate::history::HistoryEntry;

/// Ordered entries with a cursor. The cursor is `None` only while empty.
#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything after the cursor, append, advance.
    pub fn push(&mut self, entry: HistoryEntry) -> usize {
        let keep = self.cursor.map(|c| c + 1).unwrap_or(0);
        self.entries.truncate(keep);
        self.entries.push(entry);
        let position = self.entries.len() - 1;
        self.cursor = Some(position);
        position
    }

    /// Overwrite the entry at the cursor. Appends on an empty stack.
    pub fn replace(&mut self, entry: HistoryEntry) -> usize {
        match self.cursor {
            Some(position) => {
                self.entries[position] = entry;
                position
            }
            None => self.push(entry),
        }
    }

    /// Target of `go(delta)` without moving.
    pub fn peek(&self, delta: isize) -> Option<(usize, &HistoryEntry)> {
        let cursor = self.cursor?;
        let target = cursor.checked_add_signed(delta)?;
        self.entries.get(target).map(|entry| (target, entry))
    }

    /// Move by `delta` when in bounds. Out of bounds leaves the cursor alone.
    pub fn go(&mut self, delta: isize) -> Option<&HistoryEntry> {
        let (target, _) = self.peek(delta)?;
        self.cursor = Some(target);
        self.entries.get(target)
    }

    /// Reposition to an absolute index. Returns false when out of bounds.
    pub fn sync_to(&mut self, position: usize) -> bool {
        if position < self.entries.len() {
            self.cursor = Some(position);
            true
        } else {
            false
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

//! In-process history.

use crate::history::{History, HistoryEntry, HistoryStack};

#[derive(Debug, Default)]
pub struct MemoryHistory {
    stack: HistoryStack,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl History for MemoryHistory {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn stack(&self) -> &HistoryStack {
        &self.stack
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.stack.push(entry);
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.stack.replace(entry);
    }

    fn go(&mut self, delta: isize) -> Option<HistoryEntry> {
        self.stack.go(delta).cloned()
    }

    fn sync_to(&mut self, position: usize) -> bool {
        self.stack.sync_to(position)
    }

    fn destroy(&mut self) {
        self.stack.clear();
    }
}

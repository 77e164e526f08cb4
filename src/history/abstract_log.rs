//! In-process history that records every operation.
//!
//! Useful for tools and tests that need to assert on the exact sequence of
//! history writes a run of navigations produced, including moves that did
//! not change any entry.

use serde::Serialize;

use crate::history::{History, HistoryEntry, HistoryStack};

/// Kind of history write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryOp {
    Push,
    Replace,
    Go(isize),
    Sync(usize),
}

/// One logged operation and the cursor it left behind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRecord {
    pub op: HistoryOp,
    /// URL at the cursor after the operation.
    pub url: Option<String>,
    pub cursor: Option<usize>,
    /// False for out-of-bounds moves.
    pub applied: bool,
}

#[derive(Debug, Default)]
pub struct AbstractLogHistory {
    stack: HistoryStack,
    log: Vec<HistoryRecord>,
}

impl AbstractLogHistory {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, op: HistoryOp, applied: bool) {
        let url = self.stack.current().map(|e| e.url.clone());
        tracing::trace!(?op, ?url, applied, "History operation");
        self.log.push(HistoryRecord {
            op,
            url,
            cursor: self.stack.cursor(),
            applied,
        });
    }
}

impl History for AbstractLogHistory {
    fn kind(&self) -> &'static str {
        "abstract-log"
    }

    fn stack(&self) -> &HistoryStack {
        &self.stack
    }

    fn push(&mut self, entry: HistoryEntry) {
        self.stack.push(entry);
        self.record(HistoryOp::Push, true);
    }

    fn replace(&mut self, entry: HistoryEntry) {
        self.stack.replace(entry);
        self.record(HistoryOp::Replace, true);
    }

    fn go(&mut self, delta: isize) -> Option<HistoryEntry> {
        let entry = self.stack.go(delta).cloned();
        self.record(HistoryOp::Go(delta), entry.is_some());
        entry
    }

    fn sync_to(&mut self, position: usize) -> bool {
        let applied = self.stack.sync_to(position);
        self.record(HistoryOp::Sync(position), applied);
        applied
    }

    fn records(&self) -> Vec<HistoryRecord> {
        self.log.clone()
    }

    fn destroy(&mut self) {
        self.stack.clear();
    }
}

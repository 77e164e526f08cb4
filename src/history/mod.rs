//! History adapters.
//!
//! # Data Flow
//! ```text
//! Commit (router::transition)
//!     → push / replace           (explicit navigations)
//!     → go(delta)                (back / forward / go replays)
//!     → sync_to(position)        (popstate: the substrate already moved)
//!     → adapter:
//!         - memory.rs        (in-process stack)
//!         - abstract_log.rs  (stack + append-only operation log)
//!         - browser.rs       (stack mirrored onto a HistorySubstrate)
//!
//! Native back/forward (browser only):
//!     HistorySubstrate → PopStateEvent channel
//!     → lifecycle::listener → Router::handle_popstate
//! ```
//!
//! # Design Decisions
//! - All adapters share one cursor-addressed [`HistoryStack`]
//! - Out-of-bounds moves return `None` and leave the cursor alone
//! - Adapters are synchronous; the router never holds one across an await

pub mod abstract_log;
pub mod browser;
pub mod memory;
pub mod stack;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

pub use abstract_log::{AbstractLogHistory, HistoryOp, HistoryRecord};
pub use browser::{BrowserHistory, HistorySubstrate};
pub use memory::MemoryHistory;
pub use stack::HistoryStack;

/// One history slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Absolute URL.
    pub url: String,
    pub state: Value,
}

impl HistoryEntry {
    pub fn new(url: impl Into<String>, state: Value) -> Self {
        Self {
            url: url.into(),
            state,
        }
    }
}

/// A native back/forward signal delivered by a substrate.
#[derive(Debug, Clone, PartialEq)]
pub struct PopStateEvent {
    pub url: String,
    pub state: Value,
    /// Index the substrate moved to, when it tracks one.
    pub position: Option<usize>,
}

/// Read-only copy of an adapter's entries and cursor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshot {
    pub mode: &'static str,
    pub entries: Vec<HistoryEntry>,
    pub cursor: Option<usize>,
}

/// Ordered stack of entries with a cursor.
pub trait History: Send {
    /// Short adapter name used in logs and snapshots.
    fn kind(&self) -> &'static str;

    fn stack(&self) -> &HistoryStack;

    fn push(&mut self, entry: HistoryEntry);

    fn replace(&mut self, entry: HistoryEntry);

    /// Move by `delta`. `None` when out of bounds.
    fn go(&mut self, delta: isize) -> Option<HistoryEntry>;

    fn back(&mut self) -> Option<HistoryEntry> {
        self.go(-1)
    }

    fn forward(&mut self) -> Option<HistoryEntry> {
        self.go(1)
    }

    /// Reposition after the substrate moved on its own.
    fn sync_to(&mut self, position: usize) -> bool;

    /// Target of `go(delta)` without moving.
    fn peek(&self, delta: isize) -> Option<(usize, HistoryEntry)> {
        self.stack()
            .peek(delta)
            .map(|(position, entry)| (position, entry.clone()))
    }

    fn cursor(&self) -> Option<usize> {
        self.stack().cursor()
    }

    fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            mode: self.kind(),
            entries: self.stack().entries().to_vec(),
            cursor: self.stack().cursor(),
        }
    }

    /// Operation log, for adapters that keep one.
    fn records(&self) -> Vec<HistoryRecord> {
        Vec::new()
    }

    /// Native popstate stream, for adapters backed by a substrate.
    fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<PopStateEvent>> {
        None
    }

    /// Swallow the echo of a router-initiated move. True when absorbed.
    fn absorb_echo(&mut self, _event: &PopStateEvent) -> bool {
        false
    }

    /// Detach from any substrate.
    fn destroy(&mut self) {}
}

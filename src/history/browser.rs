//! History mirrored onto an external substrate.
//!
//! # Responsibilities
//! - Keep a local stack in step with the substrate's entries
//! - Write router-initiated pushes, replaces and moves through to it
//! - Hand out the substrate's popstate stream to the router listener
//! - Recognise the popstate echo of a move the router made itself
//!
//! # Design Decisions
//! - The substrate is a trait object so tests and embedders supply their own
//! - A router-initiated `go` records the target position; the matching
//!   popstate is absorbed instead of triggering a second navigation

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::history::{History, HistoryEntry, HistoryStack, PopStateEvent};

/// A real history implementation, such as a browser's session history.
pub trait HistorySubstrate: Send + Sync {
    fn push_state(&self, url: &str, state: &Value, position: usize);

    fn replace_state(&self, url: &str, state: &Value, position: usize);

    /// Ask the substrate to move. It reports back through a popstate event.
    fn go(&self, delta: isize);

    /// Stream of native back/forward signals.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<PopStateEvent>;

    fn unsubscribe(&self) {}
}

pub struct BrowserHistory {
    stack: HistoryStack,
    substrate: Arc<dyn HistorySubstrate>,
    /// Positions of router-initiated moves whose popstate has not arrived yet.
    pending_echoes: Vec<usize>,
    subscribed: bool,
}

impl BrowserHistory {
    pub fn new(substrate: Arc<dyn HistorySubstrate>) -> Self {
        Self {
            stack: HistoryStack::new(),
            substrate,
            pending_echoes: Vec::new(),
            subscribed: false,
        }
    }

    pub fn pending_echoes(&self) -> usize {
        self.pending_echoes.len()
    }
}

impl std::fmt::Debug for BrowserHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHistory")
            .field("stack", &self.stack)
            .field("pending_echoes", &self.pending_echoes)
            .field("subscribed", &self.subscribed)
            .finish()
    }
}

impl History for BrowserHistory {
    fn kind(&self) -> &'static str {
        "history"
    }

    fn stack(&self) -> &HistoryStack {
        &self.stack
    }

    fn push(&mut self, entry: HistoryEntry) {
        let position = self.stack.push(entry.clone());
        self.substrate.push_state(&entry.url, &entry.state, position);
    }

    fn replace(&mut self, entry: HistoryEntry) {
        let position = self.stack.replace(entry.clone());
        self.substrate.replace_state(&entry.url, &entry.state, position);
    }

    fn go(&mut self, delta: isize) -> Option<HistoryEntry> {
        let entry = self.stack.go(delta).cloned()?;
        if let Some(position) = self.stack.cursor() {
            self.pending_echoes.push(position);
        }
        self.substrate.go(delta);
        Some(entry)
    }

    fn sync_to(&mut self, position: usize) -> bool {
        self.stack.sync_to(position)
    }

    fn subscribe(&mut self) -> Option<mpsc::UnboundedReceiver<PopStateEvent>> {
        if self.subscribed {
            return None;
        }
        self.subscribed = true;
        Some(self.substrate.subscribe())
    }

    fn absorb_echo(&mut self, event: &PopStateEvent) -> bool {
        let found = match event.position {
            Some(position) => self.pending_echoes.iter().position(|p| *p == position),
            None if !self.pending_echoes.is_empty() => Some(0),
            None => None,
        };
        match found {
            Some(index) => {
                self.pending_echoes.remove(index);
                tracing::debug!(url = %event.url, "Absorbed popstate echo");
                true
            }
            None => false,
        }
    }

    fn destroy(&mut self) {
        if self.subscribed {
            self.substrate.unsubscribe();
            self.subscribed = false;
        }
        self.pending_echoes.clear();
    }
}

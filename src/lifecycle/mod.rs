//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Router::new (browser mode):
//!     substrate.subscribe() → PopStateEvent channel
//!     → listener.rs (background task, holds a weak router handle)
//!     → Router::handle_popstate per event
//!
//! Router::destroy (teardown.rs):
//!     latch set → listener exits → substrate unsubscribed → render released
//! ```
//!
//! # Design Decisions
//! - The listener never keeps a router alive on its own
//! - Dropping the last router handle also ends the listener
//! - Each popstate navigation runs in its own task so a stalled guard
//!   does not hold back later events

pub mod listener;
pub mod teardown;

pub use teardown::{Teardown, TeardownSignal};

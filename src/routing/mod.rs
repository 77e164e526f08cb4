//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at router construction):
//!     RouteConfig tree
//!     → pattern.rs (compile each path template)
//!     → matcher.rs (flatten depth-first, absolute paths, param names)
//!     → Freeze as immutable RouteMatcher
//!
//! Lookup:
//!     base-relative path
//!     → matcher.rs (first match wins, recurse into children)
//!     → Return: root→leaf MatchedChain + params, or an empty chain
//! ```
//!
//! # Design Decisions
//! - Routes compiled once per router, immutable afterwards
//! - Deterministic: same input always matches the same chain
//! - Node identity (not path equality) decides update vs. enter/leave

pub mod config;
pub mod matcher;
pub mod pattern;

pub use config::{AppSelector, PayloadLoader, RouteConfig, RoutePayload};
pub use matcher::{same_chain, CompiledRoute, MatchResult, MatchedChain, RouteMatcher};
pub use pattern::PathPattern;

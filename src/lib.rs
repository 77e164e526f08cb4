//! Client-side navigation transition engine.
//!
//! A [`Router`] turns navigation requests into committed routes: it matches
//! a location against a compiled route tree, runs the guard pipeline the
//! difference between the current and the target route calls for, loads
//! deferred payloads and commits at most one current route at a time, no
//! matter how navigations overlap.
//!
//! # Architecture Overview
//!
//! ```text
//!   push / replace / back / go / popstate
//!              │
//!              ▼
//!   ┌──────────────────────┐     ┌───────────────┐
//!   │ router::transition   │────▶│ route (model) │──▶ routing (matcher)
//!   │  epoch, stages,      │     └───────────────┘
//!   │  redirects, commit   │     ┌───────────────┐
//!   │                      │────▶│ guards        │   diff + scheduler
//!   │                      │     └───────────────┘
//!   │                      │────▶ router::payload (deferred loaders)
//!   │                      │────▶ history (memory / abstract-log / browser)
//!   └──────────┬───────────┘
//!              ▼
//!   RenderAdapter::update, after_each
//!
//!   Cross-cutting: config, observability, lifecycle, error
//! ```

// Core subsystems
pub mod guards;
pub mod history;
pub mod route;
pub mod router;
pub mod routing;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;

pub use config::schema::RouterConfig;
pub use error::{BoxError, RouterError};
pub use guards::{after_hook, guard, sync_guard, GuardOutcome, HookId};
pub use history::{HistoryEntry, HistorySubstrate, PopStateEvent};
pub use lifecycle::Teardown;
pub use route::{Route, RouteLocation, RouteStatus, RouteType};
pub use router::{MatchMode, NavigationFallback, RenderAdapter, Router, RouterMode, RouterOptions};
pub use routing::{AppSelector, RouteConfig, RoutePayload};

//! Guard subsystem.
//!
//! # Data Flow
//! ```text
//! from (current Route or None), to (candidate Route)
//!     → scheduler.rs GuardPlan::diff (compare matched chains by identity)
//!     → scheduler.rs schedule (leave → before_each → enter | update)
//!     → scheduler.rs run_guards (await each hook, stop on first decision)
//!     → Verdict: Proceed | Abort | Redirect(location), or RouterError::Guard
//! ```
//!
//! # Design Decisions
//! - Hooks never run concurrently within one transition
//! - Global hook lists are per-router registries, snapshotted per transition
//! - `after_each` observers cannot block, redirect or fail a navigation

pub mod hooks;
pub mod scheduler;

pub use hooks::{after_hook, guard, sync_guard, AfterHook, Guard, GuardFuture, GuardOutcome, HookId, HookRegistry};
pub use scheduler::{run_guards, DiffMode, GuardPlan, GuardStep, HookKind, Verdict};

//! Guard diff scheduling.
//!
//! # Responsibilities
//! - Compare the `from` and `to` matched chains by node identity
//! - Decide which per-route hooks fire, and in which order
//! - Run the hooks one at a time and interpret each outcome
//!
//! # Modes
//! ```text
//! from = None                          → Initial    (enter, root→leaf)
//! same chain, different full path      → Update     (update, root→leaf)
//! same chain, same full path           → Unchanged  (no per-route hooks)
//! anything else                        → Structural (leave leaf→root, enter root→leaf)
//! ```
//!
//! # Order
//! `before_leave` → `before_each` → `before_enter` | `before_update`.
//! The first hook that does not continue ends the pipeline.
//! A hook that panics fails the navigation like one that returns an error.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::Instrument;

use crate::error::{BoxError, RouterError};
use crate::guards::hooks::{Guard, GuardOutcome};
use crate::route::{Route, RouteLocation};
use crate::routing::{same_chain, CompiledRoute, MatchedChain};

/// Which comparison rule applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    Initial,
    Update,
    Unchanged,
    Structural,
}

/// Kind of hook in a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    BeforeLeave,
    BeforeEach,
    BeforeEnter,
    BeforeUpdate,
}

impl HookKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::BeforeLeave => "before_leave",
            HookKind::BeforeEach => "before_each",
            HookKind::BeforeEnter => "before_enter",
            HookKind::BeforeUpdate => "before_update",
        }
    }
}

/// Per-route hook sets derived from two matched chains.
#[derive(Debug, Clone)]
pub struct GuardPlan {
    pub mode: DiffMode,
    /// Leaf→root.
    pub leaving: MatchedChain,
    /// Root→leaf.
    pub entering: MatchedChain,
    /// Root→leaf.
    pub updating: MatchedChain,
}

impl GuardPlan {
    pub fn diff(from: Option<&Route>, to: &Route) -> Self {
        let Some(from) = from else {
            return Self {
                mode: DiffMode::Initial,
                leaving: Vec::new(),
                entering: to.matched.clone(),
                updating: Vec::new(),
            };
        };

        if same_chain(&from.matched, &to.matched) {
            let changed = from.full_path != to.full_path;
            return Self {
                mode: if changed { DiffMode::Update } else { DiffMode::Unchanged },
                leaving: Vec::new(),
                entering: Vec::new(),
                updating: if changed { to.matched.clone() } else { Vec::new() },
            };
        }

        let shared = from
            .matched
            .iter()
            .zip(&to.matched)
            .take_while(|(a, b)| Arc::ptr_eq(a, b))
            .count();

        Self {
            mode: DiffMode::Structural,
            leaving: from.matched[shared..].iter().rev().cloned().collect(),
            entering: to.matched[shared..].to_vec(),
            updating: Vec::new(),
        }
    }

    /// Every hook to run, in order, given the global `before_each` list.
    pub fn schedule(&self, before_each: &[Guard]) -> Vec<GuardStep> {
        let mut steps = Vec::new();

        for node in &self.leaving {
            if let Some(guard) = node.before_leave() {
                steps.push(GuardStep::route(HookKind::BeforeLeave, node, guard));
            }
        }
        for guard in before_each {
            steps.push(GuardStep {
                kind: HookKind::BeforeEach,
                node: None,
                guard: guard.clone(),
            });
        }
        for node in &self.entering {
            if let Some(guard) = node.before_enter() {
                steps.push(GuardStep::route(HookKind::BeforeEnter, node, guard));
            }
        }
        for node in &self.updating {
            if let Some(guard) = node.before_update() {
                steps.push(GuardStep::route(HookKind::BeforeUpdate, node, guard));
            }
        }

        steps
    }
}

/// One hook invocation in a schedule.
#[derive(Clone)]
pub struct GuardStep {
    pub kind: HookKind,
    /// The route node owning the hook; `None` for global hooks.
    pub node: Option<Arc<CompiledRoute>>,
    pub guard: Guard,
}

impl GuardStep {
    fn route(kind: HookKind, node: &Arc<CompiledRoute>, guard: &Guard) -> Self {
        Self {
            kind,
            node: Some(node.clone()),
            guard: guard.clone(),
        }
    }

    fn label(&self) -> &str {
        self.node.as_ref().map(|n| n.absolute_path()).unwrap_or("*")
    }
}

impl std::fmt::Debug for GuardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardStep")
            .field("kind", &self.kind)
            .field("route", &self.label())
            .finish()
    }
}

/// Final decision of the guard phase.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Proceed,
    Abort,
    Redirect(RouteLocation),
}

/// Run every step in order, awaiting each before starting the next.
pub async fn run_guards(
    steps: &[GuardStep],
    to: &Route,
    from: Option<&Route>,
) -> Result<Verdict, RouterError> {
    for step in steps {
        let span = tracing::debug_span!("guard", hook = step.kind.as_str(), route = step.label());
        let call = catch_unwind(AssertUnwindSafe(|| (step.guard)(to.clone(), from.cloned())));
        let outcome = match call {
            Ok(future) => AssertUnwindSafe(future)
                .catch_unwind()
                .instrument(span)
                .await
                .unwrap_or_else(|panic| Err(panic_error(panic))),
            Err(panic) => Err(panic_error(panic)),
        };

        match outcome {
            Ok(GuardOutcome::Continue) => {
                tracing::debug!(hook = step.kind.as_str(), route = step.label(), "Guard passed");
            }
            Ok(GuardOutcome::Abort) => {
                tracing::info!(
                    hook = step.kind.as_str(),
                    route = step.label(),
                    path = %to.full_path,
                    "Guard aborted navigation"
                );
                return Ok(Verdict::Abort);
            }
            Ok(GuardOutcome::Redirect(location)) => {
                tracing::info!(
                    hook = step.kind.as_str(),
                    route = step.label(),
                    location = %location,
                    "Guard redirected navigation"
                );
                return Ok(Verdict::Redirect(location));
            }
            Err(source) => {
                tracing::error!(
                    hook = step.kind.as_str(),
                    route = step.label(),
                    path = %to.full_path,
                    error = %source,
                    "Guard failed"
                );
                return Err(RouterError::Guard {
                    path: to.full_path.clone(),
                    source,
                });
            }
        }
    }
    Ok(Verdict::Proceed)
}

fn panic_error(panic: Box<dyn Any + Send>) -> BoxError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("guard panicked: {}", message).into()
}

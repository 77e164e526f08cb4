//! Hook types and the global hook registry.
//!
//! Every guard, per-route or global, has the same shape: it receives clones
//! of the candidate route and the current route and resolves to a
//! [`GuardOutcome`]. `after_each` observers are synchronous and cannot
//! influence the transition.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::error::BoxError;
use crate::route::{Route, RouteLocation};

/// What a guard decided.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Carry on with the next hook.
    Continue,
    /// Stop the whole pipeline; the navigation resolves as aborted.
    Abort,
    /// Stop and start a new transition towards this location.
    Redirect(RouteLocation),
}

impl From<()> for GuardOutcome {
    fn from(_: ()) -> Self {
        GuardOutcome::Continue
    }
}

impl From<bool> for GuardOutcome {
    fn from(allow: bool) -> Self {
        if allow {
            GuardOutcome::Continue
        } else {
            GuardOutcome::Abort
        }
    }
}

impl From<RouteLocation> for GuardOutcome {
    fn from(location: RouteLocation) -> Self {
        GuardOutcome::Redirect(location)
    }
}

impl From<&str> for GuardOutcome {
    fn from(location: &str) -> Self {
        GuardOutcome::Redirect(location.into())
    }
}

impl From<String> for GuardOutcome {
    fn from(location: String) -> Self {
        GuardOutcome::Redirect(location.into())
    }
}

/// Future returned by a guard.
pub type GuardFuture = BoxFuture<'static, Result<GuardOutcome, BoxError>>;

/// A navigation guard: `(to, from) -> outcome`.
pub type Guard = Arc<dyn Fn(Route, Option<Route>) -> GuardFuture + Send + Sync>;

/// An `after_each` observer.
pub type AfterHook = Arc<dyn Fn(&Route, Option<&Route>) + Send + Sync>;

/// Build a guard from an async closure.
pub fn guard<F, Fut, O>(f: F) -> Guard
where
    F: Fn(Route, Option<Route>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, BoxError>> + Send + 'static,
    O: Into<GuardOutcome>,
{
    Arc::new(move |to: Route, from: Option<Route>| -> GuardFuture {
        f(to, from).map(|r| r.map(Into::into)).boxed()
    })
}

/// Build a guard from a synchronous closure.
pub fn sync_guard<F, O>(f: F) -> Guard
where
    F: Fn(&Route, Option<&Route>) -> Result<O, BoxError> + Send + Sync + 'static,
    O: Into<GuardOutcome>,
{
    Arc::new(move |to: Route, from: Option<Route>| -> GuardFuture {
        future::ready(f(&to, from.as_ref()).map(Into::into)).boxed()
    })
}

/// Build an `after_each` observer.
pub fn after_hook<F>(f: F) -> AfterHook
where
    F: Fn(&Route, Option<&Route>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Handle returned on registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// Ordered list of registered hooks.
pub struct HookRegistry<T> {
    next_id: u64,
    hooks: Vec<(HookId, T)>,
}

impl<T: Clone> HookRegistry<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            hooks: Vec::new(),
        }
    }

    /// Append a hook; it runs after every hook registered before it.
    pub fn register(&mut self, hook: T) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, hook));
        id
    }

    /// Remove a hook. Returns false if it was not registered.
    pub fn unregister(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(hook_id, _)| *hook_id != id);
        self.hooks.len() != before
    }

    /// Hooks in registration order, detached from the registry.
    pub fn snapshot(&self) -> Vec<T> {
        self.hooks.iter().map(|(_, hook)| hook.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl<T: Clone> Default for HookRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

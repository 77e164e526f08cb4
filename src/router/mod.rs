//! Router: the public navigation API.
//!
//! # Data Flow
//! ```text
//! push / replace / reload / push_window / replace_window (location)
//!     → transition.rs (fresh request)
//!
//! back / forward / go (delta)
//!     → history peek: out of bounds? → Ok(None) (+ back boundary handler)
//!     → transition.rs (replay of the target entry)
//!
//! substrate popstate
//!     → lifecycle::listener → handle_popstate
//!     → echo of our own move? → swallowed
//!     → transition.rs (popstate, cursor re-synced on commit)
//!
//! resolve (location)
//!     → route::resolve only; no epoch, no history, no hooks
//! ```
//!
//! # Design Decisions
//! - `Router` is a cheap handle around shared state; clone it freely
//! - The current route lives in an `ArcSwapOption`, read without locking
//! - History and hook registries sit behind short std mutexes that are
//!   never held across an await
//! - Cancellation is an epoch compare at commit, never an interruption

pub mod options;
pub mod payload;
pub mod stages;
pub mod transition;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use arc_swap::ArcSwapOption;
use url::Url;

use crate::error::RouterError;
use crate::guards::{AfterHook, Guard, HookId, HookRegistry};
use crate::history::{History, HistoryRecord, HistorySnapshot, PopStateEvent};
use crate::lifecycle::{listener, Teardown};
use crate::route::{self, Route, RouteLocation, RouteType};
use crate::routing::RouteMatcher;

pub use options::{
    BackBoundaryHandler, NavigationFallback, RenderAdapter, RouterMode, RouterOptions,
    DEFAULT_MAX_REDIRECTS,
};
pub use stages::{Stage, StageTable};

use transition::{Replay, TransitionRequest};

/// How `is_route_matched` compares a location with the current route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Same matched chain, any params.
    Route,
    /// Identical full path.
    Exact,
    /// The location's full path is a prefix of the current one.
    Include,
}

pub(crate) struct RouterInner {
    pub(crate) options: RouterOptions,
    matcher: RouteMatcher,
    pub(crate) stages: StageTable,
    pub(crate) epoch: AtomicU64,
    pub(crate) current: ArcSwapOption<Route>,
    history: Mutex<Box<dyn History>>,
    before_each: Mutex<HookRegistry<Guard>>,
    after_each: Mutex<HookRegistry<AfterHook>>,
    teardown: Teardown,
}

impl RouterInner {
    pub(crate) fn lock_history(&self) -> MutexGuard<'_, Box<dyn History>> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn before_each_snapshot(&self) -> Vec<Guard> {
        self.before_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub(crate) fn after_each_snapshot(&self) -> Vec<AfterHook> {
        self.after_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot()
    }

    pub(crate) fn ensure_alive(&self) -> Result<(), RouterError> {
        if self.teardown.is_done() {
            Err(RouterError::Destroyed)
        } else {
            Ok(())
        }
    }

    pub(crate) fn resolve(
        &self,
        location: &RouteLocation,
        route_type: RouteType,
        from: Option<&Route>,
    ) -> Result<Route, RouterError> {
        route::resolve(
            location,
            &self.options.base,
            from.map(|r| &r.url),
            &self.matcher,
            route_type,
        )
    }
}

/// Handle to a navigation engine.
#[derive(Clone)]
pub struct Router {
    pub(crate) inner: Arc<RouterInner>,
}

impl Router {
    /// Compile the route tree and attach the history adapter.
    ///
    /// With a browser substrate, the popstate listener is spawned on the
    /// current tokio runtime.
    pub fn new(options: RouterOptions) -> Result<Self, RouterError> {
        let matcher = RouteMatcher::compile(&options.routes)?;
        let mut history = options.mode.build_history();
        let events = history.subscribe();

        tracing::info!(
            base = %options.base,
            mode = options.mode.as_str(),
            routes = matcher.nodes().len(),
            "Router created"
        );

        let router = Self {
            inner: Arc::new(RouterInner {
                options,
                matcher,
                stages: StageTable::new(),
                epoch: AtomicU64::new(0),
                current: ArcSwapOption::empty(),
                history: Mutex::new(history),
                before_each: Mutex::new(HookRegistry::new()),
                after_each: Mutex::new(HookRegistry::new()),
                teardown: Teardown::new(),
            }),
        };

        if let Some(events) = events {
            listener::spawn_popstate_listener(&router, events, router.inner.teardown.signal());
        }
        Ok(router)
    }

    pub(crate) fn from_inner(inner: Arc<RouterInner>) -> Self {
        Self { inner }
    }

    pub async fn push(&self, location: impl Into<RouteLocation>) -> Result<Route, RouterError> {
        self.navigate(RouteType::Push, location.into()).await
    }

    pub async fn replace(&self, location: impl Into<RouteLocation>) -> Result<Route, RouterError> {
        self.navigate(RouteType::Replace, location.into()).await
    }

    /// Re-run the pipeline for a location, replacing the current entry.
    pub async fn reload(&self, location: impl Into<RouteLocation>) -> Result<Route, RouterError> {
        self.navigate(RouteType::Reload, location.into()).await
    }

    /// Resolve and hand to the fallback collaborator; never commits.
    pub async fn push_window(&self, location: impl Into<RouteLocation>) -> Result<Route, RouterError> {
        self.navigate(RouteType::PushWindow, location.into()).await
    }

    pub async fn replace_window(
        &self,
        location: impl Into<RouteLocation>,
    ) -> Result<Route, RouterError> {
        self.navigate(RouteType::ReplaceWindow, location.into()).await
    }

    pub async fn back(&self) -> Result<Option<Route>, RouterError> {
        self.replay(RouteType::Back, -1).await
    }

    pub async fn forward(&self) -> Result<Option<Route>, RouterError> {
        self.replay(RouteType::Forward, 1).await
    }

    pub async fn go(&self, delta: isize) -> Result<Option<Route>, RouterError> {
        self.replay(RouteType::Go, delta).await
    }

    /// Resolve a location without navigating.
    pub fn resolve(&self, location: impl Into<RouteLocation>) -> Result<Route, RouterError> {
        let current = self.inner.current.load_full();
        self.inner
            .resolve(&location.into(), RouteType::Resolve, current.as_deref())
    }

    /// The committed route, if any navigation has committed yet.
    pub fn route(&self) -> Option<Arc<Route>> {
        self.inner.current.load_full()
    }

    /// Compare a location with the current route. False before the first commit.
    pub fn is_route_matched(&self, location: impl Into<RouteLocation>, mode: MatchMode) -> bool {
        let Some(current) = self.route() else {
            return false;
        };
        let Ok(target) = self.resolve(location) else {
            return false;
        };

        match mode {
            MatchMode::Route => target.is_matched() && current.same_definition(&target),
            MatchMode::Exact => current.full_path == target.full_path,
            MatchMode::Include => current.full_path.starts_with(&target.full_path),
        }
    }

    /// Register a global guard. Runs after every guard registered before it.
    pub fn before_each(&self, guard: Guard) -> HookId {
        self.inner
            .before_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(guard)
    }

    pub fn un_before_each(&self, id: HookId) -> bool {
        self.inner
            .before_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(id)
    }

    /// Register an observer of committed navigations.
    pub fn after_each(&self, hook: AfterHook) -> HookId {
        self.inner
            .after_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .register(hook)
    }

    pub fn un_after_each(&self, id: HookId) -> bool {
        self.inner
            .after_each
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unregister(id)
    }

    /// Feed a native back/forward signal into the router.
    ///
    /// Returns `Ok(None)` when the event is the echo of a move the router
    /// made itself.
    pub async fn handle_popstate(&self, event: PopStateEvent) -> Result<Option<Route>, RouterError> {
        self.inner.ensure_alive()?;

        let absorbed = self.inner.lock_history().absorb_echo(&event);
        if absorbed {
            return Ok(None);
        }

        let request = TransitionRequest {
            nav: RouteType::Popstate,
            location: RouteLocation::new(event.url).with_state(event.state),
            replay: Replay::Sync {
                position: event.position,
            },
        };
        transition::run(self, request).await.map(Some)
    }

    /// Detach from the history substrate and release the render collaborator.
    /// Later navigation calls fail with [`RouterError::Destroyed`].
    pub fn destroy(&self) {
        if !self.inner.teardown.begin() {
            return;
        }
        self.inner.lock_history().destroy();
        if let Some(render) = &self.inner.options.render {
            render.destroy();
        }
        tracing::info!("Router destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.teardown.is_done()
    }

    pub fn history_snapshot(&self) -> HistorySnapshot {
        self.inner.lock_history().snapshot()
    }

    /// Operation log of the `abstract-log` adapter; empty for the others.
    pub fn history_records(&self) -> Vec<HistoryRecord> {
        self.inner.lock_history().records()
    }

    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }

    pub fn base(&self) -> &Url {
        &self.inner.options.base
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.inner.matcher
    }

    /// Number of transitions started so far, redirects included.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    async fn navigate(&self, nav: RouteType, location: RouteLocation) -> Result<Route, RouterError> {
        transition::run(self, TransitionRequest::fresh(nav, location)).await
    }

    async fn replay(&self, nav: RouteType, delta: isize) -> Result<Option<Route>, RouterError> {
        self.inner.ensure_alive()?;

        let target = self.inner.lock_history().peek(delta);
        let Some((position, entry)) = target else {
            tracing::debug!(nav = %nav, delta, "History boundary reached");
            if nav == RouteType::Back {
                if let Some(handler) = &self.inner.options.handle_back_boundary {
                    handler();
                }
            }
            return Ok(None);
        };

        let request = TransitionRequest {
            nav,
            location: RouteLocation::new(entry.url).with_state(entry.state),
            replay: Replay::Go { position },
        };
        transition::run(self, request).await.map(Some)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("base", &self.inner.options.base.as_str())
            .field("mode", &self.inner.options.mode)
            .field("epoch", &self.epoch())
            .field("current", &self.route().map(|r| r.full_path.clone()))
            .finish()
    }
}

//! The transition controller.
//!
//! # Responsibilities
//! - Resolve the target, hand unmatched targets to the fallback
//! - Assign every attempt a fresh epoch
//! - Run the stage list of the navigation type
//! - Restart on redirect, up to the configured limit
//! - Commit only when the attempt is still the newest one
//!
//! # Data Flow
//! ```text
//! TransitionRequest { nav, location, replay }
//!     → resolve against the current route
//!     → no match? fallback(to, from) → Route (success, no commit)
//!     → epoch += 1
//!     → stages: ResolveLocation → Guards → Payload → Commit → AfterEach
//!         - Redirect  → still newest? new request, same nav, loop
//!                       superseded? Route (aborted)
//!         - Abort     → Route (aborted)
//!         - Error     → RouterError
//!     → Commit: epoch still current?
//!         - no  → Route (aborted), nothing written
//!         - yes → current route, history, render, after_each
//! ```

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::error::RouterError;
use crate::guards::{run_guards, GuardPlan, Verdict};
use crate::history::{History, HistoryEntry};
use crate::observability::metrics;
use crate::route::{Route, RouteLocation, RouteStatus, RouteType};
use crate::router::payload::load_payloads;
use crate::router::stages::Stage;
use crate::router::{Router, RouterInner};

/// How a navigation relates to existing history entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// A new target; push or replace on commit.
    Fresh,
    /// back / forward / go towards the entry at `position`.
    Go { position: usize },
    /// The substrate already moved to `position`.
    Sync { position: Option<usize> },
}

#[derive(Debug, Clone)]
pub(crate) struct TransitionRequest {
    pub nav: RouteType,
    pub location: RouteLocation,
    pub replay: Replay,
}

impl TransitionRequest {
    pub fn fresh(nav: RouteType, location: RouteLocation) -> Self {
        Self {
            nav,
            location,
            replay: Replay::Fresh,
        }
    }

    fn redirect(&self, location: RouteLocation) -> Self {
        Self {
            nav: self.nav,
            location,
            replay: self.replay,
        }
    }
}

enum Step {
    Done,
    Redirect(RouteLocation),
}

/// Run a navigation to completion, following redirects.
pub(crate) async fn run(router: &Router, request: TransitionRequest) -> Result<Route, RouterError> {
    let started = Instant::now();
    let nav = request.nav;
    let result = drive(router, request).await;

    if router.inner.options.record_metrics {
        let outcome = match &result {
            Ok(route) => metrics::outcome_label(Some(route.status)),
            Err(_) => metrics::outcome_label(None),
        };
        metrics::record_transition(nav, outcome, started);
        if result.as_ref().is_err_and(RouterError::is_guard_error) {
            metrics::record_guard_error(nav);
        }
    }
    result
}

async fn drive(router: &Router, mut request: TransitionRequest) -> Result<Route, RouterError> {
    let inner = &router.inner;
    let mut redirects = 0;

    loop {
        inner.ensure_alive()?;

        let from = inner.current.load_full();
        let mut to = inner.resolve(&request.location, request.nav, from.as_deref())?;

        if !to.is_matched() {
            tracing::debug!(nav = %request.nav, path = %to.full_path, "No route matched");
            return Ok(fall_back(inner, to, from.as_deref()));
        }

        let epoch = inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let span = tracing::info_span!(
            "transition",
            epoch,
            nav = request.nav.as_str(),
            path = %to.full_path
        );

        let step = run_stages(router, &request, &mut to, from.as_deref(), epoch)
            .instrument(span)
            .await?;

        match step {
            Step::Done => return Ok(to),
            Step::Redirect(location) => {
                let latest = inner.epoch.load(Ordering::SeqCst);
                if latest != epoch {
                    to.status = RouteStatus::Aborted;
                    tracing::warn!(
                        epoch,
                        latest,
                        location = %location,
                        "Dropping redirect of superseded navigation"
                    );
                    return Ok(to);
                }

                redirects += 1;
                if redirects > inner.options.max_redirects {
                    tracing::error!(
                        limit = inner.options.max_redirects,
                        location = %location,
                        "Redirect limit exceeded"
                    );
                    return Err(RouterError::TooManyRedirects {
                        limit: inner.options.max_redirects,
                        path: location.to_string(),
                    });
                }
                if inner.options.record_metrics {
                    metrics::record_redirect(request.nav);
                }
                tracing::debug!(from = %to.full_path, to = %location, redirects, "Following redirect");
                request = request.redirect(location);
            }
        }
    }
}

async fn run_stages(
    router: &Router,
    request: &TransitionRequest,
    to: &mut Route,
    from: Option<&Route>,
    epoch: u64,
) -> Result<Step, RouterError> {
    let inner = &router.inner;

    for stage in inner.stages.stages(request.nav) {
        match stage {
            Stage::ResolveLocation => {
                if let Some(target) = to.leaf().and_then(|leaf| leaf.redirect()) {
                    tracing::debug!(redirect = target, "Route declares a redirect");
                    return Ok(Step::Redirect(RouteLocation::from(target)));
                }
            }
            Stage::Guards => {
                let before_each = inner.before_each_snapshot();
                let plan = GuardPlan::diff(from, to);
                let steps = plan.schedule(&before_each);
                tracing::debug!(mode = ?plan.mode, hooks = steps.len(), "Running guards");

                match run_guards(&steps, to, from).await {
                    Ok(Verdict::Proceed) => {}
                    Ok(Verdict::Abort) => {
                        to.status = RouteStatus::Aborted;
                        tracing::warn!(path = %to.full_path, "Navigation aborted by guard");
                        return Ok(Step::Done);
                    }
                    Ok(Verdict::Redirect(location)) => return Ok(Step::Redirect(location)),
                    Err(err) => {
                        to.status = RouteStatus::Error;
                        return Err(err);
                    }
                }
            }
            Stage::Payload => {
                if let Err(err) = load_payloads(to, inner.options.record_metrics).await {
                    to.status = RouteStatus::Error;
                    return Err(err);
                }
            }
            Stage::Commit => {
                if !commit(router, request, to, epoch) {
                    return Ok(Step::Done);
                }
            }
            Stage::AfterEach => run_after_each(inner, to, from),
            Stage::OpenWindow => {
                let route = fall_back(inner, to.clone(), from);
                *to = route;
                return Ok(Step::Done);
            }
        }
    }
    Ok(Step::Done)
}

/// Hand a route the router will not commit to the fallback collaborator.
fn fall_back(inner: &RouterInner, mut to: Route, from: Option<&Route>) -> Route {
    to.status = RouteStatus::Success;
    match &inner.options.fallback {
        Some(fallback) => to.handle = fallback.fallback(&to, from),
        None => tracing::warn!(path = %to.full_path, nav = %to.route_type, "No fallback configured"),
    }
    to
}

/// Returns false when a newer transition has started since `epoch`.
fn commit(router: &Router, request: &TransitionRequest, to: &mut Route, epoch: u64) -> bool {
    let inner = &router.inner;
    {
        let mut history = inner.lock_history();

        let latest = inner.epoch.load(Ordering::SeqCst);
        if latest != epoch {
            to.status = RouteStatus::Aborted;
            tracing::warn!(epoch, latest, path = %to.full_path, "Discarding superseded navigation");
            return false;
        }

        to.status = RouteStatus::Success;
        inner.current.store(Some(Arc::new(to.clone())));
        write_history(&mut **history, request, to);
    }

    tracing::info!(path = %to.full_path, nav = %to.route_type, "Navigation committed");

    if let Some(render) = &inner.options.render {
        render.update(router);
    }
    true
}

fn write_history(history: &mut dyn History, request: &TransitionRequest, to: &Route) {
    let entry = HistoryEntry::new(to.href(), to.state.clone());

    match request.replay {
        Replay::Fresh if to.is_push => history.push(entry),
        Replay::Fresh => history.replace(entry),
        Replay::Go { position } => {
            let moved = match history.cursor() {
                Some(cursor) if cursor == position => true,
                Some(cursor) => history.go(position as isize - cursor as isize).is_some(),
                None => false,
            };
            settle(history, moved, entry);
        }
        Replay::Sync { position: Some(position) } => {
            let moved = history.sync_to(position);
            settle(history, moved, entry);
        }
        Replay::Sync { position: None } => history.replace(entry),
    }
}

/// After repositioning, make the entry under the cursor match the route.
fn settle(history: &mut dyn History, moved: bool, entry: HistoryEntry) {
    if !moved {
        history.push(entry);
        return;
    }
    let current = history.stack().current().map(|e| e.url.as_str());
    if current != Some(entry.url.as_str()) {
        history.replace(entry);
    }
}

fn run_after_each(inner: &RouterInner, to: &Route, from: Option<&Route>) {
    for (index, hook) in inner.after_each_snapshot().into_iter().enumerate() {
        if catch_unwind(AssertUnwindSafe(|| hook(to, from))).is_err() {
            tracing::error!(hook = index, path = %to.full_path, "after_each hook panicked");
        }
    }
}

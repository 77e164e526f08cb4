//! Navigation metrics.
//!
//! # Metrics
//! - `router_transitions_total` (counter): finished transitions by type, outcome
//! - `router_transition_duration_seconds` (histogram): time from request to settle
//! - `router_redirects_total` (counter): redirects followed, by type
//! - `router_guard_errors_total` (counter): guards that returned an error, by type
//! - `router_payload_loads_total` (counter): deferred loader runs by outcome
//!
//! # Design Decisions
//! - Labels are static strings wherever possible
//! - Recording goes through the `metrics` facade; no recorder, no cost

use std::time::Instant;

use metrics::{counter, histogram};

use crate::route::{RouteStatus, RouteType};

/// Outcome label for a settled transition.
pub fn outcome_label(status: Option<RouteStatus>) -> &'static str {
    match status {
        Some(RouteStatus::Success) => "success",
        Some(RouteStatus::Aborted) => "aborted",
        Some(RouteStatus::Pending) => "pending",
        Some(RouteStatus::Error) | None => "error",
    }
}

pub fn record_transition(route_type: RouteType, outcome: &'static str, started: Instant) {
    counter!(
        "router_transitions_total",
        "type" => route_type.as_str(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("router_transition_duration_seconds", "type" => route_type.as_str())
        .record(started.elapsed().as_secs_f64());
}

pub fn record_redirect(route_type: RouteType) {
    counter!("router_redirects_total", "type" => route_type.as_str()).increment(1);
}

pub fn record_guard_error(route_type: RouteType) {
    counter!("router_guard_errors_total", "type" => route_type.as_str()).increment(1);
}

pub fn record_payload_load(success: bool) {
    let outcome = if success { "success" } else { "error" };
    counter!("router_payload_loads_total", "outcome" => outcome).increment(1);
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Transition controller, guard scheduler, payload stage produce:
//!     → logging.rs (structured tracing events inside a per-transition span)
//!     → metrics.rs (counters and histograms through the `metrics` facade)
//!
//! Consumers:
//!     → stderr via tracing-subscriber (pretty or JSON)
//!     → whatever recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Every event of one navigation carries its epoch through the span
//! - The library never installs a metrics exporter; recording is a no-op
//!   until the host application does

pub mod logging;
pub mod metrics;

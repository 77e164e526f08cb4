//! Router error taxonomy.
//!
//! # Design Decisions
//! - Aborted and redirected transitions are not errors; they resolve normally
//! - Guard and loader failures keep the original error as `source()`
//! - History boundary misses are `Ok(None)`, never an error

use thiserror::Error;

/// Error type produced by user hooks and payload loaders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by navigation operations.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A guard hook returned an error.
    #[error("guard failed while navigating to {path}: {source}")]
    Guard {
        path: String,
        #[source]
        source: BoxError,
    },

    /// A deferred payload loader failed.
    #[error("failed to load payload for route {route}: {source}")]
    PayloadLoad {
        route: String,
        #[source]
        source: BoxError,
    },

    /// A payload loader resolved to a value the render layer cannot use.
    #[error("payload for route {route} resolved to an invalid value")]
    InvalidPayload { route: String },

    /// A redirect chain exceeded the configured limit.
    #[error("redirect limit of {limit} exceeded while navigating to {path}")]
    TooManyRedirects { limit: usize, path: String },

    /// A location could not be turned into a URL.
    #[error("invalid location {location:?}: {source}")]
    InvalidLocation {
        location: String,
        #[source]
        source: url::ParseError,
    },

    /// A route path template could not be compiled.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// The router was destroyed before the call.
    #[error("router has been destroyed")]
    Destroyed,
}

impl RouterError {
    /// Whether this error came out of the guard pipeline (including redirect loops).
    pub fn is_guard_error(&self) -> bool {
        matches!(self, RouterError::Guard { .. } | RouterError::TooManyRedirects { .. })
    }

    /// Whether this error came out of the payload stage.
    pub fn is_payload_error(&self) -> bool {
        matches!(self, RouterError::PayloadLoad { .. } | RouterError::InvalidPayload { .. })
    }
}

//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the base is an absolute, hierarchical URL
//! - Compile every route template once to surface pattern errors early
//! - Detect duplicate route names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::{RouteTable, RouterConfig};
use crate::routing::PathPattern;

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base {base:?} is not a usable absolute URL: {reason}")]
    InvalidBase { base: String, reason: String },

    #[error("route {path:?} has an invalid pattern: {reason}")]
    InvalidPattern { path: String, reason: String },

    #[error("route name {name:?} is declared more than once")]
    DuplicateName { name: String },

    #[error("route {path:?} declares an empty redirect")]
    EmptyRedirect { path: String },

    #[error("max_redirects must be at least 1")]
    ZeroRedirectLimit,

    #[error("log level {level:?} is not a valid filter directive")]
    InvalidLogLevel { level: String },
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(reason) = check_base(&config.base) {
        errors.push(ValidationError::InvalidBase {
            base: config.base.clone(),
            reason,
        });
    }

    if config.max_redirects == 0 {
        errors.push(ValidationError::ZeroRedirectLimit);
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel {
            level: config.observability.log_level.clone(),
        });
    }

    let mut names = HashSet::new();
    for route in &config.routes {
        validate_route(route, "", &mut names, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_base(base: &str) -> Result<(), String> {
    let url = Url::parse(base).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("URL cannot be used as a base".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("base must not carry a query or fragment".to_string());
    }
    Ok(())
}

fn validate_route(
    route: &RouteTable,
    parent: &str,
    names: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    let display = format!("{}/{}", parent.trim_end_matches('/'), route.path.trim_start_matches('/'));

    if let Err(e) = PathPattern::new(&route.path) {
        errors.push(ValidationError::InvalidPattern {
            path: display.clone(),
            reason: e.to_string(),
        });
    }

    if let Some(name) = &route.name {
        if !names.insert(name.clone()) {
            errors.push(ValidationError::DuplicateName { name: name.clone() });
        }
    }

    if matches!(route.redirect.as_deref(), Some(r) if r.trim().is_empty()) {
        errors.push(ValidationError::EmptyRedirect {
            path: display.clone(),
        });
    }

    for child in &route.children {
        validate_route(child, &display, names, errors);
    }
}

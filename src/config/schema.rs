//! Configuration schema definitions.
//!
//! This module defines the file representation of a router: base URL,
//! history mode, the static part of the route tree and ambient settings.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::routing::{AppSelector, RouteConfig, RoutePayload};

/// Root configuration for a router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Absolute base URL; a trailing `/` is added when missing.
    pub base: String,

    /// History adapter.
    pub mode: ModeKind,

    /// Longest redirect chain a single navigation may follow.
    pub max_redirects: usize,

    /// Route tree, in declaration order.
    pub routes: Vec<RouteTable>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Pass-through values for the render collaborator.
    pub render: RenderConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            base: "http://localhost/".to_string(),
            mode: ModeKind::Memory,
            max_redirects: 10,
            routes: Vec::new(),
            observability: ObservabilityConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

/// History adapter selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModeKind {
    #[default]
    Memory,
    AbstractLog,
    /// Requires a substrate supplied in code.
    History,
}

/// One node of the route tree.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteTable {
    /// Path template, relative to the parent.
    pub path: String,

    pub name: Option<String>,

    /// Static redirect target.
    pub redirect: Option<String>,

    /// App key for the render collaborator.
    pub app: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,

    /// Static payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    pub children: Vec<RouteTable>,
}

impl From<&RouteTable> for RouteConfig {
    fn from(table: &RouteTable) -> Self {
        RouteConfig {
            path: table.path.clone(),
            name: table.name.clone(),
            children: table.children.iter().map(RouteConfig::from).collect(),
            meta: table.meta.clone().unwrap_or(Value::Null),
            payload: table
                .payload
                .clone()
                .map(RoutePayload::Static)
                .unwrap_or_default(),
            app: table
                .app
                .clone()
                .map(AppSelector::Named)
                .unwrap_or_default(),
            redirect: table.redirect.clone(),
            ..Default::default()
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Record navigation metrics through the `metrics` facade.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

/// Values handed untouched to the render collaborator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderConfig {
    pub root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_style: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub apps: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.base, "http://localhost/");
        assert_eq!(config.mode, ModeKind::Memory);
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_route_table_into_config() {
        let config: RouterConfig = toml::from_str(
            r#"
            mode = "abstract-log"

            [[routes]]
            path = "/user/:id"
            name = "user"
            app = "profile"
            meta = { title = "User" }

            [[routes.children]]
            path = "posts"
            payload = { kind = "list" }
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, ModeKind::AbstractLog);
        let route = RouteConfig::from(&config.routes[0]);
        assert_eq!(route.name.as_deref(), Some("user"));
        assert_eq!(route.meta, json!({ "title": "User" }));
        assert!(matches!(route.app, AppSelector::Named(ref a) if a == "profile"));
        assert!(matches!(
            route.children[0].payload,
            RoutePayload::Static(ref v) if *v == json!({ "kind": "list" })
        ));
    }
}

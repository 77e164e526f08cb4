//! Authored route definitions.
//!
//! A [`RouteConfig`] tree is owned by the application and never mutated once
//! handed to the router. Fields that may be "a value, a function or nothing"
//! are closed enums: [`RoutePayload`] and [`AppSelector`].

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::error::BoxError;
use crate::guards::Guard;
use crate::route::Route;

/// Deferred payload supplier.
pub type PayloadLoader = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Content attached to a route node.
#[derive(Clone, Default)]
pub enum RoutePayload {
    /// Nothing to load.
    #[default]
    None,
    /// Available immediately.
    Static(Value),
    /// Loaded during the payload stage of the first transition that needs it.
    Deferred(PayloadLoader),
}

impl RoutePayload {
    /// Wrap an async loader.
    pub fn deferred<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
    {
        RoutePayload::Deferred(Arc::new(move || loader().boxed()))
    }
}

impl std::fmt::Debug for RoutePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutePayload::None => write!(f, "None"),
            RoutePayload::Static(value) => f.debug_tuple("Static").field(value).finish(),
            RoutePayload::Deferred(_) => write!(f, "Deferred(..)"),
        }
    }
}

/// Picks which app the render layer mounts for a route.
#[derive(Clone, Default)]
pub enum AppSelector {
    /// Defer to the nearest ancestor that selects one.
    #[default]
    Inherit,
    /// A fixed app key.
    Named(String),
    /// Computed from the resolved route.
    Dynamic(Arc<dyn Fn(&Route) -> Option<String> + Send + Sync>),
}

impl AppSelector {
    /// Evaluate against a route. `Inherit` selects nothing.
    pub fn select(&self, route: &Route) -> Option<String> {
        match self {
            AppSelector::Inherit => None,
            AppSelector::Named(name) => Some(name.clone()),
            AppSelector::Dynamic(f) => f(route),
        }
    }
}

impl From<&str> for AppSelector {
    fn from(name: &str) -> Self {
        AppSelector::Named(name.to_string())
    }
}

impl std::fmt::Debug for AppSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppSelector::Inherit => write!(f, "Inherit"),
            AppSelector::Named(name) => f.debug_tuple("Named").field(name).finish(),
            AppSelector::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

/// A node of the route tree.
#[derive(Clone, Default)]
pub struct RouteConfig {
    /// Path template, relative to the parent.
    pub path: String,
    /// Optional unique name.
    pub name: Option<String>,
    /// Nested routes.
    pub children: Vec<RouteConfig>,
    pub before_enter: Option<Guard>,
    pub before_update: Option<Guard>,
    pub before_leave: Option<Guard>,
    /// Opaque user data.
    pub meta: Value,
    pub payload: RoutePayload,
    pub app: AppSelector,
    /// Static redirect target followed when this node is the matched leaf.
    pub redirect: Option<String>,
}

impl RouteConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn children(mut self, children: Vec<RouteConfig>) -> Self {
        self.children = children;
        self
    }

    pub fn child(mut self, child: RouteConfig) -> Self {
        self.children.push(child);
        self
    }

    pub fn before_enter(mut self, guard: Guard) -> Self {
        self.before_enter = Some(guard);
        self
    }

    pub fn before_update(mut self, guard: Guard) -> Self {
        self.before_update = Some(guard);
        self
    }

    pub fn before_leave(mut self, guard: Guard) -> Self {
        self.before_leave = Some(guard);
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn payload(mut self, payload: RoutePayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn app(mut self, app: impl Into<AppSelector>) -> Self {
        self.app = app.into();
        self
    }

    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }
}

impl std::fmt::Debug for RouteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteConfig")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("children", &self.children)
            .field("has_before_enter", &self.before_enter.is_some())
            .field("has_before_update", &self.before_update.is_some())
            .field("has_before_leave", &self.before_leave.is_some())
            .field("meta", &self.meta)
            .field("payload", &self.payload)
            .field("app", &self.app)
            .field("redirect", &self.redirect)
            .finish()
    }
}

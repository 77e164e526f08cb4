//! Router construction options and boundary collaborators.

use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::config::schema::{ModeKind, RouterConfig};
use crate::config::{ConfigError, ValidationError};
use crate::history::{AbstractLogHistory, BrowserHistory, History, HistorySubstrate, MemoryHistory};
use crate::route::Route;
use crate::router::Router;
use crate::routing::RouteConfig;

/// Default redirect chain limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Invoked when nothing matches, and for window-opening navigations.
/// The returned value becomes the route's `handle`.
pub trait NavigationFallback: Send + Sync {
    fn fallback(&self, to: &Route, from: Option<&Route>) -> Option<Value>;
}

impl<F> NavigationFallback for F
where
    F: Fn(&Route, Option<&Route>) -> Option<Value> + Send + Sync,
{
    fn fallback(&self, to: &Route, from: Option<&Route>) -> Option<Value> {
        self(to, from)
    }
}

/// Mounts whatever a committed route needs. Called once per commit.
pub trait RenderAdapter: Send + Sync {
    fn update(&self, router: &Router);

    fn destroy(&self) {}
}

/// Called when `back()` runs past the oldest entry.
pub type BackBoundaryHandler = Arc<dyn Fn() + Send + Sync>;

/// History adapter selection.
#[derive(Clone, Default)]
pub enum RouterMode {
    #[default]
    Memory,
    AbstractLog,
    Browser(Arc<dyn HistorySubstrate>),
}

impl RouterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterMode::Memory => "memory",
            RouterMode::AbstractLog => "abstract-log",
            RouterMode::Browser(_) => "history",
        }
    }

    pub(crate) fn build_history(&self) -> Box<dyn History> {
        match self {
            RouterMode::Memory => Box::new(MemoryHistory::new()),
            RouterMode::AbstractLog => Box::new(AbstractLogHistory::new()),
            RouterMode::Browser(substrate) => Box::new(BrowserHistory::new(substrate.clone())),
        }
    }
}

impl std::fmt::Debug for RouterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a [`Router`] is built from.
#[derive(Clone)]
pub struct RouterOptions {
    pub routes: Vec<RouteConfig>,
    /// Absolute, always ends with `/`.
    pub base: Url,
    pub mode: RouterMode,
    pub max_redirects: usize,
    pub fallback: Option<Arc<dyn NavigationFallback>>,
    pub handle_back_boundary: Option<BackBoundaryHandler>,
    pub render: Option<Arc<dyn RenderAdapter>>,
    /// Passed through to the render collaborator.
    pub root: Option<String>,
    pub root_style: Option<Value>,
    pub apps: Option<Value>,
    pub record_metrics: bool,
}

impl RouterOptions {
    pub fn new(base: &str, routes: Vec<RouteConfig>) -> Result<Self, ConfigError> {
        Ok(Self {
            routes,
            base: parse_base(base)?,
            mode: RouterMode::Memory,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            fallback: None,
            handle_back_boundary: None,
            render: None,
            root: None,
            root_style: None,
            apps: None,
            record_metrics: true,
        })
    }

    /// Build options from a validated config file.
    ///
    /// `substrate` is required when the file selects the `history` mode and
    /// ignored otherwise.
    pub fn from_config(
        config: &RouterConfig,
        substrate: Option<Arc<dyn HistorySubstrate>>,
    ) -> Result<Self, ConfigError> {
        let mode = match (config.mode, substrate) {
            (ModeKind::Memory, _) => RouterMode::Memory,
            (ModeKind::AbstractLog, _) => RouterMode::AbstractLog,
            (ModeKind::History, Some(substrate)) => RouterMode::Browser(substrate),
            (ModeKind::History, None) => return Err(ConfigError::MissingSubstrate),
        };

        let routes = config.routes.iter().map(RouteConfig::from).collect();
        let mut options = Self::new(&config.base, routes)?
            .with_mode(mode)
            .with_max_redirects(config.max_redirects);
        options.root = config.render.root.clone();
        options.root_style = config.render.root_style.clone();
        options.apps = config.render.apps.clone();
        options.record_metrics = config.observability.metrics_enabled;
        Ok(options)
    }

    pub fn with_mode(mut self, mode: RouterMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_redirects(mut self, limit: usize) -> Self {
        self.max_redirects = limit;
        self
    }

    pub fn with_fallback(mut self, fallback: impl NavigationFallback + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub fn with_back_boundary(mut self, handler: impl Fn() + Send + Sync + 'static) -> Self {
        self.handle_back_boundary = Some(Arc::new(handler));
        self
    }

    pub fn with_render(mut self, render: Arc<dyn RenderAdapter>) -> Self {
        self.render = Some(render);
        self
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_apps(mut self, apps: Value) -> Self {
        self.apps = Some(apps);
        self
    }
}

impl std::fmt::Debug for RouterOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterOptions")
            .field("routes", &self.routes.len())
            .field("base", &self.base.as_str())
            .field("mode", &self.mode)
            .field("max_redirects", &self.max_redirects)
            .field("has_fallback", &self.fallback.is_some())
            .field("has_back_boundary", &self.handle_back_boundary.is_some())
            .field("has_render", &self.render.is_some())
            .field("root", &self.root)
            .finish()
    }
}

fn parse_base(base: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::Validation(vec![ValidationError::InvalidBase {
            base: base.to_string(),
            reason,
        }])
    };

    let mut url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".to_string()));
    }
    url.set_query(None);
    url.set_fragment(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteTable;

    #[test]
    fn test_base_gets_trailing_slash() {
        let options = RouterOptions::new("http://localhost/app?x=1", Vec::new()).unwrap();
        assert_eq!(options.base.as_str(), "http://localhost/app/");
    }

    #[test]
    fn test_bad_base_is_a_validation_error() {
        let err = RouterOptions::new("::", Vec::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_from_config() {
        let config = RouterConfig {
            base: "https://example.com/shop".into(),
            mode: ModeKind::AbstractLog,
            max_redirects: 3,
            routes: vec![RouteTable {
                path: "/".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        let options = RouterOptions::from_config(&config, None).unwrap();
        assert_eq!(options.base.as_str(), "https://example.com/shop/");
        assert_eq!(options.mode.as_str(), "abstract-log");
        assert_eq!(options.max_redirects, 3);
        assert_eq!(options.routes.len(), 1);
    }

    #[test]
    fn test_history_mode_needs_substrate() {
        let config = RouterConfig {
            mode: ModeKind::History,
            ..Default::default()
        };
        let err = RouterOptions::from_config(&config, None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSubstrate));
    }
}

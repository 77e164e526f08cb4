//! The resolved [`Route`] value and the pure resolver that builds it.
//!
//! # Responsibilities
//! - Normalise a [`RouteLocation`] against the router base and the current URL
//! - Strip the base to obtain the route path, then run the matcher
//! - Produce a pending `Route` without touching router state
//!
//! # Design Decisions
//! - A URL outside the base (other origin, other path) matches nothing and
//!   is left to the fallback collaborator
//! - `full_path` keeps the raw (encoded) query and hash so a hash-only
//!   change is a different full path

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::Value;
use url::Url;

use crate::error::RouterError;
use crate::route::RouteLocation;
use crate::routing::matcher::{same_chain, CompiledRoute, MatchedChain, RouteMatcher};

/// How a navigation was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteType {
    Push,
    Replace,
    Back,
    Forward,
    Go,
    Reload,
    Popstate,
    PushWindow,
    ReplaceWindow,
    Resolve,
}

impl RouteType {
    pub const ALL: [RouteType; 10] = [
        RouteType::Push,
        RouteType::Replace,
        RouteType::Back,
        RouteType::Forward,
        RouteType::Go,
        RouteType::Reload,
        RouteType::Popstate,
        RouteType::PushWindow,
        RouteType::ReplaceWindow,
        RouteType::Resolve,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteType::Push => "push",
            RouteType::Replace => "replace",
            RouteType::Back => "back",
            RouteType::Forward => "forward",
            RouteType::Go => "go",
            RouteType::Reload => "reload",
            RouteType::Popstate => "popstate",
            RouteType::PushWindow => "pushWindow",
            RouteType::ReplaceWindow => "replaceWindow",
            RouteType::Resolve => "resolve",
        }
    }

    /// Whether a committed navigation of this type adds a history entry.
    pub fn is_push(self) -> bool {
        matches!(self, RouteType::Push | RouteType::PushWindow)
    }

    /// Navigations that replay an existing history entry.
    pub fn is_history_replay(self) -> bool {
        matches!(
            self,
            RouteType::Back | RouteType::Forward | RouteType::Go | RouteType::Popstate
        )
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single route.
///
/// ```text
/// Pending → Success
/// Pending → Aborted
/// Pending → Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    Pending,
    Success,
    Aborted,
    Error,
}

/// A resolved navigation target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(rename = "type")]
    pub route_type: RouteType,
    pub status: RouteStatus,
    /// Base-relative path, e.g. `/user/1`.
    pub path: String,
    /// Path plus query and hash.
    pub full_path: String,
    pub params: BTreeMap<String, String>,
    /// Last value wins for repeated keys.
    pub query: BTreeMap<String, String>,
    pub query_array: BTreeMap<String, Vec<String>>,
    /// Including the leading `#`, empty when absent.
    pub hash: String,
    pub state: Value,
    #[serde(serialize_with = "serialize_chain")]
    pub matched: MatchedChain,
    #[serde(serialize_with = "serialize_url")]
    pub url: Url,
    /// Result slot filled by the fallback collaborator.
    pub handle: Option<Value>,
    pub is_push: bool,
    /// Meta of the matched leaf.
    pub meta: Value,
}

impl Route {
    pub fn is_matched(&self) -> bool {
        !self.matched.is_empty()
    }

    pub fn leaf(&self) -> Option<&Arc<CompiledRoute>> {
        self.matched.last()
    }

    /// Same route definitions, regardless of params, query or hash.
    pub fn same_definition(&self, other: &Route) -> bool {
        same_chain(&self.matched, &other.matched)
    }

    /// The app selected for rendering, nearest to the leaf first.
    pub fn app(&self) -> Option<String> {
        self.matched
            .iter()
            .rev()
            .find_map(|node| node.app().select(self))
    }

    /// Payload of the node at `depth` of the matched chain.
    pub fn payload(&self, depth: usize) -> Option<Arc<Value>> {
        self.matched.get(depth).and_then(|node| node.payload())
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }
}

fn serialize_chain<S: Serializer>(chain: &MatchedChain, s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(chain.iter().map(|node| node.absolute_path()))
}

fn serialize_url<S: Serializer>(url: &Url, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(url.as_str())
}

/// Build a pending route. Never touches router state.
pub fn resolve(
    location: &RouteLocation,
    base: &Url,
    current: Option<&Url>,
    matcher: &RouteMatcher,
    route_type: RouteType,
) -> Result<Route, RouterError> {
    let mut url = normalize_url(&location.path, base, current).map_err(|source| {
        RouterError::InvalidLocation {
            location: location.to_string(),
            source,
        }
    })?;

    if !location.query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &location.query {
            pairs.append_pair(key, value);
        }
    }
    if let Some(hash) = &location.hash {
        let hash = hash.trim_start_matches('#');
        url.set_fragment(if hash.is_empty() { None } else { Some(hash) });
    }

    let relative = strip_base(&url, base);
    let path = relative.clone().unwrap_or_else(|| url.path().to_string());
    let matched = match &relative {
        Some(path) => matcher.match_path(path),
        None => Default::default(),
    };

    let mut query = BTreeMap::new();
    let mut query_array: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in url.query_pairs() {
        query.insert(key.to_string(), value.to_string());
        query_array.entry(key.into_owned()).or_default().push(value.into_owned());
    }

    let hash = url.fragment().map(|f| format!("#{}", f)).unwrap_or_default();
    let mut full_path = path.clone();
    if let Some(q) = url.query() {
        full_path.push('?');
        full_path.push_str(q);
    }
    full_path.push_str(&hash);

    let meta = matched
        .matched
        .last()
        .map(|leaf| leaf.meta().clone())
        .unwrap_or(Value::Null);

    Ok(Route {
        route_type,
        status: RouteStatus::Pending,
        path,
        full_path,
        params: matched.params,
        query,
        query_array,
        hash,
        state: location.state.clone().unwrap_or(Value::Null),
        matched: matched.matched,
        url,
        handle: None,
        is_push: route_type.is_push(),
        meta,
    })
}

fn normalize_url(raw: &str, base: &Url, current: Option<&Url>) -> Result<Url, url::ParseError> {
    if raw.starts_with("//") {
        return Url::parse(&format!("{}:{}", base.scheme(), raw));
    }
    if raw.starts_with('/') {
        return base.join(raw.trim_start_matches('/'));
    }
    match Url::parse(raw) {
        Ok(absolute) => Ok(absolute),
        Err(url::ParseError::RelativeUrlWithoutBase) => current.unwrap_or(base).join(raw),
        Err(e) => Err(e),
    }
}

/// Base-relative path, or `None` when the URL lives outside the base.
fn strip_base(url: &Url, base: &Url) -> Option<String> {
    if url.scheme() != base.scheme()
        || url.host_str() != base.host_str()
        || url.port_or_known_default() != base.port_or_known_default()
    {
        return None;
    }

    let base_path = base.path();
    let path = url.path();
    if let Some(rest) = path.strip_prefix(base_path) {
        return Some(format!("/{}", rest));
    }
    // `/app` under base `/app/`
    if path == base_path.trim_end_matches('/') {
        return Some("/".to_string());
    }
    None
}

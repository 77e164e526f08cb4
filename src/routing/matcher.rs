//! Route matching logic.
//!
//! # Responsibilities
//! - Compile the authored tree into [`CompiledRoute`] nodes, once per router
//! - Match a base-relative path to a root→leaf [`MatchedChain`]
//! - Merge params down the chain without letting children shadow ancestors
//!
//! # Design Decisions
//! - Node identity is `Arc` pointer identity; the guard scheduler relies on it
//! - First match wins, in declaration order, with backtracking when a
//!   parent matches but none of its children can consume the remainder
//! - No match is an empty chain, not an error

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use serde_json::Value;

use crate::error::RouterError;
use crate::guards::Guard;
use crate::routing::config::{AppSelector, RouteConfig, RoutePayload};
use crate::routing::pattern::PathPattern;

/// Ordered root→leaf list of nodes satisfying a path.
pub type MatchedChain = Vec<Arc<CompiledRoute>>;

/// True when both chains hold the very same nodes in the same order.
pub fn same_chain(a: &[Arc<CompiledRoute>], b: &[Arc<CompiledRoute>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

/// A route node ready for matching.
pub struct CompiledRoute {
    index: usize,
    depth: usize,
    absolute_path: String,
    pattern: PathPattern,
    param_names: Vec<String>,
    config: RouteConfig,
    children: Vec<Arc<CompiledRoute>>,
    resolved_payload: ArcSwapOption<Value>,
}

impl CompiledRoute {
    /// Position in depth-first declaration order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nesting depth, 0 for top-level routes.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Template joined with every ancestor's template.
    pub fn absolute_path(&self) -> &str {
        &self.absolute_path
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Params of this node and its ancestors, outermost first.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    pub fn meta(&self) -> &Value {
        &self.config.meta
    }

    pub fn redirect(&self) -> Option<&str> {
        self.config.redirect.as_deref()
    }

    pub fn app(&self) -> &AppSelector {
        &self.config.app
    }

    pub fn before_enter(&self) -> Option<&Guard> {
        self.config.before_enter.as_ref()
    }

    pub fn before_update(&self) -> Option<&Guard> {
        self.config.before_update.as_ref()
    }

    pub fn before_leave(&self) -> Option<&Guard> {
        self.config.before_leave.as_ref()
    }

    pub fn children(&self) -> &[Arc<CompiledRoute>] {
        &self.children
    }

    pub fn payload_source(&self) -> &RoutePayload {
        &self.config.payload
    }

    /// The payload, if static or already loaded.
    pub fn payload(&self) -> Option<Arc<Value>> {
        match &self.config.payload {
            RoutePayload::None => None,
            RoutePayload::Static(value) => Some(Arc::new(value.clone())),
            RoutePayload::Deferred(_) => self.resolved_payload.load_full(),
        }
    }

    /// True when a deferred loader still has to run.
    pub fn needs_payload(&self) -> bool {
        matches!(self.config.payload, RoutePayload::Deferred(_))
            && self.resolved_payload.load().is_none()
    }

    pub(crate) fn store_payload(&self, value: Value) {
        self.resolved_payload.store(Some(Arc::new(value)));
    }
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("index", &self.index)
            .field("absolute_path", &self.absolute_path)
            .field("name", &self.config.name)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Result of matching a path.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub matched: MatchedChain,
    pub params: BTreeMap<String, String>,
}

/// Compiled route tree.
#[derive(Debug)]
pub struct RouteMatcher {
    roots: Vec<Arc<CompiledRoute>>,
    /// Every node, depth-first in declaration order.
    nodes: Vec<Arc<CompiledRoute>>,
}

impl RouteMatcher {
    /// Compile a route tree. Fails on the first invalid template.
    pub fn compile(routes: &[RouteConfig]) -> Result<Self, RouterError> {
        let mut nodes = Vec::new();
        let mut counter = 0;
        let roots = routes
            .iter()
            .map(|config| compile_node(config, "", &[], 0, &mut counter, &mut nodes))
            .collect::<Result<Vec<_>, _>>()?;

        nodes.sort_by_key(|node: &Arc<CompiledRoute>| node.index);

        tracing::debug!(routes = nodes.len(), "Route tree compiled");
        Ok(Self { roots, nodes })
    }

    /// Every compiled node, depth-first.
    pub fn nodes(&self) -> &[Arc<CompiledRoute>] {
        &self.nodes
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Arc<CompiledRoute>> {
        self.nodes.iter().find(|node| node.name() == Some(name))
    }

    /// Match a base-relative path such as `/user/1`.
    pub fn match_path(&self, path: &str) -> MatchResult {
        let mut result = MatchResult::default();
        let path = normalize(path);
        if !match_level(&self.roots, path, &mut result) {
            result = MatchResult::default();
        }
        result
    }
}

fn normalize(path: &str) -> &str {
    if path == "/" {
        ""
    } else {
        path
    }
}

fn compile_node(
    config: &RouteConfig,
    parent_path: &str,
    parent_params: &[String],
    depth: usize,
    counter: &mut usize,
    nodes: &mut Vec<Arc<CompiledRoute>>,
) -> Result<Arc<CompiledRoute>, RouterError> {
    let index = *counter;
    *counter += 1;

    let pattern = PathPattern::new(&config.path)?;
    let absolute_path = join_paths(parent_path, &config.path);

    let mut param_names = parent_params.to_vec();
    for name in pattern.param_names() {
        if !param_names.contains(name) {
            param_names.push(name.clone());
        }
    }

    let children = config
        .children
        .iter()
        .map(|child| compile_node(child, &absolute_path, &param_names, depth + 1, counter, nodes))
        .collect::<Result<Vec<_>, _>>()?;

    let mut own = config.clone();
    own.children = Vec::new();

    let node = Arc::new(CompiledRoute {
        index,
        depth,
        absolute_path,
        pattern,
        param_names,
        config: own,
        children,
        resolved_payload: ArcSwapOption::empty(),
    });
    nodes.push(node.clone());
    Ok(node)
}

fn join_paths(parent: &str, child: &str) -> String {
    let parent = parent.trim_end_matches('/');
    let child = child.trim_matches('/');
    match (parent.is_empty(), child.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => parent.to_string(),
        _ => format!("{}/{}", parent, child),
    }
}

fn match_level(candidates: &[Arc<CompiledRoute>], path: &str, result: &mut MatchResult) -> bool {
    for node in candidates {
        let Some(head) = node.pattern.match_prefix(path) else {
            continue;
        };

        if head.is_complete() {
            push_node(result, node, head.params);
            push_index_children(result, node);
            return true;
        }

        if node.children.is_empty() {
            continue;
        }

        let saved = result.clone();
        push_node(result, node, head.params);
        if match_level(&node.children, &head.remainder, result) {
            return true;
        }
        *result = saved;
    }
    false
}

/// An empty-path child under a fully consumed parent is its index route.
fn push_index_children(result: &mut MatchResult, node: &Arc<CompiledRoute>) {
    let mut current = node.clone();
    while let Some(child) = current.children.iter().find(|c| c.pattern.is_empty()).cloned() {
        result.matched.push(child.clone());
        current = child;
    }
}

fn push_node(result: &mut MatchResult, node: &Arc<CompiledRoute>, params: BTreeMap<String, String>) {
    result.matched.push(node.clone());
    for (name, value) in params {
        result.params.entry(name).or_insert(value);
    }
}

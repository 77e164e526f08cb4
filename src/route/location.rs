//! Raw navigation input.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where to navigate: a bare string or a structured location.
///
/// `path` may itself carry a query string and a hash; `query` pairs are
/// appended to it and `hash` replaces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteLocation {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub hash: Option<String>,
    pub state: Option<Value>,
}

impl RouteLocation {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = Some(state);
        self
    }
}

impl From<&str> for RouteLocation {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for RouteLocation {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&String> for RouteLocation {
    fn from(path: &String) -> Self {
        Self::new(path.as_str())
    }
}

impl std::fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 && !self.path.contains('?') { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        if let Some(hash) = &self.hash {
            write!(f, "#{}", hash.trim_start_matches('#'))?;
        }
        Ok(())
    }
}

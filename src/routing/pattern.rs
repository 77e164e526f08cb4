//! Path template compilation.
//!
//! # Syntax
//! - `user` - literal segment
//! - `:id` - one segment, captured as `id`
//! - `:id?` - optional segment
//! - `:rest*` - rest of the path (may be empty), captured as `rest`
//! - `*` - anonymous rest, captured as `pathMatch`
//!
//! # Design Decisions
//! - Patterns match a *prefix* at a segment boundary; the remainder is
//!   handed to child routes
//! - Compiled once per router, bounded in size to keep the regex small
//! - Case-sensitive, captures are percent-decoded

use std::collections::BTreeMap;

use crate::error::RouterError;

/// Maximum allowed length of a path template in bytes.
const MAX_PATTERN_LENGTH: usize = 1024;

/// Maximum allowed number of segments in a path template.
const MAX_PATTERN_SEGMENTS: usize = 32;

/// Maximum size of a compiled pattern regex.
const MAX_REGEX_SIZE: usize = 1 << 20;

/// Capture name used for the unmatched tail of the path.
const REST_GROUP: &str = "__rest";

/// Parameter name given to a bare `*` segment.
pub const WILDCARD_PARAM: &str = "pathMatch";

/// Result of matching a pattern against the head of a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Captured parameters.
    pub params: BTreeMap<String, String>,
    /// The unconsumed remainder, `""` when the path was fully consumed.
    pub remainder: String,
}

impl PrefixMatch {
    /// True when nothing meaningful is left for child routes.
    pub fn is_complete(&self) -> bool {
        self.remainder.is_empty() || self.remainder == "/"
    }
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: regex::Regex,
    param_names: Vec<String>,
    /// Groups in the regex, in param order.
    groups: Vec<String>,
}

impl PathPattern {
    /// Compile a template. Leading and trailing slashes are not significant.
    pub fn new(template: &str) -> Result<Self, RouterError> {
        if template.len() > MAX_PATTERN_LENGTH {
            return Err(invalid(
                template,
                format!(
                    "length {} exceeds maximum of {} bytes",
                    template.len(),
                    MAX_PATTERN_LENGTH
                ),
            ));
        }

        let segments: Vec<&str> = template.split('/').filter(|s| !s.is_empty()).collect();
        if segments.len() > MAX_PATTERN_SEGMENTS {
            return Err(invalid(
                template,
                format!(
                    "{} segments exceed maximum of {}",
                    segments.len(),
                    MAX_PATTERN_SEGMENTS
                ),
            ));
        }

        let mut source = String::from("^");
        let mut param_names = Vec::new();
        let mut groups = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();

            if *segment == "*" {
                if !is_last {
                    return Err(invalid(template, "`*` must be the last segment".into()));
                }
                let group = format!("p{}", groups.len());
                source.push_str(&format!("(?:/(?P<{}>.*))?", group));
                param_names.push(WILDCARD_PARAM.to_string());
                groups.push(group);
                continue;
            }

            let Some(param) = segment.strip_prefix(':') else {
                source.push('/');
                source.push_str(&regex::escape(segment));
                continue;
            };

            let (name, modifier) = match param.chars().last() {
                Some(m @ ('?' | '*')) => (&param[..param.len() - 1], Some(m)),
                _ => (param, None),
            };
            if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(invalid(template, format!("bad parameter name {:?}", name)));
            }
            if param_names.iter().any(|n| n == name) {
                return Err(invalid(template, format!("duplicate parameter {:?}", name)));
            }

            let group = format!("p{}", groups.len());
            match modifier {
                Some('?') => source.push_str(&format!("(?:/(?P<{}>[^/]+))?", group)),
                Some(_) => {
                    if !is_last {
                        return Err(invalid(
                            template,
                            format!("rest parameter {:?} must be the last segment", name),
                        ));
                    }
                    source.push_str(&format!("(?:/(?P<{}>.*))?", group));
                }
                None => source.push_str(&format!("/(?P<{}>[^/]+)", group)),
            }
            param_names.push(name.to_string());
            groups.push(group);
        }

        source.push_str(&format!("(?P<{}>/.*)?$", REST_GROUP));

        let regex = regex::RegexBuilder::new(&source)
            .size_limit(MAX_REGEX_SIZE)
            .build()
            .map_err(|e| invalid(template, e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
            groups,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// True when the template consumes nothing (index routes, layout roots).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.template.split('/').all(str::is_empty)
    }

    /// Match the head of `path`. `path` must be empty or start with `/`.
    pub fn match_prefix(&self, path: &str) -> Option<PrefixMatch> {
        let caps = self.regex.captures(path)?;

        let mut params = BTreeMap::new();
        for (name, group) in self.param_names.iter().zip(&self.groups) {
            if let Some(m) = caps.name(group) {
                let value = urlencoding::decode(m.as_str())
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| m.as_str().to_string());
                params.insert(name.clone(), value);
            }
        }

        let remainder = caps
            .name(REST_GROUP)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        Some(PrefixMatch { params, remainder })
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.template)
    }
}

fn invalid(template: &str, reason: String) -> RouterError {
    RouterError::InvalidPattern {
        pattern: template.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_prefix() {
        let pattern = PathPattern::new("/user").unwrap();

        let m = pattern.match_prefix("/user").unwrap();
        assert!(m.is_complete());

        let m = pattern.match_prefix("/user/profile").unwrap();
        assert_eq!(m.remainder, "/profile");

        // Segment boundary: "/users" is not "/user" + "s"
        assert!(pattern.match_prefix("/users").is_none());
    }

    #[test]
    fn test_single_param() {
        let pattern = PathPattern::new("/user/:id").unwrap();
        assert_eq!(pattern.param_names(), &["id"]);

        let m = pattern.match_prefix("/user/42").unwrap();
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
        assert!(m.is_complete());

        assert!(pattern.match_prefix("/user").is_none());
    }

    #[test]
    fn test_optional_param() {
        let pattern = PathPattern::new("/docs/:lang?").unwrap();

        let m = pattern.match_prefix("/docs").unwrap();
        assert!(m.params.is_empty());

        let m = pattern.match_prefix("/docs/en").unwrap();
        assert_eq!(m.params.get("lang").map(String::as_str), Some("en"));
    }

    #[test]
    fn test_rest_param_and_wildcard() {
        let pattern = PathPattern::new("/files/:path*").unwrap();
        let m = pattern.match_prefix("/files/a/b/c.txt").unwrap();
        assert_eq!(m.params.get("path").map(String::as_str), Some("a/b/c.txt"));
        assert!(m.is_complete());

        let pattern = PathPattern::new("*").unwrap();
        let m = pattern.match_prefix("/anything/at/all").unwrap();
        assert_eq!(
            m.params.get(WILDCARD_PARAM).map(String::as_str),
            Some("anything/at/all")
        );
    }

    #[test]
    fn test_empty_pattern_matches_everything_as_remainder() {
        let pattern = PathPattern::new("/").unwrap();
        assert!(pattern.is_empty());

        let m = pattern.match_prefix("/user/1").unwrap();
        assert_eq!(m.remainder, "/user/1");
        assert!(pattern.match_prefix("").unwrap().is_complete());
    }

    #[test]
    fn test_percent_decoding() {
        let pattern = PathPattern::new("/tag/:name").unwrap();
        let m = pattern.match_prefix("/tag/hello%20world").unwrap();
        assert_eq!(m.params.get("name").map(String::as_str), Some("hello world"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let pattern = PathPattern::new("/api/v1.0").unwrap();
        assert!(pattern.match_prefix("/api/v1.0").is_some());
        assert!(pattern.match_prefix("/api/v1X0").is_none());
    }

    #[test]
    fn test_rejects_bad_templates() {
        assert!(PathPattern::new("/a/:").is_err());
        assert!(PathPattern::new("/a/:id/:id").is_err());
        assert!(PathPattern::new("/a/:rest*/b").is_err());
        assert!(PathPattern::new("/a/*/b").is_err());

        let long = "/".to_string() + &"a".repeat(MAX_PATTERN_LENGTH + 1);
        let err = PathPattern::new(&long).unwrap_err();
        assert!(err.to_string().contains("exceeds maximum"));

        let deep = "/seg".repeat(MAX_PATTERN_SEGMENTS + 1);
        assert!(PathPattern::new(&deep).is_err());
    }
}

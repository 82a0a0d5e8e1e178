//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Parse a pattern such as `/users/:id` into typed segments
//! - Match a path segment-by-segment against a compiled pattern
//! - Capture and percent-decode parameter values
//!
//! # Design Decisions
//! - Literal segments are case-sensitive
//! - A parameter matches exactly one non-empty segment
//! - A trailing `*` matches everything that remains, including nothing
//! - No regex to guarantee O(segments) matching

use std::borrow::Cow;
use std::fmt;
use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::routing::params::RouteParams;

/// Errors raised while compiling a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route pattern is empty")]
    Empty,

    #[error("route pattern '{0}' must start with '/'")]
    NotAbsolute(String),

    #[error("route pattern '{0}' has a parameter without a name")]
    UnnamedParam(String),

    #[error("route pattern '{pattern}' declares parameter '{name}' twice")]
    DuplicateParam { pattern: String, name: String },

    #[error("route pattern '{0}' has a wildcard that is not the last segment")]
    WildcardNotLast(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
}

/// A compiled route pattern. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

impl RoutePattern {
    /// Compile a pattern string.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        if raw.is_empty() {
            return Err(RouteError::Empty);
        }
        if raw != "*" && !raw.starts_with('/') {
            return Err(RouteError::NotAbsolute(raw.to_string()));
        }

        let parts: Vec<&str> = raw.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        let mut param_names: Vec<String> = Vec::new();

        for (i, part) in parts.iter().enumerate() {
            if *part == "*" {
                if i != last {
                    return Err(RouteError::WildcardNotLast(raw.to_string()));
                }
                segments.push(Segment::Wildcard);
            } else if let Some(name) = part.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouteError::UnnamedParam(raw.to_string()));
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(RouteError::DuplicateParam {
                        pattern: raw.to_string(),
                        name: name.to_string(),
                    });
                }
                param_names.push(name.to_string());
                segments.push(Segment::Param(name.to_string()));
            } else {
                segments.push(Segment::Literal(part.to_string()));
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            param_names,
        })
    }

    /// The pattern as registered.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in positional order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard))
    }

    /// Match a path, returning captured parameters on success.
    ///
    /// Any `?query` or `#fragment` suffix is ignored.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        let path = strip_suffix(path);
        let parts: Vec<&str> = path.split('/').collect();

        let fixed = if self.is_wildcard() {
            self.segments.len() - 1
        } else {
            self.segments.len()
        };

        if self.is_wildcard() {
            if parts.len() < fixed {
                return None;
            }
        } else if parts.len() != fixed {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, part) in self.segments[..fixed].iter().zip(&parts) {
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), decode(part));
                }
                Segment::Wildcard => unreachable!("wildcard is always the last segment"),
            }
        }

        Some(params)
    }
}

impl fmt::Debug for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RoutePattern").field(&self.raw).finish()
    }
}

fn strip_suffix(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

fn decode(segment: &str) -> String {
    match percent_decode_str(segment).decode_utf8() {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => segment.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_capture() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        let params = pattern.matches("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(pattern.param_names(), ["id".to_string()]);
    }

    #[test]
    fn test_segment_count_must_match() {
        let pattern = RoutePattern::parse("/users/:id").unwrap();
        assert!(pattern.matches("/users").is_none());
        assert!(pattern.matches("/users/42/posts").is_none());
        // Trailing slash yields an empty segment, which a parameter rejects.
        assert!(pattern.matches("/users/").is_none());
    }

    #[test]
    fn test_literals_are_case_sensitive() {
        let pattern = RoutePattern::parse("/About").unwrap();
        assert!(pattern.matches("/About").is_some());
        assert!(pattern.matches("/about").is_none());
    }

    #[test]
    fn test_params_are_percent_decoded() {
        let pattern = RoutePattern::parse("/tags/:tag/:slug").unwrap();
        let params = pattern.matches("/tags/rust%20lang/caf%C3%A9").unwrap();
        assert_eq!(params.get("tag"), Some("rust lang"));
        assert_eq!(params.get("slug"), Some("café"));
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_raw() {
        let pattern = RoutePattern::parse("/raw/:v").unwrap();
        let params = pattern.matches("/raw/%FF").unwrap();
        assert_eq!(params.get("v"), Some("%FF"));
    }

    #[test]
    fn test_query_and_fragment_ignored() {
        let pattern = RoutePattern::parse("/search/:q").unwrap();
        let params = pattern.matches("/search/books?page=2#top").unwrap();
        assert_eq!(params.get("q"), Some("books"));
    }

    #[test]
    fn test_root_pattern() {
        let pattern = RoutePattern::parse("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("/x").is_none());
    }

    #[test]
    fn test_wildcard_matches_everything_remaining() {
        let all = RoutePattern::parse("/*").unwrap();
        assert!(all.is_wildcard());
        assert!(all.matches("/").is_some());
        assert!(all.matches("/unknown").is_some());
        assert!(all.matches("/a/b/c").is_some());

        let bare = RoutePattern::parse("*").unwrap();
        assert!(bare.matches("/anything/at/all").is_some());

        let docs = RoutePattern::parse("/docs/*").unwrap();
        assert!(docs.matches("/docs/intro").is_some());
        assert!(docs.matches("/blog/intro").is_none());
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(RoutePattern::parse(""), Err(RouteError::Empty));
        assert!(matches!(RoutePattern::parse("users"), Err(RouteError::NotAbsolute(_))));
        assert!(matches!(RoutePattern::parse("/users/:"), Err(RouteError::UnnamedParam(_))));
        assert!(matches!(
            RoutePattern::parse("/a/:id/b/:id"),
            Err(RouteError::DuplicateParam { .. })
        ));
        assert!(matches!(RoutePattern::parse("/*/tail"), Err(RouteError::WildcardNotLast(_))));
    }
}

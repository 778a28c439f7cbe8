//! Path patterns used by route and tab declarations
//!
//! A pattern is a `/`-separated list of segments. A segment prefixed with `:`
//! binds a named parameter, anything else must match literally. Patterns are
//! matched as a prefix of the unclaimed part of a location, so `users` matches
//! `users/42/edit` and leaves `42/edit` for nested routing.
//!
//! Specificity orders competing matches: every literal segment scores 2 and
//! every parameter scores 1.

use crate::error::{Result, RouterError};
use crate::params::RouteParams;
use std::collections::HashSet;
use std::fmt;

/// A single segment in a path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text that must match exactly
    Literal(String),
    /// `:name` binding that captures one path segment
    Param(String),
}

impl Segment {
    /// Parse a segment from string
    ///
    /// - `"users"` -> `Literal("users")`
    /// - `":id"` -> `Param("id")`
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Literal(s.to_string()),
        }
    }

    /// Points this segment contributes to specificity
    pub fn weight(&self) -> u32 {
        match self {
            Segment::Literal(_) => 2,
            Segment::Param(_) => 1,
        }
    }
}

/// A compiled path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern without validation
    ///
    /// Leading, trailing and repeated slashes are ignored.
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();

        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    /// Compile a pattern, rejecting malformed declarations
    pub fn try_parse(pattern: &str) -> Result<Self> {
        validate_route_path(pattern)?;
        Ok(Self::parse(pattern))
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled segments
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the root pattern (`""` or `"/"`)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of path segments this pattern claims
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Sum of segment weights
    pub fn specificity(&self) -> u32 {
        self.segments.iter().map(Segment::weight).sum()
    }

    /// Match the pattern against the start of `path`
    ///
    /// Returns the bound parameters on success. The empty pattern only matches
    /// an empty path.
    pub fn match_prefix<S: AsRef<str>>(&self, path: &[S]) -> Option<RouteParams> {
        if self.segments.is_empty() {
            return path.is_empty().then(RouteParams::new);
        }
        if path.len() < self.segments.len() {
            return None;
        }

        let mut params = RouteParams::new();
        for (segment, actual) in self.segments.iter().zip(path) {
            let actual = actual.as_ref();
            match segment {
                Segment::Literal(expected) => {
                    if expected != actual {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }

        Some(params)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for PathPattern {
    fn from(pattern: &str) -> Self {
        Self::parse(pattern)
    }
}

/// Validate a route path pattern
///
/// # Validation Rules
///
/// - Pattern can be empty (root routes)
/// - No consecutive slashes (`//`)
/// - No `.` or `..` segments (those are only meaningful to `link_to`)
/// - Parameter names must be non-empty identifiers (alphanumeric or `_`)
/// - No duplicate parameter names
pub fn validate_route_path(path: &str) -> Result<()> {
    let invalid = |reason: String| RouterError::InvalidPattern {
        pattern: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Ok(());
    }

    if path.contains("//") {
        return Err(invalid(
            "pattern cannot contain consecutive slashes".to_string(),
        ));
    }

    let mut param_names = HashSet::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." {
            return Err(invalid(format!(
                "relative segment '{}' is not allowed in a declaration",
                segment
            )));
        }

        if let Some(param) = segment.strip_prefix(':') {
            if param.is_empty() {
                return Err(invalid("parameter name cannot be empty".to_string()));
            }

            if !param.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return Err(invalid(format!(
                    "parameter '{}' must contain only alphanumeric characters and underscores",
                    param
                )));
            }

            if !param_names.insert(param) {
                return Err(invalid(format!("duplicate parameter '{}'", param)));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parsing() {
        assert_eq!(Segment::parse("users"), Segment::Literal("users".to_string()));
        assert_eq!(Segment::parse(":id"), Segment::Param("id".to_string()));
    }

    #[test]
    fn test_specificity() {
        assert_eq!(PathPattern::parse("").specificity(), 0);
        assert_eq!(PathPattern::parse("users").specificity(), 2);
        assert_eq!(PathPattern::parse(":id").specificity(), 1);
        assert_eq!(PathPattern::parse("users/:id").specificity(), 3);
        assert_eq!(PathPattern::parse("users/active").specificity(), 4);
    }

    #[test]
    fn test_slashes_are_ignored() {
        assert_eq!(
            PathPattern::parse("/users/:id/").segments(),
            PathPattern::parse("users/:id").segments()
        );
        assert!(PathPattern::parse("/").is_empty());
    }

    #[test]
    fn test_prefix_match_binds_params() {
        let pattern = PathPattern::parse("users/:id");
        let params = pattern.match_prefix(&["users", "42", "edit"]).unwrap();
        assert_eq!(params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn test_prefix_match_failures() {
        let pattern = PathPattern::parse("users/:id");
        assert!(pattern.match_prefix(&["users"]).is_none());
        assert!(pattern.match_prefix(&["posts", "1"]).is_none());
    }

    #[test]
    fn test_empty_pattern_only_matches_empty_path() {
        let pattern = PathPattern::parse("");
        assert!(pattern.match_prefix::<&str>(&[]).is_some());
        assert!(pattern.match_prefix(&["anything"]).is_none());
    }

    #[test]
    fn test_validate_route_path() {
        assert!(validate_route_path("").is_ok());
        assert!(validate_route_path("users/:id").is_ok());
        assert!(validate_route_path("/users/:user_id/posts/:postId").is_ok());

        assert!(validate_route_path("users//list").is_err());
        assert!(validate_route_path("users/:").is_err());
        assert!(validate_route_path("users/:id-x").is_err());
        assert!(validate_route_path("a/:id/b/:id").is_err());
        assert!(validate_route_path("../users").is_err());
    }

    #[test]
    fn test_try_parse_error_message() {
        let err = PathPattern::try_parse("a/:id/b/:id").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid route pattern 'a/:id/b/:id': duplicate parameter 'id'"
        );
    }
}

//! Immutable locations with hierarchical claiming
//!
//! A [`Location`] is a path split into segments plus a search string. Nested
//! routing layers consume ("claim") a prefix of the segments with
//! [`Location::try_claim`], which returns a new location whose claim index has
//! advanced past the matched pattern. Every operation returns a new value; a
//! location is never changed in place.

use crate::error::{Result, RouterError};
use crate::params::{QueryParams, RouteParams};
use crate::pattern::PathPattern;
use crate::trace_log;
use std::fmt;

/// A URI-like address decomposed for hierarchical claiming
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    segments: Vec<String>,
    search: String,
    params: RouteParams,
    claim_index: usize,
}

impl Location {
    /// Parse an href such as `/users/42?tab=posts`
    ///
    /// Empty segments are dropped and any `#fragment` is ignored. A bare `?`
    /// normalizes to an empty search.
    pub fn from_href(href: &str) -> Self {
        let href = href.split_once('#').map_or(href, |(before, _)| before);
        let (path, search) = match href.split_once('?') {
            Some((path, query)) if !query.is_empty() => (path, format!("?{}", query)),
            Some((path, _)) => (path, String::new()),
            None => (href, String::new()),
        };

        Self {
            segments: split_path(path),
            search,
            params: RouteParams::new(),
            claim_index: 0,
        }
    }

    /// Build a location from a platform address, stripping `base_path` first
    ///
    /// `pathname` and `search` are what the platform reports (e.g. the browser's
    /// `location.pathname` and `location.search`).
    pub fn from_platform(pathname: &str, search: &str, base_path: &str) -> Self {
        let path = strip_base_path(pathname, base_path);
        let search = if search.is_empty() || search == "?" {
            String::new()
        } else if search.starts_with('?') {
            search.to_string()
        } else {
            format!("?{}", search)
        };

        Self {
            segments: split_path(path),
            search,
            params: RouteParams::new(),
            claim_index: 0,
        }
    }

    /// All path segments, claimed or not
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Raw search string including the leading `?`, or empty
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Parameters bound by the most recent claim
    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Parsed query parameters
    pub fn query(&self) -> QueryParams {
        QueryParams::parse(&self.search)
    }

    /// Number of segments consumed by enclosing routing layers
    pub fn claim_index(&self) -> usize {
        self.claim_index
    }

    /// Segments not yet claimed
    pub fn unclaimed_segments(&self) -> &[String] {
        &self.segments[self.claim_index..]
    }

    /// Attempt to claim `pattern` against the unclaimed segments
    ///
    /// On success the returned location has its claim index advanced by the
    /// pattern length and its params replaced by the pattern's bindings. An
    /// empty pattern only succeeds when nothing is left to claim.
    pub fn try_claim(&self, pattern: impl Into<PathPattern>) -> Option<Location> {
        let pattern = pattern.into();
        self.try_claim_pattern(&pattern)
    }

    /// [`try_claim`](Self::try_claim) with an already compiled pattern
    pub fn try_claim_pattern(&self, pattern: &PathPattern) -> Option<Location> {
        let params = pattern.match_prefix(self.unclaimed_segments());
        trace_log!(
            "try_claim '{}' against '{}' (claimed {}): {}",
            pattern,
            self.href(),
            self.claim_index,
            if params.is_some() { "match" } else { "no match" }
        );

        params.map(|params| Location {
            segments: self.segments.clone(),
            search: self.search.clone(),
            params,
            claim_index: self.claim_index + pattern.len(),
        })
    }

    /// Claim `pattern`, failing loudly when it does not match
    ///
    /// For call sites that have already established the match must succeed.
    pub fn claim(&self, pattern: impl Into<PathPattern>) -> Result<Location> {
        let pattern = pattern.into();
        self.try_claim_pattern(&pattern)
            .ok_or_else(|| RouterError::ClaimFailed {
                pattern: pattern.as_str().to_string(),
                href: self.href(),
                unclaimed: self.unclaimed_path(),
            })
    }

    /// Claim every remaining segment
    pub fn claim_all(&self) -> Location {
        Location {
            claim_index: self.segments.len(),
            ..self.clone()
        }
    }

    /// Replace everything after the claim point with `path` and clear the search
    pub fn rewrite(&self, path: &str) -> Location {
        let mut segments = self.segments[..self.claim_index].to_vec();
        segments.extend(split_path(path));

        Location {
            segments,
            search: String::new(),
            params: self.params.clone(),
            claim_index: self.claim_index,
        }
    }

    /// Set (`Some`) or delete (`None`) a single query key
    pub fn with_param(&self, key: &str, value: Option<&str>) -> Location {
        self.with_params([(key, value)])
    }

    /// Set or delete several query keys at once
    pub fn with_params<'a, I>(&self, updates: I) -> Location
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut query = self.query();
        for (key, value) in updates {
            match value {
                Some(value) => query.set(key, value),
                None => query.remove(key),
            }
        }

        Location {
            search: query.to_search(),
            ..self.clone()
        }
    }

    /// Resolve a path against the claimed prefix of this location
    ///
    /// - `/x` is absolute and passes through unchanged
    /// - `?a=1` keeps the claimed path and replaces the query string
    /// - `.` and `..` move within the claimed prefix; `..` at the root stays
    ///   at the root
    pub fn link_to(&self, path: &str) -> String {
        if path.starts_with('/') {
            return path.to_string();
        }

        let claimed = self.claimed_href();
        if path.starts_with('?') {
            return if path == "?" {
                claimed
            } else {
                format!("{}{}", claimed, path)
            };
        }

        let (relative, search) = match path.split_once('?') {
            Some((relative, query)) if !query.is_empty() => (relative, format!("?{}", query)),
            Some((relative, _)) => (relative, String::new()),
            None => (path, String::new()),
        };

        let mut segments: Vec<&str> = self.segments[..self.claim_index]
            .iter()
            .map(String::as_str)
            .collect();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        format!("/{}{}", segments.join("/"), search)
    }

    /// Full href: `/` + all segments + search
    pub fn href(&self) -> String {
        format!("/{}{}", self.segments.join("/"), self.search)
    }

    /// Unclaimed segments joined with `/`, without a leading slash
    pub fn unclaimed_path(&self) -> String {
        self.unclaimed_segments().join("/")
    }

    /// Href of the claimed prefix, without search
    pub fn claimed_href(&self) -> String {
        format!("/{}", self.segments[..self.claim_index].join("/"))
    }

    /// Href of the unclaimed part, with search
    pub fn unclaimed_href(&self) -> String {
        format!("/{}{}", self.unclaimed_path(), self.search)
    }

    /// Compare addresses, optionally ignoring the search string
    ///
    /// Claim state and params are not part of the address.
    pub fn equals(&self, other: &Location, ignore_search: bool) -> bool {
        self.segments == other.segments && (ignore_search || self.search == other.search)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

impl From<&str> for Location {
    fn from(href: &str) -> Self {
        Self::from_href(href)
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Strip `base_path` from the front of `pathname` on a segment boundary
pub(crate) fn strip_base_path<'a>(pathname: &'a str, base_path: &str) -> &'a str {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return pathname;
    }

    match pathname.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') => rest,
        _ => pathname,
    }
}

/// Prefix an app-relative href with `base_path`
pub(crate) fn join_base_path(base_path: &str, href: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        href.to_string()
    } else if href == "/" {
        base.to_string()
    } else {
        format!("{}{}", base, href)
    }
}

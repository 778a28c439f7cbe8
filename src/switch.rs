//! Route declarations and the Switch matcher
//!
//! A [`Switch`] picks one of its declared [`Route`]s for the unclaimed part of
//! a location. Every route with a non-empty pattern is tried; the most
//! specific match wins and ties go to the route declared first. When nothing
//! matches, the first root route (empty pattern) takes over: it either renders
//! in place with the remainder still unclaimed, or, when declared with
//! [`Route::redirect`], asks for a redirect to the claimed prefix.
//!
//! Resolution is pure. [`Switch::resolve`] runs it twice, once for the current
//! and once for the next location, and the two results share nothing.
//!
//! # Example
//!
//! ```
//! use gpui_claim_router::{Location, Resolution, Route, Switch};
//!
//! let switch = Switch::new()
//!     .route(Route::new("users/:id", "user"))
//!     .route(Route::new("users/active", "active"))
//!     .route(Route::root("home"));
//!
//! let resolution = switch.resolve_location(&Location::from_href("/users/active"));
//! assert_eq!(resolution.index(), Some(1));
//! ```

use crate::error::Result;
use crate::location::Location;
use crate::pattern::{validate_route_path, PathPattern};
use crate::router::Router;
use crate::{debug_log, trace_log, warn_log};

/// A route declaration: pattern plus render payload
#[derive(Debug, Clone)]
pub struct Route<R> {
    pattern: PathPattern,
    render: R,
    redirect: bool,
}

impl<R> Route<R> {
    /// Declare a route
    ///
    /// Malformed patterns are accepted leniently and logged; use
    /// [`try_new`](Self::try_new) to reject them.
    pub fn new(path: &str, render: R) -> Self {
        if let Err(err) = validate_route_path(path) {
            warn_log!("{}", err);
        }
        Self {
            pattern: PathPattern::parse(path),
            render,
            redirect: false,
        }
    }

    /// Declare a route, failing on a malformed pattern
    pub fn try_new(path: &str, render: R) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::try_parse(path)?,
            render,
            redirect: false,
        })
    }

    /// Declare a root route (empty pattern)
    pub fn root(render: R) -> Self {
        Self {
            pattern: PathPattern::parse(""),
            render,
            redirect: false,
        }
    }

    /// Mark this root route as the redirect target for unmatched paths
    pub fn redirect(mut self) -> Self {
        self.redirect = true;
        self
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn is_root(&self) -> bool {
        self.pattern.is_empty()
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect
    }
}

/// Result of matching one location against a [`Switch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Route `index` renders with the claimed `location`
    Matched { index: usize, location: Location },
    /// Nothing rendered; navigate (replace) to `to` instead
    Redirect { index: usize, to: Location },
    /// No route applies; render nothing
    Empty,
}

impl Resolution {
    /// Index of the route involved, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            Resolution::Matched { index, .. } | Resolution::Redirect { index, .. } => Some(*index),
            Resolution::Empty => None,
        }
    }

    /// Claimed location of a match
    pub fn location(&self) -> Option<&Location> {
        match self {
            Resolution::Matched { location, .. } => Some(location),
            _ => None,
        }
    }

    /// Redirect target, if this is a redirect
    pub fn redirect_to(&self) -> Option<&Location> {
        match self {
            Resolution::Redirect { to, .. } => Some(to),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Resolution::Redirect { .. })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Resolution::Empty)
    }
}

/// Current and next resolutions of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub current: Resolution,
    pub next: Resolution,
}

impl SwitchOutcome {
    /// Router for the matched route's subtree
    ///
    /// The child's next location comes from the next resolution when it
    /// selected the same route; otherwise the child is not part of the pending
    /// transition and its next location equals its current one.
    pub fn child_router(&self, parent: &Router) -> Option<Router> {
        let Resolution::Matched { index, location } = &self.current else {
            return None;
        };
        let next = match &self.next {
            Resolution::Matched {
                index: next_index,
                location: next_location,
            } if next_index == index => next_location.clone(),
            _ => location.clone(),
        };
        Some(parent.child(location.clone(), next))
    }
}

/// An ordered set of routes resolved against one routing layer
#[derive(Debug, Clone)]
pub struct Switch<R> {
    routes: Vec<Route<R>>,
}

impl<R> Default for Switch<R> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<R> Switch<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; declaration order breaks specificity ties
    pub fn route(mut self, route: Route<R>) -> Self {
        self.routes.push(route);
        self
    }

    pub fn with_routes(routes: Vec<Route<R>>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route<R>] {
        &self.routes
    }

    pub fn get(&self, index: usize) -> Option<&Route<R>> {
        self.routes.get(index)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Index of the first root route
    pub fn root_index(&self) -> Option<usize> {
        self.routes.iter().position(Route::is_root)
    }

    /// Most specific non-root route claiming `location`
    pub(crate) fn best_match(&self, location: &Location) -> Option<(usize, Location)> {
        let mut best: Option<(usize, u32, Location)> = None;

        for (index, route) in self.routes.iter().enumerate() {
            if route.is_root() {
                continue;
            }
            let Some(claimed) = location.try_claim_pattern(&route.pattern) else {
                continue;
            };
            let specificity = route.pattern.specificity();
            trace_log!(
                "route #{} '{}' matches '{}' (specificity {})",
                index,
                route.pattern,
                location.unclaimed_href(),
                specificity
            );
            if best
                .as_ref()
                .map_or(true, |(_, best_specificity, _)| specificity > *best_specificity)
            {
                best = Some((index, specificity, claimed));
            }
        }

        best.map(|(index, _, claimed)| (index, claimed))
    }

    /// Resolve a single location
    pub fn resolve_location(&self, location: &Location) -> Resolution {
        if let Some((index, claimed)) = self.best_match(location) {
            return Resolution::Matched {
                index,
                location: claimed,
            };
        }

        let Some(index) = self.root_index() else {
            trace_log!("no route for '{}'", location.unclaimed_href());
            return Resolution::Empty;
        };

        if self.routes[index].redirect && !location.unclaimed_segments().is_empty() {
            let to = location.rewrite("");
            debug_log!(
                "no route for '{}', redirecting to '{}'",
                location.href(),
                to.href()
            );
            return Resolution::Redirect { index, to };
        }

        Resolution::Matched {
            index,
            location: location.clone(),
        }
    }

    /// Resolve both the current and the next location of `router`
    pub fn resolve(&self, router: &Router) -> SwitchOutcome {
        SwitchOutcome {
            current: self.resolve_location(router.location()),
            next: self.resolve_location(router.next_location()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::RouterError;

    fn at(href: &str) -> Location {
        Location::from_href(href)
    }

    #[test]
    fn test_literal_beats_param_regardless_of_order() {
        let switch = Switch::new()
            .route(Route::new("users/:id", 0))
            .route(Route::new("users/active", 1));
        assert_eq!(switch.resolve_location(&at("/users/active")).index(), Some(1));
        assert_eq!(switch.resolve_location(&at("/users/7")).index(), Some(0));

        let reversed = Switch::new()
            .route(Route::new("users/active", 0))
            .route(Route::new("users/:id", 1));
        assert_eq!(reversed.resolve_location(&at("/users/active")).index(), Some(0));
    }

    #[test]
    fn test_ties_go_to_first_declared() {
        let switch = Switch::new()
            .route(Route::new(":x", "first"))
            .route(Route::new(":y", "second"));
        let resolution = switch.resolve_location(&at("/anything"));
        assert_eq!(resolution.index(), Some(0));
        assert_eq!(
            resolution.location().unwrap().params().get("x").unwrap(),
            "anything"
        );
    }

    #[test]
    fn test_match_claims_prefix() {
        let switch = Switch::new().route(Route::new("users/:id", ()));
        let resolution = switch.resolve_location(&at("/users/42/edit?x=1"));
        let location = resolution.location().unwrap();
        assert_eq!(location.claim_index(), 2);
        assert_eq!(location.unclaimed_path(), "edit");
        assert_eq!(location.search(), "?x=1");
    }

    #[test]
    fn test_root_renders_in_place() {
        let switch = Switch::new()
            .route(Route::new("settings", "settings"))
            .route(Route::root("home"));
        let resolution = switch.resolve_location(&at("/deep/path"));
        assert_eq!(resolution.index(), Some(1));
        assert_eq!(resolution.location().unwrap().unclaimed_path(), "deep/path");
    }

    #[test]
    fn test_root_redirect() {
        let switch = Switch::new()
            .route(Route::new("settings", "settings"))
            .route(Route::root("home").redirect());

        let outer = at("/app/nowhere?x=1").claim("app").unwrap();
        let resolution = switch.resolve_location(&outer);
        assert!(resolution.is_redirect());
        assert_eq!(resolution.redirect_to().unwrap().href(), "/app");

        let settled = switch.resolve_location(&at("/app").claim("app").unwrap());
        assert!(settled.is_matched());
        assert_eq!(settled.index(), Some(1));
    }

    #[test]
    fn test_root_does_not_compete_with_matches() {
        let switch = Switch::new()
            .route(Route::root("home"))
            .route(Route::new("about", "about"));
        assert_eq!(switch.resolve_location(&at("/about")).index(), Some(1));
        assert_eq!(switch.resolve_location(&at("/")).index(), Some(0));
    }

    #[test]
    fn test_no_routes_is_empty() {
        let switch: Switch<()> = Switch::new();
        assert!(switch.resolve_location(&at("/x")).is_empty());

        let switch = Switch::new().route(Route::new("a", ()));
        assert!(switch.resolve_location(&at("/b")).is_empty());
    }

    #[test]
    fn test_try_new_rejects_bad_pattern() {
        assert!(matches!(
            Route::try_new("a/:id/:id", ()),
            Err(RouterError::InvalidPattern { .. })
        ));
        assert!(Route::try_new("a/:id", ()).is_ok());
    }

    #[test]
    fn test_current_and_next_resolve_independently() {
        let history = MemoryHistory::new("/").into_ref();
        let router = Router::with_locations(history, at("/a"), at("/b/1"));
        let switch = Switch::new()
            .route(Route::new("a", "a"))
            .route(Route::new("b/:id", "b"));

        let outcome = switch.resolve(&router);
        assert_eq!(outcome.current.index(), Some(0));
        assert_eq!(outcome.next.index(), Some(1));

        let child = outcome.child_router(&router).unwrap();
        assert_eq!(child.location().claimed_href(), "/a");
        assert_eq!(child.next_location().href(), "/a");
    }

    #[test]
    fn test_child_router_carries_next_location_for_same_route() {
        let history = MemoryHistory::new("/").into_ref();
        let router = Router::with_locations(history, at("/b/1"), at("/b/2"));
        let switch = Switch::new().route(Route::new("b/:id", ()));

        let child = switch.resolve(&router).child_router(&router).unwrap();
        assert_eq!(child.location().params().get("id").unwrap(), "1");
        assert_eq!(child.next_location().params().get("id").unwrap(), "2");
        assert!(child.is_pending());
        assert_eq!(child.depth(), 1);
    }
}

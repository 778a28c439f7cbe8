//! Router context values
//!
//! A [`Router`] is what every routing layer hands to its children: the current
//! location, the in-flight next location, the shared history and a link to the
//! enclosing router. Layers never mutate a router; they derive a child from the
//! location they claimed.
//!
//! [`RouterProvider`] sits at the top of the tree. It owns the history
//! subscription and decides when a pending location becomes current.

use crate::error::{NavigationResult, Result};
use crate::history::{HistoryRef, NavigateOptions};
use crate::location::Location;
use crate::subscription::Subscription;
use crate::{debug_log, trace_log};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Routing context passed down through nested layers
#[derive(Clone)]
pub struct Router {
    location: Location,
    next_location: Location,
    history: HistoryRef,
    parent: Option<Rc<Router>>,
}

impl Router {
    /// Top-level router reading the current location from `history`
    pub fn root(history: HistoryRef) -> Self {
        let location = history.top();
        Self {
            next_location: location.clone(),
            location,
            history,
            parent: None,
        }
    }

    pub(crate) fn with_locations(
        history: HistoryRef,
        location: Location,
        next_location: Location,
    ) -> Self {
        Self {
            location,
            next_location,
            history,
            parent: None,
        }
    }

    /// Router for a nested layer, sharing this router's history
    pub fn child(&self, location: Location, next_location: Location) -> Router {
        trace_log!(
            "child router at '{}' (claimed '{}')",
            location.href(),
            location.claimed_href()
        );
        Router {
            location,
            next_location,
            history: Rc::clone(&self.history),
            parent: Some(Rc::new(self.clone())),
        }
    }

    /// Location as currently shown
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Location being transitioned to; equal to `location` when idle
    pub fn next_location(&self) -> &Location {
        &self.next_location
    }

    /// True while a navigation has been received but not committed
    pub fn is_pending(&self) -> bool {
        !self.location.equals(&self.next_location, false)
    }

    pub fn history(&self) -> &HistoryRef {
        &self.history
    }

    /// The enclosing router, if any
    pub fn parent(&self) -> Option<&Router> {
        self.parent.as_deref()
    }

    /// Enclosing routers, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &Router> {
        std::iter::successors(self.parent(), |router| router.parent())
    }

    /// Nesting depth; the root router is at depth 0
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Resolve `path` against this router's claimed location
    pub fn link_to(&self, path: &str) -> String {
        self.location.link_to(path)
    }

    /// Resolve `path` relative to this router and navigate there
    pub fn navigate(&self, path: &str, options: NavigateOptions) -> Result<NavigationResult> {
        let target = self.link_to(path);
        debug_log!(
            "router at '{}' navigating '{}' -> '{}'",
            self.location.claimed_href(),
            path,
            target
        );
        self.history.navigate(&target, options)
    }

    pub fn push(&self, path: &str) -> Result<NavigationResult> {
        self.navigate(path, NavigateOptions::push())
    }

    pub fn replace(&self, path: &str) -> Result<NavigationResult> {
        self.navigate(path, NavigateOptions::replace())
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("location", &self.location.href())
            .field("claim_index", &self.location.claim_index())
            .field("next_location", &self.next_location.href())
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RouterProvider
// ============================================================================

#[derive(Debug)]
struct ProviderState {
    location: Location,
    next_location: Location,
    auto_commit: bool,
    /// Bumped on every history event
    revision: u64,
}

/// Owner of the top-level location pair
///
/// History events update `next_location`. With auto-commit (the default) the
/// current location follows immediately; otherwise the host calls
/// [`commit`](Self::commit) once the next screen is ready.
pub struct RouterProvider {
    history: HistoryRef,
    state: Rc<RefCell<ProviderState>>,
    _subscription: Subscription,
}

impl RouterProvider {
    pub fn new(history: HistoryRef) -> Self {
        let location = history.top();
        let state = Rc::new(RefCell::new(ProviderState {
            next_location: location.clone(),
            location,
            auto_commit: true,
            revision: 0,
        }));

        let weak = Rc::downgrade(&state);
        let subscription = history.on_navigate(move |location| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            state.revision += 1;
            state.next_location = location.clone();
            if state.auto_commit {
                state.location = location.clone();
            }
            debug_log!(
                "provider received '{}' (revision {}, committed: {})",
                location.href(),
                state.revision,
                state.auto_commit
            );
        });

        Self {
            history,
            state,
            _subscription: subscription,
        }
    }

    /// Toggle committing history events immediately
    pub fn with_auto_commit(self, auto_commit: bool) -> Self {
        self.state.borrow_mut().auto_commit = auto_commit;
        self
    }

    /// Root router for the current render pass
    pub fn router(&self) -> Router {
        let state = self.state.borrow();
        Router::with_locations(
            Rc::clone(&self.history),
            state.location.clone(),
            state.next_location.clone(),
        )
    }

    pub fn history(&self) -> &HistoryRef {
        &self.history
    }

    pub fn location(&self) -> Location {
        self.state.borrow().location.clone()
    }

    pub fn next_location(&self) -> Location {
        self.state.borrow().next_location.clone()
    }

    pub fn is_pending(&self) -> bool {
        let state = self.state.borrow();
        !state.location.equals(&state.next_location, false)
    }

    /// Number of history events seen so far
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Promote the next location to current
    ///
    /// Returns `false` when nothing was pending.
    pub fn commit(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.location.equals(&state.next_location, false) {
            return false;
        }
        debug_log!(
            "committing '{}' -> '{}'",
            state.location.href(),
            state.next_location.href()
        );
        state.location = state.next_location.clone();
        true
    }
}

impl fmt::Debug for RouterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterProvider")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}

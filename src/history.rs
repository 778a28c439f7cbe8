//! History: the single source of truth for "where are we"
//!
//! [`History`] is the contract shared by the in-memory implementation
//! ([`MemoryHistory`], for embedded use and tests) and the platform-backed
//! one ([`BrowserHistory`](crate::browser::BrowserHistory)). Both:
//! - accept only absolute targets in [`History::navigate`]
//! - run every `before_navigate` guard unless the navigation is forced, and
//!   abort without side effects when any guard returns `false`
//! - notify `listen` callbacks with the newly resolved [`Location`]

use crate::error::{NavigationResult, Result, RouterError};
use crate::location::{join_base_path, Location};
use crate::subscription::{ListenerSet, Subscription};
use crate::{debug_log, trace_log, warn_log, NavigationDirection};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Callback invoked after the location changed
pub type NavigateListener = dyn Fn(&Location);

/// Guard invoked with the target href; returning `false` vetoes the navigation
pub type BeforeNavigateListener = dyn Fn(&str) -> bool;

/// Shared history handle carried by [`Router`](crate::Router)
pub type HistoryRef = Rc<dyn History>;

/// Which implementation backs a history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
    /// In-memory entry stack
    Memory,
    /// Platform navigation APIs
    Browser,
}

/// Options for [`History::navigate`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current entry instead of pushing a new one
    pub replace: bool,
    /// Skip `before_navigate` guards
    pub force: bool,
}

impl NavigateOptions {
    /// Push a new entry (the default)
    pub fn push() -> Self {
        Self::default()
    }

    /// Replace the current entry
    pub fn replace() -> Self {
        Self {
            replace: true,
            force: false,
        }
    }

    /// Bypass `before_navigate` guards
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Navigation history contract
pub trait History {
    /// Implementation discriminator
    fn kind(&self) -> HistoryKind;

    /// Prefix implicitly prepended to every absolute navigation
    fn base_path(&self) -> &str;

    /// The current location, without subscribing
    fn top(&self) -> Location;

    /// Navigate to an absolute href
    ///
    /// Fails with [`RouterError::RelativeNavigation`] when `to` does not start
    /// with `/`. A vetoed navigation is `Ok(NavigationResult::Vetoed)`.
    fn navigate(&self, to: &str, options: NavigateOptions) -> Result<NavigationResult>;

    /// Register for location-changed notifications
    fn listen(&self, listener: Rc<NavigateListener>) -> Subscription;

    /// Register a navigation guard; any single veto blocks
    fn before_navigate(&self, listener: Rc<BeforeNavigateListener>) -> Subscription;

    /// Step back one entry
    ///
    /// Returns `None` when there is nowhere to go, or when the outcome is
    /// delivered asynchronously through listeners (platform histories).
    fn back(&self) -> Option<NavigationResult>;

    /// Step forward one entry; see [`back`](Self::back)
    fn forward(&self) -> Option<NavigationResult>;

    /// Direction of the most recent accepted change
    fn last_direction(&self) -> NavigationDirection;
}

impl<'a> dyn History + 'a {
    /// Register a closure for location-changed notifications
    pub fn on_navigate(&self, listener: impl Fn(&Location) + 'static) -> Subscription {
        self.listen(Rc::new(listener))
    }

    /// Register a closure as navigation guard
    pub fn on_before_navigate(&self, guard: impl Fn(&str) -> bool + 'static) -> Subscription {
        self.before_navigate(Rc::new(guard))
    }

    /// Push an absolute href
    pub fn push(&self, to: &str) -> Result<NavigationResult> {
        self.navigate(to, NavigateOptions::push())
    }

    /// Replace the current entry with an absolute href
    pub fn replace(&self, to: &str) -> Result<NavigationResult> {
        self.navigate(to, NavigateOptions::replace())
    }
}

/// Listener bookkeeping shared by both implementations
#[derive(Debug)]
pub(crate) struct HistoryListeners {
    navigate: ListenerSet<NavigateListener>,
    before: ListenerSet<BeforeNavigateListener>,
    /// Bumped by every dispatch; a nested navigation supersedes the outer one
    dispatch: Cell<u64>,
}

impl HistoryListeners {
    pub(crate) fn new() -> Self {
        Self {
            navigate: ListenerSet::new(),
            before: ListenerSet::new(),
            dispatch: Cell::new(0),
        }
    }

    pub(crate) fn listen(&self, listener: Rc<NavigateListener>) -> Subscription {
        self.navigate.add(listener)
    }

    pub(crate) fn before_navigate(&self, listener: Rc<BeforeNavigateListener>) -> Subscription {
        self.before.add(listener)
    }

    /// Run every guard with `to`; all guards see the request even after a veto
    pub(crate) fn allows(&self, to: &str) -> bool {
        let mut allowed = true;
        for guard in self.before.snapshot() {
            if !guard(to) {
                allowed = false;
            }
        }
        if !allowed {
            warn_log!("navigation to '{}' vetoed by before_navigate guard", to);
        }
        allowed
    }

    /// Deliver `location` to every listener
    ///
    /// When a listener navigates again, the nested dispatch delivers the newer
    /// location to everyone and the rest of this one is dropped.
    pub(crate) fn notify(&self, location: &Location) {
        let generation = self.dispatch.get().wrapping_add(1);
        self.dispatch.set(generation);

        for listener in self.navigate.snapshot() {
            if self.dispatch.get() != generation {
                trace_log!("stale delivery of '{}' dropped", location.href());
                return;
            }
            listener(location);
        }
    }
}

/// Reject relative targets before anything else happens
pub(crate) fn ensure_absolute(to: &str) -> Result<()> {
    if to.starts_with('/') {
        Ok(())
    } else {
        Err(RouterError::RelativeNavigation { to: to.to_string() })
    }
}

// ============================================================================
// MemoryHistory
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryState {
    /// App-relative hrefs
    entries: Vec<String>,
    current: usize,
    max_size: usize,
    direction: NavigationDirection,
}

impl MemoryState {
    fn current_href(&self) -> &str {
        &self.entries[self.current]
    }

    fn push(&mut self, href: String) {
        // forward history is discarded on push
        self.entries.truncate(self.current + 1);
        self.entries.push(href);
        self.current += 1;
        self.enforce_size_limit();
        self.direction = NavigationDirection::Forward;
    }

    fn replace(&mut self, href: String) {
        self.entries[self.current] = href;
        self.direction = NavigationDirection::Replace;
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            // drop the oldest entries, the current one stays reachable
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

/// In-memory history for embedded routers, previews and tests
///
/// # Example
///
/// ```
/// use gpui_claim_router::{History, MemoryHistory, NavigateOptions};
///
/// let history = MemoryHistory::new("/");
/// history.navigate("/users/42", NavigateOptions::push()).unwrap();
/// assert_eq!(history.top().href(), "/users/42");
///
/// history.back();
/// assert_eq!(history.top().href(), "/");
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
    state: RefCell<MemoryState>,
    base_path: String,
    listeners: HistoryListeners,
}

impl MemoryHistory {
    /// Default cap on the number of stored entries
    pub const DEFAULT_MAX_SIZE: usize = 1000;

    /// Create a history positioned at `initial`
    pub fn new(initial: &str) -> Self {
        Self {
            state: RefCell::new(MemoryState {
                entries: vec![Location::from_href(initial).href()],
                current: 0,
                max_size: Self::DEFAULT_MAX_SIZE,
                direction: NavigationDirection::Replace,
            }),
            base_path: String::new(),
            listeners: HistoryListeners::new(),
        }
    }

    /// Mount the history under a base path
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Cap the number of stored entries (0 = unlimited)
    pub fn with_max_size(self, max_size: usize) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.max_size = max_size;
            state.enforce_size_limit();
        }
        self
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> HistoryRef {
        Rc::new(self)
    }

    /// Full address of the current entry, base path included
    pub fn address(&self) -> String {
        join_base_path(&self.base_path, self.state.borrow().current_href())
    }

    /// Stored hrefs, oldest first
    pub fn entries(&self) -> Vec<String> {
        self.state.borrow().entries.clone()
    }

    /// Index of the current entry
    pub fn current_index(&self) -> usize {
        self.state.borrow().current
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// Never true; a history always has a current entry
    pub fn is_empty(&self) -> bool {
        self.state.borrow().entries.is_empty()
    }

    /// Check if can go back
    pub fn can_go_back(&self) -> bool {
        self.state.borrow().current > 0
    }

    /// Check if can go forward
    pub fn can_go_forward(&self) -> bool {
        let state = self.state.borrow();
        state.current + 1 < state.entries.len()
    }

    /// Move to a neighbouring entry through the guard
    fn step(&self, forward: bool) -> Option<NavigationResult> {
        let target = {
            let state = self.state.borrow();
            let index = if forward {
                (state.current + 1 < state.entries.len()).then_some(state.current + 1)?
            } else {
                state.current.checked_sub(1)?
            };
            state.entries[index].clone()
        };

        if !self.listeners.allows(&target) {
            return Some(NavigationResult::Vetoed { to: target });
        }

        {
            let mut state = self.state.borrow_mut();
            if forward {
                state.current += 1;
                state.direction = NavigationDirection::Forward;
            } else {
                state.current -= 1;
                state.direction = NavigationDirection::Back;
            }
        }

        let location = Location::from_href(&target);
        debug_log!("memory history stepped to '{}'", target);
        self.listeners.notify(&location);
        Some(NavigationResult::Navigated { location })
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn kind(&self) -> HistoryKind {
        HistoryKind::Memory
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn top(&self) -> Location {
        Location::from_href(self.state.borrow().current_href())
    }

    fn navigate(&self, to: &str, options: NavigateOptions) -> Result<NavigationResult> {
        ensure_absolute(to)?;

        let location = Location::from_href(to);
        let href = location.href();
        debug_log!(
            "memory navigate -> '{}' (replace: {}, force: {})",
            href,
            options.replace,
            options.force
        );

        if !options.force && !self.listeners.allows(&href) {
            return Ok(NavigationResult::Vetoed { to: href });
        }

        {
            let mut state = self.state.borrow_mut();
            if options.replace {
                state.replace(href);
            } else {
                state.push(href);
            }
        }

        self.listeners.notify(&location);
        Ok(NavigationResult::Navigated { location })
    }

    fn listen(&self, listener: Rc<NavigateListener>) -> Subscription {
        self.listeners.listen(listener)
    }

    fn before_navigate(&self, listener: Rc<BeforeNavigateListener>) -> Subscription {
        self.listeners.before_navigate(listener)
    }

    fn back(&self) -> Option<NavigationResult> {
        self.step(false)
    }

    fn forward(&self) -> Option<NavigationResult> {
        self.step(true)
    }

    fn last_direction(&self) -> NavigationDirection {
        self.state.borrow().direction
    }
}

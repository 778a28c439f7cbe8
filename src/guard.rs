//! Unsaved-changes blocker
//!
//! [`NavigationBlocker`] registers a before-navigate guard that vetoes every
//! navigation while it is marked dirty. A confirm callback, when set, gets the
//! final say; confirming lets the navigation through and the dirty state is
//! discarded when it commits. Without one, the vetoed target is kept so the host can prompt and
//! then retry with [`NavigateOptions::forced`](crate::NavigateOptions::forced).

use crate::history::History;
use crate::location::Location;
use crate::subscription::Subscription;
use crate::{debug_log, warn_log};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Asked with the navigation target; `true` discards unsaved changes
pub type ConfirmFn = dyn Fn(&str) -> bool;

#[derive(Default)]
struct BlockerState {
    dirty: Cell<bool>,
    confirm: RefCell<Option<Rc<ConfirmFn>>>,
    blocked: RefCell<Option<String>>,
    /// Target the user agreed to leave for; changes are discarded once it commits
    confirmed: RefCell<Option<String>>,
}

impl BlockerState {
    fn allows(&self, to: &str) -> bool {
        self.confirmed.borrow_mut().take();
        if !self.dirty.get() {
            return true;
        }

        let confirm = self.confirm.borrow().clone();
        if let Some(confirm) = confirm {
            if confirm(to) {
                *self.confirmed.borrow_mut() = Some(to.to_string());
                return true;
            }
        }

        warn_log!("navigation to '{}' blocked by unsaved changes", to);
        *self.blocked.borrow_mut() = Some(to.to_string());
        false
    }

    fn committed(&self, location: &Location) {
        if self.confirmed.borrow_mut().take().is_some() {
            debug_log!("unsaved changes discarded for '{}'", location.href());
            self.dirty.set(false);
        }
    }
}

/// Before-navigate guard for screens with unsaved changes
///
/// The guard stays registered as long as the blocker lives. Other guards may
/// still veto a confirmed navigation; the dirty state is only discarded once
/// the navigation goes through.
pub struct NavigationBlocker {
    state: Rc<BlockerState>,
    _guard: Subscription,
    _listener: Subscription,
}

impl NavigationBlocker {
    pub fn new(history: &dyn History) -> Self {
        let state = Rc::new(BlockerState::default());
        let guard_state = Rc::clone(&state);
        let guard = history.on_before_navigate(move |to| guard_state.allows(to));
        let listener_state = Rc::clone(&state);
        let listener = history.on_navigate(move |location| listener_state.committed(location));
        Self {
            state,
            _guard: guard,
            _listener: listener,
        }
    }

    /// Ask `confirm` before vetoing
    pub fn with_confirm(self, confirm: impl Fn(&str) -> bool + 'static) -> Self {
        *self.state.confirm.borrow_mut() = Some(Rc::new(confirm));
        self
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.state.dirty.set(dirty);
        if !dirty {
            self.state.blocked.borrow_mut().take();
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.state.dirty.get()
    }

    /// Target of the most recent vetoed navigation
    pub fn blocked(&self) -> Option<String> {
        self.state.blocked.borrow().clone()
    }

    /// Take the vetoed target, e.g. to retry it after the user confirmed
    pub fn take_blocked(&self) -> Option<String> {
        self.state.blocked.borrow_mut().take()
    }
}

impl fmt::Debug for NavigationBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationBlocker")
            .field("dirty", &self.state.dirty.get())
            .field("blocked", &self.state.blocked.borrow())
            .finish_non_exhaustive()
    }
}

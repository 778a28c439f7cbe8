//! Listener registration with drop-to-unsubscribe handles

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Handle for a registered callback
///
/// Dropping the handle (or calling [`unsubscribe`](Self::unsubscribe)) removes
/// the callback. Call [`detach`](Self::detach) to keep it registered for as
/// long as its owner lives.
#[must_use = "dropping a Subscription unregisters the callback immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Remove the callback now
    pub fn unsubscribe(mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }

    /// Keep the callback registered and forget the handle
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.unsubscribe.is_some())
            .finish()
    }
}

struct Entries<F: ?Sized> {
    next_id: u64,
    listeners: Vec<(u64, Rc<F>)>,
}

/// Ordered set of callbacks, each owned by a [`Subscription`]
///
/// Ids come from a counter owned by the set, so separate histories never share
/// ids.
pub(crate) struct ListenerSet<F: ?Sized> {
    entries: Rc<RefCell<Entries<F>>>,
}

impl<F: ?Sized + 'static> ListenerSet<F> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Entries {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub(crate) fn add(&self, listener: Rc<F>) -> Subscription {
        let id = {
            let mut entries = self.entries.borrow_mut();
            let id = entries.next_id;
            entries.next_id += 1;
            entries.listeners.push((id, listener));
            id
        };

        let entries: Weak<RefCell<Entries<F>>> = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries
                    .borrow_mut()
                    .listeners
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Clone the current callbacks so they can run without holding a borrow;
    /// callbacks are free to (un)subscribe or navigate.
    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().listeners.len()
    }
}

impl<F: ?Sized> fmt::Debug for ListenerSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerSet")
            .field("len", &self.entries.borrow().listeners.len())
            .finish()
    }
}

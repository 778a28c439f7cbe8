//! Keyed navigation stack with timed enter/exit phases
//!
//! Every item moves through `Entering -> Active -> Exiting -> removed`.
//! [`NavStack::reconcile`] diffs the stack against a new list of keyed entries;
//! items that disappear start exiting and stay in the stack until
//! [`NavStack::on_timer`] sees their exit deadline pass. An item that comes
//! back before then has its exit cancelled.
//!
//! Time is always passed in explicitly, the stack never reads the clock. The
//! host schedules a wake-up at [`NavStack::next_deadline`].

use crate::location::Location;
use crate::switch::Switch;
use crate::transition::{Platform, Transition};
use crate::{debug_log, trace_log, warn_log};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Lifecycle phase of a stack item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Animating in until the deadline
    Entering { until: Instant },
    /// Settled
    Active,
    /// Animating out; removed once the deadline passes
    Exiting { until: Instant },
}

/// One screen in the stack
#[derive(Debug, Clone)]
pub struct StackItem<T> {
    key: String,
    value: T,
    phase: Phase,
}

impl<T> StackItem<T> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_exiting(&self) -> bool {
        matches!(self.phase, Phase::Exiting { .. })
    }

    pub fn is_entering(&self) -> bool {
        matches!(self.phase, Phase::Entering { .. })
    }

    fn deadline(&self) -> Option<Instant> {
        match self.phase {
            Phase::Entering { until } | Phase::Exiting { until } => Some(until),
            Phase::Active => None,
        }
    }
}

/// Timing and animation for a [`NavStack`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavStackConfig {
    pub platform: Platform,
    pub transition: Transition,
    pub enter: Duration,
    pub exit: Duration,
}

impl NavStackConfig {
    /// Platform preset: enter and exit both take the transition's duration
    pub fn for_platform(platform: Platform) -> Self {
        let transition = Transition::for_platform(platform);
        Self {
            platform,
            transition,
            enter: transition.duration(),
            exit: transition.duration(),
        }
    }

    pub fn with_enter(mut self, enter: Duration) -> Self {
        self.enter = enter;
        self
    }

    pub fn with_exit(mut self, exit: Duration) -> Self {
        self.exit = exit;
        self
    }
}

impl Default for NavStackConfig {
    fn default() -> Self {
        Self::for_platform(Platform::default())
    }
}

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackDiff {
    /// Keys added to the stack
    pub entered: Vec<String>,
    /// Keys that started exiting
    pub exiting: Vec<String>,
    /// Exiting keys that came back before being removed
    pub reentered: Vec<String>,
}

impl StackDiff {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exiting.is_empty() && self.reentered.is_empty()
    }
}

/// Ordered, keyed stack of screens
#[derive(Debug, Clone)]
pub struct NavStack<T> {
    items: Vec<StackItem<T>>,
    config: NavStackConfig,
    initialized: bool,
}

impl<T> Default for NavStack<T> {
    fn default() -> Self {
        Self::new(NavStackConfig::default())
    }
}

impl<T> NavStack<T> {
    pub fn new(config: NavStackConfig) -> Self {
        Self {
            items: Vec::new(),
            config,
            initialized: false,
        }
    }

    pub fn config(&self) -> &NavStackConfig {
        &self.config
    }

    pub fn items(&self) -> &[StackItem<T>] {
        &self.items
    }

    pub fn get(&self, key: &str) -> Option<&StackItem<T>> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Diff the stack against `entries`, bottom first
    ///
    /// Kept items stay in place with their value refreshed. New keys enter,
    /// except on the very first pass, where they start active. Missing keys
    /// start exiting and keep their position relative to their old
    /// neighbours.
    pub fn reconcile<I>(&mut self, entries: I, now: Instant) -> StackDiff
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let animate = self.initialized;
        self.initialized = true;

        let mut seen = HashSet::new();
        let entries: Vec<(String, T)> = entries
            .into_iter()
            .filter(|(key, _)| {
                let fresh = seen.insert(key.clone());
                if !fresh {
                    warn_log!("duplicate stack key '{}' ignored", key);
                }
                fresh
            })
            .collect();

        let mut diff = StackDiff::default();
        let mut kept: HashMap<String, StackItem<T>> = HashMap::new();
        let mut leaving: Vec<(Option<String>, StackItem<T>)> = Vec::new();
        let mut anchor: Option<String> = None;

        for mut item in std::mem::take(&mut self.items) {
            if seen.contains(&item.key) {
                anchor = Some(item.key.clone());
                kept.insert(item.key.clone(), item);
                continue;
            }

            if !item.is_exiting() {
                if self.config.exit.is_zero() {
                    trace_log!("stack item '{}' removed without exit", item.key);
                    diff.exiting.push(item.key.clone());
                    continue;
                }
                item.phase = Phase::Exiting {
                    until: now + self.config.exit,
                };
                diff.exiting.push(item.key.clone());
            }
            let key = item.key.clone();
            leaving.push((anchor.replace(key), item));
        }

        let mut items = Vec::with_capacity(entries.len() + leaving.len());
        for (key, value) in entries {
            match kept.remove(&key) {
                Some(mut item) => {
                    if item.is_exiting() {
                        item.phase = Phase::Active;
                        diff.reentered.push(key);
                    }
                    item.value = value;
                    items.push(item);
                }
                None => {
                    let phase = if animate && !self.config.enter.is_zero() {
                        Phase::Entering {
                            until: now + self.config.enter,
                        }
                    } else {
                        Phase::Active
                    };
                    diff.entered.push(key.clone());
                    items.push(StackItem { key, value, phase });
                }
            }
        }

        for (anchor, item) in leaving {
            let position = anchor
                .and_then(|key| items.iter().position(|existing| existing.key == key))
                .map_or(0, |index| index + 1);
            items.insert(position, item);
        }

        self.items = items;
        if !diff.is_empty() {
            debug_log!(
                "stack reconciled: entered {:?}, exiting {:?}, reentered {:?}",
                diff.entered,
                diff.exiting,
                diff.reentered
            );
        }
        diff
    }

    /// Apply every deadline at or before `now`
    ///
    /// Returns `true` when anything changed.
    pub fn on_timer(&mut self, now: Instant) -> bool {
        let before = self.items.len();
        self.items.retain(|item| match item.phase {
            Phase::Exiting { until } if until <= now => {
                trace_log!("stack item '{}' removed", item.key);
                false
            }
            _ => true,
        });

        let mut changed = self.items.len() != before;
        for item in &mut self.items {
            if let Phase::Entering { until } = item.phase {
                if until <= now {
                    item.phase = Phase::Active;
                    changed = true;
                }
            }
        }
        changed
    }

    /// Earliest pending enter or exit deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.items.iter().filter_map(StackItem::deadline).min()
    }

    fn top_index(&self) -> Option<usize> {
        self.items.iter().rposition(|item| !item.is_exiting())
    }

    /// Only the topmost non-exiting item is visible to assistive technology
    pub fn is_hidden(&self, index: usize) -> bool {
        self.top_index() != Some(index)
    }

    /// Key of the topmost non-exiting item
    pub fn active_key(&self) -> Option<&str> {
        self.top_index().map(|index| self.items[index].key.as_str())
    }

    /// Key of the screen a back gesture would return to
    pub fn back_target(&self) -> Option<&str> {
        let top = self.top_index()?;
        self.items[..top]
            .iter()
            .rev()
            .find(|item| !item.is_exiting())
            .map(|item| item.key.as_str())
    }
}

// ============================================================================
// Stack entries
// ============================================================================

/// One screen derived from a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackEntry {
    /// Claimed href, used as the stack key
    pub key: String,
    /// Index of the route rendering this screen
    pub route: usize,
    /// Location claimed up to this screen
    pub location: Location,
}

/// Screens for `location`, bottom first
///
/// The root route (if declared) is the bottom screen. Above it, the switch is
/// resolved repeatedly against what is still unclaimed, one screen per claim,
/// until a pass claims nothing more.
///
/// A location the switch redirects (nothing matches and the root route is a
/// redirect) has no screens; resolve it with
/// [`Switch::resolve_location`] to get the target.
pub fn stack_entries<R>(switch: &Switch<R>, location: &Location) -> Vec<StackEntry> {
    if switch.resolve_location(location).is_redirect() {
        return Vec::new();
    }

    let mut entries = Vec::new();

    if let Some(route) = switch.root_index() {
        entries.push(StackEntry {
            key: location.claimed_href(),
            route,
            location: location.clone(),
        });
    }

    let mut current = location.clone();
    while let Some((route, claimed)) = switch.best_match(&current) {
        if claimed.claim_index() <= current.claim_index() {
            break;
        }
        entries.push(StackEntry {
            key: claimed.claimed_href(),
            route,
            location: claimed.clone(),
        });
        current = claimed;
    }

    trace_log!("stack for '{}': {} screens", location.href(), entries.len());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switch::Route;

    fn slide_config() -> NavStackConfig {
        NavStackConfig::for_platform(Platform::Ios)
            .with_enter(Duration::from_millis(300))
            .with_exit(Duration::from_millis(300))
    }

    fn keys<T>(stack: &NavStack<T>) -> Vec<&str> {
        stack.items().iter().map(StackItem::key).collect()
    }

    fn entries(keys: &[&str]) -> Vec<(String, ())> {
        keys.iter().map(|key| (key.to_string(), ())).collect()
    }

    #[test]
    fn test_first_reconcile_does_not_animate() {
        let mut stack = NavStack::new(slide_config());
        let diff = stack.reconcile(entries(&["/a"]), Instant::now());
        assert_eq!(diff.entered, vec!["/a".to_string()]);
        assert_eq!(stack.items()[0].phase(), Phase::Active);
    }

    #[test]
    fn test_push_enters_then_settles() {
        let start = Instant::now();
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(entries(&["/a"]), start);
        stack.reconcile(entries(&["/a", "/a/b"]), start);

        assert!(stack.get("/a/b").unwrap().is_entering());
        assert_eq!(stack.next_deadline(), Some(start + Duration::from_millis(300)));

        assert!(!stack.on_timer(start + Duration::from_millis(299)));
        assert!(stack.on_timer(start + Duration::from_millis(300)));
        assert_eq!(stack.get("/a/b").unwrap().phase(), Phase::Active);
        assert_eq!(stack.next_deadline(), None);
    }

    #[test]
    fn test_pop_keeps_item_until_exit_elapses() {
        let start = Instant::now();
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(entries(&["/a"]), start);
        stack.reconcile(entries(&["/a", "/a/b"]), start);
        stack.on_timer(start + Duration::from_millis(300));

        let popped_at = start + Duration::from_secs(1);
        let diff = stack.reconcile(entries(&["/a"]), popped_at);
        assert_eq!(diff.exiting, vec!["/a/b".to_string()]);
        assert_eq!(keys(&stack), vec!["/a", "/a/b"]);
        assert_eq!(stack.active_key(), Some("/a"));

        stack.on_timer(popped_at + Duration::from_millis(299));
        assert_eq!(keys(&stack), vec!["/a", "/a/b"]);

        stack.on_timer(popped_at + Duration::from_millis(300));
        assert_eq!(keys(&stack), vec!["/a"]);
    }

    #[test]
    fn test_reentering_cancels_exit() {
        let start = Instant::now();
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(entries(&["/a", "/a/b"]), start);
        stack.reconcile(entries(&["/a"]), start);
        assert!(stack.get("/a/b").unwrap().is_exiting());

        let diff = stack.reconcile(entries(&["/a", "/a/b"]), start + Duration::from_millis(100));
        assert_eq!(diff.reentered, vec!["/a/b".to_string()]);
        assert_eq!(stack.get("/a/b").unwrap().phase(), Phase::Active);

        stack.on_timer(start + Duration::from_secs(5));
        assert_eq!(keys(&stack), vec!["/a", "/a/b"]);
    }

    #[test]
    fn test_exiting_items_keep_relative_position() {
        let start = Instant::now();
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(entries(&["/", "/a", "/a/b"]), start);
        stack.reconcile(entries(&["/", "/c"]), start);

        assert_eq!(keys(&stack), vec!["/", "/a", "/a/b", "/c"]);
        assert_eq!(stack.active_key(), Some("/c"));
        assert_eq!(stack.back_target(), Some("/"));
    }

    #[test]
    fn test_zero_exit_removes_immediately() {
        let mut stack = NavStack::new(NavStackConfig::for_platform(Platform::Web));
        stack.reconcile(entries(&["/a", "/a/b"]), Instant::now());
        let diff = stack.reconcile(entries(&["/a"]), Instant::now());
        assert_eq!(diff.exiting, vec!["/a/b".to_string()]);
        assert_eq!(keys(&stack), vec!["/a"]);
    }

    #[test]
    fn test_only_top_item_is_visible() {
        let start = Instant::now();
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(entries(&["/a", "/a/b", "/a/b/c"]), start);
        stack.reconcile(entries(&["/a", "/a/b"]), start);

        let visible: Vec<usize> = (0..stack.len()).filter(|i| !stack.is_hidden(*i)).collect();
        assert_eq!(visible, vec![1]);
    }

    #[test]
    fn test_duplicate_keys_are_ignored() {
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(
            vec![("/a".to_string(), 1), ("/a".to_string(), 2)],
            Instant::now(),
        );
        assert_eq!(stack.len(), 1);
        assert_eq!(*stack.items()[0].value(), 1);
    }

    #[test]
    fn test_values_are_refreshed_for_kept_items() {
        let mut stack = NavStack::new(slide_config());
        stack.reconcile(vec![("/a".to_string(), 1)], Instant::now());
        stack.reconcile(vec![("/a".to_string(), 2)], Instant::now());
        assert_eq!(*stack.get("/a").unwrap().value(), 2);
    }

    #[test]
    fn test_stack_entries() {
        let switch = Switch::new()
            .route(Route::root("home"))
            .route(Route::new("list", "list"))
            .route(Route::new(":id", "detail"))
            .route(Route::new("edit", "edit"));

        let entries = stack_entries(&switch, &Location::from_href("/list/42/edit"));
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["/", "/list", "/list/42", "/list/42/edit"]);
        let routes: Vec<usize> = entries.iter().map(|e| e.route).collect();
        assert_eq!(routes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_stack_entries_without_root() {
        let switch = Switch::new().route(Route::new("a", ()));
        let entries = stack_entries(&switch, &Location::from_href("/b"));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_stack_entries_for_redirected_location() {
        let switch = Switch::new()
            .route(Route::root("index").redirect())
            .route(Route::new("users", "users"));

        let garbage = Location::from_href("/garbage");
        assert!(stack_entries(&switch, &garbage).is_empty());
        assert_eq!(
            switch.resolve_location(&garbage).redirect_to().map(Location::href),
            Some("/".to_string())
        );

        let keys = |href: &str| -> Vec<String> {
            stack_entries(&switch, &Location::from_href(href))
                .into_iter()
                .map(|entry| entry.key)
                .collect()
        };
        assert_eq!(keys("/"), vec!["/"]);
        assert_eq!(keys("/users"), vec!["/", "/users"]);
    }
}

//! Tab bar matcher with per-tab memory
//!
//! [`Tabs`] works like a [`Switch`](crate::Switch) that always has an answer:
//! when no tab claims the location, the first tab becomes active and the
//! resolution carries a redirect. Each tab remembers the last location it
//! was active at, so coming back to a tab restores its deep state.
//!
//! All visited tabs stay in the resolution as [`TabPane::Remembered`] panes;
//! only the active pane is visible.

use crate::error::Result;
use crate::location::Location;
use crate::pattern::{validate_route_path, PathPattern};
use crate::{debug_log, trace_log, warn_log};
use std::collections::HashMap;

/// A tab declaration
#[derive(Debug, Clone)]
pub struct Tab<R> {
    pattern: PathPattern,
    render: R,
}

impl<R> Tab<R> {
    pub fn new(path: &str, render: R) -> Self {
        if let Err(err) = validate_route_path(path) {
            warn_log!("{}", err);
        }
        Self {
            pattern: PathPattern::parse(path),
            render,
        }
    }

    pub fn try_new(path: &str, render: R) -> Result<Self> {
        Ok(Self {
            pattern: PathPattern::try_parse(path)?,
            render,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn render(&self) -> &R {
        &self.render
    }
}

/// What to show for one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabPane {
    /// The selected tab, at its claimed location
    Active(Location),
    /// A previously visited tab kept alive at its last location
    Remembered(Location),
    /// Never visited; nothing is rendered yet
    Placeholder,
}

impl TabPane {
    /// Hidden panes stay mounted but are invisible and out of the
    /// accessibility tree
    pub fn is_hidden(&self) -> bool {
        !matches!(self, TabPane::Active(_))
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            TabPane::Active(location) | TabPane::Remembered(location) => Some(location),
            TabPane::Placeholder => None,
        }
    }
}

/// Result of resolving a location against [`Tabs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabsResolution {
    /// Index of the active tab
    pub active: usize,
    /// Set when no tab claimed the location and the first tab was selected
    pub redirect: Option<Location>,
    /// One pane per declared tab, in declaration order
    pub panes: Vec<TabPane>,
}

impl TabsResolution {
    pub fn active_location(&self) -> Option<&Location> {
        self.panes.get(self.active).and_then(TabPane::location)
    }
}

/// Tab matcher owning the last-visited location of every tab
#[derive(Debug, Clone)]
pub struct Tabs<R> {
    tabs: Vec<Tab<R>>,
    memory: HashMap<String, Location>,
}

impl<R> Default for Tabs<R> {
    fn default() -> Self {
        Self {
            tabs: Vec::new(),
            memory: HashMap::new(),
        }
    }
}

impl<R> Tabs<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tab(mut self, tab: Tab<R>) -> Self {
        self.tabs.push(tab);
        self
    }

    pub fn tabs(&self) -> &[Tab<R>] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Last location tab `index` was active at
    pub fn remembered(&self, index: usize) -> Option<&Location> {
        let tab = self.tabs.get(index)?;
        self.memory.get(tab.pattern.as_str())
    }

    /// Drop the remembered location of tab `index`
    pub fn forget(&mut self, index: usize) {
        if let Some(tab) = self.tabs.get(index) {
            self.memory.remove(tab.pattern.as_str());
        }
    }

    /// Select the active tab without touching memory
    ///
    /// Returns the tab index, its claimed location and the redirect target
    /// when the first tab was selected as a fallback.
    fn select(&self, location: &Location) -> Option<(usize, Location, Option<Location>)> {
        let first = self.tabs.first()?;

        let mut best: Option<(usize, u32, Location)> = None;
        for (index, tab) in self.tabs.iter().enumerate() {
            let Some(claimed) = location.try_claim_pattern(&tab.pattern) else {
                continue;
            };
            let specificity = tab.pattern.specificity();
            trace_log!("tab #{} '{}' claims '{}'", index, tab.pattern, location.href());
            if best
                .as_ref()
                .map_or(true, |(_, best_specificity, _)| specificity > *best_specificity)
            {
                best = Some((index, specificity, claimed));
            }
        }

        if let Some((index, _, claimed)) = best {
            return Some((index, claimed, None));
        }

        let to = location.rewrite(first.pattern.as_str());
        let claimed = to
            .try_claim_pattern(&first.pattern)
            .unwrap_or_else(|| to.clone());
        debug_log!(
            "no tab claims '{}', falling back to '{}'",
            location.href(),
            to.href()
        );
        Some((0, claimed, Some(to)))
    }

    /// Resolve the current location and remember it for the active tab
    ///
    /// Returns `None` only when no tabs are declared.
    pub fn resolve(&mut self, location: &Location) -> Option<TabsResolution> {
        let (active, claimed, redirect) = self.select(location)?;

        if redirect.is_none() {
            let key = self.tabs[active].pattern.as_str().to_string();
            self.memory.insert(key, claimed.clone());
        }

        let panes = self
            .tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| {
                if index == active {
                    TabPane::Active(claimed.clone())
                } else {
                    match self.memory.get(tab.pattern.as_str()) {
                        Some(location) => TabPane::Remembered(location.clone()),
                        None => TabPane::Placeholder,
                    }
                }
            })
            .collect();

        Some(TabsResolution {
            active,
            redirect,
            panes,
        })
    }

    /// Resolve the next location without recording anything
    pub fn resolve_next(&self, location: &Location) -> Option<(usize, Location)> {
        self.select(location)
            .map(|(index, claimed, _)| (index, claimed))
    }

    /// Href a tab button should navigate to
    ///
    /// Returns the tab's remembered location if it has one, otherwise the
    /// tab's own path under `location`'s claimed prefix.
    pub fn link_for(&self, index: usize, location: &Location) -> Option<String> {
        let tab = self.tabs.get(index)?;
        Some(match self.memory.get(tab.pattern.as_str()) {
            Some(remembered) => remembered.href(),
            None => location.rewrite(tab.pattern.as_str()).href(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tabs() -> Tabs<&'static str> {
        Tabs::new()
            .tab(Tab::new("home", "home"))
            .tab(Tab::new("settings", "settings"))
    }

    fn at(href: &str) -> Location {
        Location::from_href(href)
    }

    #[test]
    fn test_matching_tab_is_active() {
        let mut tabs = tabs();
        let resolution = tabs.resolve(&at("/settings/profile")).unwrap();
        assert_eq!(resolution.active, 1);
        assert!(resolution.redirect.is_none());
        assert_eq!(resolution.panes[0], TabPane::Placeholder);
        assert_eq!(
            resolution.active_location().unwrap().unclaimed_path(),
            "profile"
        );
    }

    #[test]
    fn test_unmatched_falls_back_to_first_tab_with_redirect() {
        let mut tabs = tabs();
        let resolution = tabs.resolve(&at("/nonexistent")).unwrap();
        assert_eq!(resolution.active, 0);
        assert_eq!(resolution.redirect.unwrap().href(), "/home");
        assert!(!resolution.panes[0].is_hidden());
    }

    #[test]
    fn test_no_tabs_resolves_to_none() {
        let mut tabs: Tabs<()> = Tabs::new();
        assert!(tabs.resolve(&at("/x")).is_none());
    }

    #[test]
    fn test_visited_tabs_are_remembered_and_hidden() {
        let mut tabs = tabs();
        tabs.resolve(&at("/home/feed/3")).unwrap();
        let resolution = tabs.resolve(&at("/settings")).unwrap();

        assert_eq!(resolution.active, 1);
        let home = &resolution.panes[0];
        assert!(home.is_hidden());
        assert_eq!(home.location().unwrap().href(), "/home/feed/3");
        assert!(!resolution.panes[1].is_hidden());
    }

    #[test]
    fn test_exactly_one_active_pane() {
        let mut tabs = tabs();
        tabs.resolve(&at("/home")).unwrap();
        tabs.resolve(&at("/settings")).unwrap();
        let resolution = tabs.resolve(&at("/home/x")).unwrap();
        let visible = resolution.panes.iter().filter(|p| !p.is_hidden()).count();
        assert_eq!(visible, 1);
    }

    #[test]
    fn test_link_for_restores_deep_state() {
        let mut tabs = tabs();
        let root = at("/");
        assert_eq!(tabs.link_for(0, &root).unwrap(), "/home");

        tabs.resolve(&at("/home/feed/3?sort=new")).unwrap();
        tabs.resolve(&at("/settings")).unwrap();
        assert_eq!(tabs.link_for(0, &root).unwrap(), "/home/feed/3?sort=new");
        assert!(tabs.link_for(5, &root).is_none());

        tabs.forget(0);
        assert_eq!(tabs.link_for(0, &root).unwrap(), "/home");
    }

    #[test]
    fn test_link_for_under_claimed_prefix() {
        let tabs = tabs();
        let location = at("/app/other").claim("app").unwrap();
        assert_eq!(tabs.link_for(1, &location).unwrap(), "/app/settings");
    }

    #[test]
    fn test_resolve_next_is_pure() {
        let tabs = tabs();
        let (index, location) = tabs.resolve_next(&at("/settings/a")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(location.claim_index(), 1);
        assert!(tabs.remembered(1).is_none());
    }

    #[test]
    fn test_fallback_does_not_overwrite_memory() {
        let mut tabs = tabs();
        tabs.resolve(&at("/home/deep")).unwrap();
        tabs.resolve(&at("/unknown")).unwrap();
        assert_eq!(tabs.remembered(0).unwrap().href(), "/home/deep");
    }
}

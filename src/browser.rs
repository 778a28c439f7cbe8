//! Platform-backed history
//!
//! [`BrowserHistory`] keeps the platform address bar and the application in
//! sync. The platform itself sits behind the [`HistoryPlatform`] trait so the
//! history logic runs the same against a real browser ([`WebPlatform`], feature
//! `web`) and against a scripted platform in tests.
//!
//! Back/forward buttons change the address before the application hears about
//! it. When a guard vetoes such a pop, the previously tracked location is
//! pushed back onto the platform stack so the address bar matches the screen
//! again.

use crate::error::{NavigationResult, Result};
use crate::history::{
    ensure_absolute, BeforeNavigateListener, History, HistoryKind, HistoryListeners,
    NavigateListener, NavigateOptions,
};
use crate::location::{join_base_path, Location};
use crate::subscription::Subscription;
use crate::{debug_log, warn_log, NavigationDirection};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Address as reported by the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformAddress {
    /// Path part, base path included
    pub pathname: String,
    /// Search part, with or without the leading `?`
    pub search: String,
}

/// Address reading and writing provided by the host platform
pub trait HistoryPlatform {
    /// Current address
    fn address(&self) -> PlatformAddress;

    /// Add an entry without reloading
    fn push(&self, url: &str);

    /// Overwrite the current entry without reloading
    fn replace(&self, url: &str);

    /// Move through the platform's own stack; the result arrives as a pop event
    fn go(&self, delta: i32);

    /// Register the callback for externally triggered back/forward navigation
    fn on_pop(&self, callback: Box<dyn Fn()>);
}

/// History backed by platform navigation APIs
pub struct BrowserHistory<P: HistoryPlatform> {
    platform: P,
    base_path: String,
    /// Last location the application accepted; restored when a pop is vetoed
    previous: RefCell<Location>,
    direction: Cell<NavigationDirection>,
    listeners: HistoryListeners,
}

impl<P: HistoryPlatform + 'static> BrowserHistory<P> {
    /// Create the history and start listening for pop events
    pub fn new(platform: P, base_path: impl Into<String>) -> Rc<Self> {
        let history = Rc::new(Self {
            platform,
            base_path: base_path.into(),
            previous: RefCell::new(Location::default()),
            direction: Cell::new(NavigationDirection::Replace),
            listeners: HistoryListeners::new(),
        });
        let initial = history.read_location();
        *history.previous.borrow_mut() = initial;

        let weak = Rc::downgrade(&history);
        history.platform.on_pop(Box::new(move || {
            if let Some(history) = weak.upgrade() {
                history.handle_pop();
            }
        }));

        history
    }

    /// The underlying platform
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The location the application currently shows
    pub fn previous_location(&self) -> Location {
        self.previous.borrow().clone()
    }

    fn read_location(&self) -> Location {
        let address = self.platform.address();
        Location::from_platform(&address.pathname, &address.search, &self.base_path)
    }

    /// React to a platform back/forward navigation
    ///
    /// Normally driven by the callback registered in [`new`](Self::new).
    pub fn handle_pop(&self) {
        let location = self.read_location();
        let previous = self.previous_location();
        if location.equals(&previous, false) {
            return;
        }

        let href = location.href();
        debug_log!("platform pop '{}' -> '{}'", previous.href(), href);

        if !self.listeners.allows(&href) {
            warn_log!(
                "pop to '{}' vetoed, restoring '{}'",
                href,
                previous.href()
            );
            self.platform
                .push(&join_base_path(&self.base_path, &previous.href()));
            return;
        }

        *self.previous.borrow_mut() = location.clone();
        self.direction.set(NavigationDirection::Back);
        self.listeners.notify(&location);
    }
}

impl<P: HistoryPlatform> History for BrowserHistory<P> {
    fn kind(&self) -> HistoryKind {
        HistoryKind::Browser
    }

    fn base_path(&self) -> &str {
        &self.base_path
    }

    fn top(&self) -> Location {
        let address = self.platform.address();
        Location::from_platform(&address.pathname, &address.search, &self.base_path)
    }

    fn navigate(&self, to: &str, options: NavigateOptions) -> Result<NavigationResult> {
        ensure_absolute(to)?;

        let location = Location::from_href(to);
        let href = location.href();
        debug_log!(
            "browser navigate -> '{}' (replace: {}, force: {})",
            href,
            options.replace,
            options.force
        );

        if !options.force && !self.listeners.allows(&href) {
            return Ok(NavigationResult::Vetoed { to: href });
        }

        let url = join_base_path(&self.base_path, &href);
        if options.replace {
            self.platform.replace(&url);
            self.direction.set(NavigationDirection::Replace);
        } else {
            self.platform.push(&url);
            self.direction.set(NavigationDirection::Forward);
        }

        *self.previous.borrow_mut() = location.clone();
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
        self.platform.go(-1);
        None
    }

    fn forward(&self) -> Option<NavigationResult> {
        self.platform.go(1);
        None
    }

    fn last_direction(&self) -> NavigationDirection {
        self.direction.get()
    }
}

impl<P: HistoryPlatform> std::fmt::Debug for BrowserHistory<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserHistory")
            .field("base_path", &self.base_path)
            .field("previous", &self.previous.borrow().href())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WebPlatform
// ============================================================================

#[cfg(feature = "web")]
pub use web::WebPlatform;

#[cfg(feature = "web")]
mod web {
    use super::{HistoryPlatform, PlatformAddress};
    use crate::error_log;
    use std::cell::RefCell;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};

    type PopHandler = Closure<dyn FnMut(web_sys::Event)>;

    /// [`HistoryPlatform`] over the browser's `window.history` and `popstate`
    pub struct WebPlatform {
        window: web_sys::Window,
        handlers: RefCell<Vec<PopHandler>>,
    }

    impl WebPlatform {
        /// Bind to the global window; `None` outside a browser
        pub fn new() -> Option<Self> {
            web_sys::window().map(|window| Self {
                window,
                handlers: RefCell::new(Vec::new()),
            })
        }

        fn history(&self) -> Option<web_sys::History> {
            match self.window.history() {
                Ok(history) => Some(history),
                Err(err) => {
                    error_log!("window.history unavailable: {:?}", err);
                    None
                }
            }
        }
    }

    impl HistoryPlatform for WebPlatform {
        fn address(&self) -> PlatformAddress {
            let location = self.window.location();
            PlatformAddress {
                pathname: location.pathname().unwrap_or_else(|_| "/".to_string()),
                search: location.search().unwrap_or_default(),
            }
        }

        fn push(&self, url: &str) {
            if let Some(history) = self.history() {
                if let Err(err) = history.push_state_with_url(&JsValue::NULL, "", Some(url)) {
                    error_log!("pushState('{}') failed: {:?}", url, err);
                }
            }
        }

        fn replace(&self, url: &str) {
            if let Some(history) = self.history() {
                if let Err(err) = history.replace_state_with_url(&JsValue::NULL, "", Some(url)) {
                    error_log!("replaceState('{}') failed: {:?}", url, err);
                }
            }
        }

        fn go(&self, delta: i32) {
            if let Some(history) = self.history() {
                if let Err(err) = history.go_with_delta(delta) {
                    error_log!("history.go({}) failed: {:?}", delta, err);
                }
            }
        }

        fn on_pop(&self, callback: Box<dyn Fn()>) {
            let handler: PopHandler = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                callback();
            }) as Box<dyn FnMut(web_sys::Event)>);

            if let Err(err) = self
                .window
                .add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
            {
                error_log!("failed to register popstate listener: {:?}", err);
                return;
            }
            self.handlers.borrow_mut().push(handler);
        }
    }

    impl Drop for WebPlatform {
        fn drop(&mut self) {
            for handler in self.handlers.borrow_mut().drain(..) {
                let _ = self.window.remove_event_listener_with_callback(
                    "popstate",
                    handler.as_ref().unchecked_ref(),
                );
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakePlatform;
    use super::*;
    use crate::RouterError;

    #[test]
    fn test_initial_location_strips_base_path() {
        let history = BrowserHistory::new(FakePlatform::at("/app/users?x=1"), "/app");
        assert_eq!(history.kind(), HistoryKind::Browser);
        assert_eq!(history.top().href(), "/users?x=1");
        assert_eq!(history.previous_location().href(), "/users?x=1");
    }

    #[test]
    fn test_navigate_prepends_base_path() {
        let platform = FakePlatform::at("/app");
        let history = BrowserHistory::new(platform.clone(), "/app");

        history.navigate("/users/42", NavigateOptions::push()).unwrap();
        assert_eq!(platform.url(), "/app/users/42");
        assert_eq!(history.top().href(), "/users/42");

        history.navigate("/", NavigateOptions::replace()).unwrap();
        assert_eq!(platform.stack(), vec!["/app", "/app"]);
        assert_eq!(history.last_direction(), NavigationDirection::Replace);
    }

    #[test]
    fn test_relative_navigation_is_rejected() {
        let history = BrowserHistory::new(FakePlatform::at("/"), "");
        assert!(matches!(
            history.navigate("users", NavigateOptions::push()),
            Err(RouterError::RelativeNavigation { .. })
        ));
    }

    #[test]
    fn test_veto_does_not_touch_platform() {
        let platform = FakePlatform::at("/");
        let history = BrowserHistory::new(platform.clone(), "");
        let _guard = history.before_navigate(Rc::new(|_: &str| false));

        let result = history.navigate("/elsewhere", NavigateOptions::push()).unwrap();
        assert!(result.is_vetoed());
        assert_eq!(platform.stack(), vec!["/"]);
    }

    #[test]
    fn test_pop_notifies_listeners() {
        let platform = FakePlatform::at("/");
        let history = BrowserHistory::new(platform.clone(), "");
        history.navigate("/detail", NavigateOptions::push()).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _listen = history.listen(Rc::new(move |location: &Location| {
            sink.borrow_mut().push(location.href());
        }));

        platform.user_back();
        assert_eq!(*seen.borrow(), vec!["/".to_string()]);
        assert_eq!(history.previous_location().href(), "/");
        assert_eq!(history.last_direction(), NavigationDirection::Back);
    }

    #[test]
    fn test_vetoed_pop_restores_previous_location() {
        let platform = FakePlatform::at("/list");
        let history = BrowserHistory::new(platform.clone(), "");
        history.navigate("/list/edit", NavigateOptions::push()).unwrap();

        let notified = Rc::new(Cell::new(false));
        let flag = Rc::clone(&notified);
        let _listen = history.listen(Rc::new(move |_: &Location| flag.set(true)));
        let _guard = history.before_navigate(Rc::new(|to: &str| to != "/list"));

        platform.user_back();

        assert_eq!(platform.url(), "/list/edit");
        assert_eq!(history.top().href(), "/list/edit");
        assert!(!notified.get());
    }

    #[test]
    fn test_back_goes_through_platform() {
        let platform = FakePlatform::at("/");
        let history = BrowserHistory::new(platform.clone(), "");
        history.navigate("/a", NavigateOptions::push()).unwrap();

        assert!(history.back().is_none());
        assert_eq!(history.top().href(), "/");
        assert_eq!(history.previous_location().href(), "/");

        history.forward();
        assert_eq!(history.top().href(), "/a");
    }
}

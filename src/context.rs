//! Router context integration for GPUI
//!
//! The top-level [`RouterProvider`] lives in a gpui global so any view can
//! reach it. Views that render routed content observe the global
//! (`cx.observe_global::<GlobalRouter>`) and re-render on navigation; the
//! [`Navigator`] facade updates the global, which is what triggers those
//! observers.

use crate::error::{NavigationResult, Result};
use crate::history::{History, HistoryRef, NavigateOptions};
use crate::info_log;
use crate::location::Location;
use crate::router::{Router, RouterProvider};
use gpui::{App, BorrowAppContext, Global};

// ============================================================================
// GlobalRouter
// ============================================================================

/// Global router state accessible from any component
pub struct GlobalRouter {
    provider: RouterProvider,
}

impl GlobalRouter {
    pub fn new(history: HistoryRef) -> Self {
        Self {
            provider: RouterProvider::new(history),
        }
    }

    /// Wrap an already configured provider
    pub fn with_provider(provider: RouterProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &RouterProvider {
        &self.provider
    }

    /// Root router for the current render pass
    pub fn root(&self) -> Router {
        self.provider.router()
    }

    pub fn history(&self) -> &HistoryRef {
        self.provider.history()
    }

    pub fn location(&self) -> Location {
        self.provider.location()
    }

    /// Current href
    pub fn current_path(&self) -> String {
        self.provider.location().href()
    }

    /// Navigate to an absolute path or one relative to the root
    pub fn navigate(&mut self, to: &str, options: NavigateOptions) -> Result<NavigationResult> {
        self.root().navigate(to, options)
    }

    pub fn push(&mut self, to: &str) -> Result<NavigationResult> {
        self.navigate(to, NavigateOptions::push())
    }

    pub fn replace(&mut self, to: &str) -> Result<NavigationResult> {
        self.navigate(to, NavigateOptions::replace())
    }

    pub fn back(&mut self) -> Option<NavigationResult> {
        self.provider.history().back()
    }

    pub fn forward(&mut self) -> Option<NavigationResult> {
        self.provider.history().forward()
    }

    /// Promote a pending location when auto-commit is off
    pub fn commit(&mut self) -> bool {
        self.provider.commit()
    }
}

impl std::fmt::Debug for GlobalRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalRouter")
            .field("provider", &self.provider)
            .finish()
    }
}

impl Global for GlobalRouter {}

/// Trait for accessing the global router from context
pub trait UseRouter {
    /// Get reference to global router
    fn router(&self) -> &GlobalRouter;

    /// Update global router
    fn update_router<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalRouter, &mut App) -> R;
}

impl UseRouter for App {
    fn router(&self) -> &GlobalRouter {
        self.global::<GlobalRouter>()
    }

    fn update_router<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalRouter, &mut App) -> R,
    {
        self.update_global(f)
    }
}

/// Install the global router over `history`
///
/// # Example
///
/// ```ignore
/// use gpui_claim_router::{init_router, MemoryHistory};
///
/// Application::new().run(|cx| {
///     init_router(cx, MemoryHistory::new("/").into_ref());
/// });
/// ```
pub fn init_router(cx: &mut App, history: HistoryRef) {
    info_log!("router initialized at '{}'", history.top().href());
    cx.set_global(GlobalRouter::new(history));
}

/// Navigation API over the global router
///
/// Works with any context that has access to App (`Context<V>`, `App`, etc.)
///
/// ```ignore
/// use gpui_claim_router::Navigator;
///
/// Navigator::push(cx, "/users/123")?;
/// Navigator::pop(cx);
/// Navigator::replace(cx, "/login")?;
/// ```
pub struct Navigator;

impl Navigator {
    /// Navigate to a new path
    pub fn push(cx: &mut impl BorrowAppContext, to: &str) -> Result<NavigationResult> {
        cx.update_global::<GlobalRouter, _>(|router, _| router.push(to))
    }

    /// Replace current path without adding to history
    pub fn replace(cx: &mut impl BorrowAppContext, to: &str) -> Result<NavigationResult> {
        cx.update_global::<GlobalRouter, _>(|router, _| router.replace(to))
    }

    /// Navigate with explicit options
    pub fn navigate(
        cx: &mut impl BorrowAppContext,
        to: &str,
        options: NavigateOptions,
    ) -> Result<NavigationResult> {
        cx.update_global::<GlobalRouter, _>(|router, _| router.navigate(to, options))
    }

    /// Go back to the previous location
    ///
    /// Platform-backed histories report the result through listeners and
    /// return `None` here.
    pub fn pop(cx: &mut impl BorrowAppContext) -> Option<NavigationResult> {
        cx.update_global::<GlobalRouter, _>(|router, _| router.back())
    }

    /// Go forward in history
    pub fn forward(cx: &mut impl BorrowAppContext) -> Option<NavigationResult> {
        cx.update_global::<GlobalRouter, _>(|router, _| router.forward())
    }

    /// Get current path
    pub fn current_path(cx: &App) -> String {
        cx.global::<GlobalRouter>().current_path()
    }

    /// Resolve `path` against the root router
    pub fn link_to(cx: &App, path: &str) -> String {
        cx.global::<GlobalRouter>().root().link_to(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;
    use crate::RouterError;
    use gpui::TestAppContext;

    fn init(cx: &mut TestAppContext, initial: &str) {
        let history = MemoryHistory::new(initial).into_ref();
        cx.update(|cx| init_router(cx, history));
    }

    #[gpui::test]
    fn test_nav_push(cx: &mut TestAppContext) {
        init(cx, "/");
        assert_eq!(cx.read(Navigator::current_path), "/");

        cx.update(|cx| {
            Navigator::push(cx, "/users").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/users");

        cx.update(|cx| {
            Navigator::push(cx, "/users/123").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/users/123");
    }

    #[gpui::test]
    fn test_nav_back_forward(cx: &mut TestAppContext) {
        init(cx, "/");
        cx.update(|cx| {
            Navigator::push(cx, "/page1").unwrap();
            Navigator::push(cx, "/page2").unwrap();
        });

        let popped = cx.update(|cx| Navigator::pop(cx));
        assert!(popped.is_some_and(|result| result.is_navigated()));
        assert_eq!(cx.read(Navigator::current_path), "/page1");

        cx.update(|cx| {
            Navigator::forward(cx);
        });
        assert_eq!(cx.read(Navigator::current_path), "/page2");
    }

    #[gpui::test]
    fn test_nav_replace(cx: &mut TestAppContext) {
        init(cx, "/");
        cx.update(|cx| {
            Navigator::push(cx, "/login").unwrap();
            Navigator::replace(cx, "/home").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/home");

        cx.update(|cx| {
            Navigator::pop(cx);
        });
        assert_eq!(cx.read(Navigator::current_path), "/");
    }

    #[gpui::test]
    fn test_nav_relative_resolves_against_root(cx: &mut TestAppContext) {
        init(cx, "/users");
        cx.update(|cx| {
            Navigator::push(cx, "42").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/42");
        assert_eq!(cx.read(|cx| Navigator::link_to(cx, "?q=1")), "/?q=1");
    }

    #[gpui::test]
    fn test_nav_vetoed(cx: &mut TestAppContext) {
        init(cx, "/form");
        let guard = cx.update(|cx| cx.router().history().on_before_navigate(|_| false));

        let result = cx.update(|cx| Navigator::push(cx, "/away")).unwrap();
        assert!(result.is_vetoed());
        assert_eq!(cx.read(Navigator::current_path), "/form");

        drop(guard);
        cx.update(|cx| {
            Navigator::push(cx, "/away").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/away");
    }

    #[gpui::test]
    fn test_root_router_reflects_navigation(cx: &mut TestAppContext) {
        init(cx, "/");
        cx.update(|cx| {
            Navigator::push(cx, "/app/users/42").unwrap();
        });

        let root = cx.read(|cx| cx.router().root());
        let app = root.location().claim("app").unwrap();
        assert_eq!(app.unclaimed_path(), "users/42");
    }

    #[gpui::test]
    fn test_manual_commit(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/").into_ref();
        cx.update(|cx| {
            let provider = RouterProvider::new(history).with_auto_commit(false);
            cx.set_global(GlobalRouter::with_provider(provider));
        });

        cx.update(|cx| {
            Navigator::push(cx, "/next").unwrap();
        });
        assert_eq!(cx.read(Navigator::current_path), "/");
        assert!(cx.read(|cx| cx.router().root().is_pending()));

        assert!(cx.update(|cx| cx.update_router(|router, _| router.commit())));
        assert_eq!(cx.read(Navigator::current_path), "/next");
    }

    #[gpui::test]
    fn test_relative_error_surfaces(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/").into_ref();
        cx.update(|cx| init_router(cx, history.clone()));
        let err = history
            .navigate("relative", NavigateOptions::push())
            .unwrap_err();
        assert!(matches!(err, RouterError::RelativeNavigation { .. }));
    }
}

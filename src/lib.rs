//! # GPUI Claim Router
//!
//! A client-side router built around *claiming* path segments:
//!
//! - **Location** - Immutable path/query/hash value with a claim index
//! - **History** - In-memory and browser-backed stacks with listeners and guards
//! - **Switch** - Picks the most specific route and hands it the remainder
//! - **Tabs** - Keeps every visited tab alive and remembers where each one was
//! - **NavStack** - Turns a location into a stack of screens with timed exits
//! - **Back swipe** - Edge gesture recognizer for stacked navigation
//!
//! Each layer claims the segments it understands and passes a child
//! [`Router`] down, so a component only ever sees the part of the path that
//! is left for it.
//!
//! # Quick Start
//!
//! ```
//! use gpui_claim_router::{
//!     History, Location, MemoryHistory, NavigateOptions, Resolution, Route, Router, Switch,
//! };
//!
//! let history = MemoryHistory::new("/users/42/edit").into_ref();
//! let router = Router::root(history);
//!
//! let switch = Switch::new()
//!     .route(Route::new("users/:id", "user"))
//!     .route(Route::new("settings", "settings"));
//!
//! let Resolution::Matched { index, location } = switch.resolve(&router).current else {
//!     panic!("no match");
//! };
//! assert_eq!(index, 0);
//! assert_eq!(location.unclaimed_path(), "edit");
//!
//! router.navigate("/settings", NavigateOptions::push()).unwrap();
//! assert_eq!(router.history().top(), Location::from_href("/settings"));
//! ```
//!
//! # Navigation
//!
//! With the `gpui` feature the root router lives in a gpui global:
//!
//! ```ignore
//! use gpui_claim_router::{init_router, MemoryHistory, Navigator};
//!
//! init_router(cx, MemoryHistory::new("/").into_ref());
//!
//! Navigator::push(cx, "/profile")?;
//! Navigator::replace(cx, "/login")?;
//! Navigator::pop(cx);
//! ```
//!
//! # Feature Flags
//!
//! - `gpui` (default) - Global router, `Navigator` and routed elements
//! - `web` - `WebPlatform` backed by `window.history`
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)

#![doc(html_root_url = "https://docs.rs/gpui-claim-router/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Error handling
pub mod error;

// Paths and locations
pub mod location;
pub mod params;
pub mod pattern;

// History
pub mod browser;
pub mod guard;
pub mod history;
pub mod subscription;

// Matching
pub mod nav_stack;
pub mod router;
pub mod switch;
pub mod tabs;

// Presentation
pub mod gesture;
pub mod transition;

// GPUI integration
#[cfg(feature = "gpui")]
mod context;
#[cfg(feature = "gpui")]
pub mod widgets;

// Re-export main types for convenient access
#[cfg(feature = "web")]
pub use browser::WebPlatform;
pub use browser::{BrowserHistory, HistoryPlatform, PlatformAddress};
#[cfg(feature = "gpui")]
pub use context::{init_router, GlobalRouter, Navigator, UseRouter};
pub use error::{NavigationResult, Result, RouterError};
pub use gesture::{BackSwipe, SwipeConfig, SwipeOutcome, SwipeUpdate};
pub use guard::NavigationBlocker;
pub use history::{History, HistoryKind, HistoryRef, MemoryHistory, NavigateOptions};
pub use location::Location;
pub use nav_stack::{
    stack_entries, NavStack, NavStackConfig, Phase, StackDiff, StackEntry, StackItem,
};
pub use params::{QueryParams, RouteParams};
pub use pattern::{validate_route_path, PathPattern, Segment};
pub use router::{Router, RouterProvider};
pub use subscription::Subscription;
pub use switch::{Resolution, Route, Switch, SwitchOutcome};
pub use tabs::{Tab, TabPane, Tabs, TabsResolution};
#[cfg(feature = "gpui")]
pub use transition::apply_transition;
pub use transition::{
    Platform, SlideDirection, Transition, TransitionFrame, TransitionPhase,
};
#[cfg(feature = "gpui")]
pub use widgets::{
    render_fn, switch_element, tabs_element, NavStackView, RenderFn, RouterLink,
};

/// Navigation direction indicator.
///
/// Used to determine the direction of navigation for animations and history management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    /// Navigating forward to a new route
    Forward,
    /// Navigating back in history
    Back,
    /// Replacing the current route without affecting history direction
    Replace,
}

//! gpui elements for routed content
//!
//! These builders turn [`Switch`], [`Tabs`] and [`NavStack`] resolutions into
//! elements. Routers are passed explicitly: each builder gets the router of
//! its layer and hands a child router to the render function it picks.
//!
//! Redirects are never performed during render. They are deferred to the end
//! of the current effect cycle. They go through the global router when it
//! drives the same history, so views observing it re-render; any other
//! history is navigated directly and the windows are refreshed.

use crate::context::GlobalRouter;
use crate::gesture::{BackSwipe, SwipeConfig, SwipeOutcome, SwipeUpdate};
use crate::history::{History, HistoryRef, NavigateOptions};
use crate::nav_stack::{stack_entries, NavStack, NavStackConfig, Phase};
use crate::router::Router;
use crate::switch::{Resolution, Switch};
use crate::tabs::{TabPane, Tabs};
use crate::transition::{apply_easing, apply_transition, Transition, TransitionPhase};
use crate::{debug_log, error_log, trace_log};
use gpui::{
    BorrowAppContext,
    canvas, div, px, Animation, AnimationExt, AnyElement, App, Context, Div, InteractiveElement,
    IntoElement, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, ParentElement, Pixels,
    Point, Render, SharedString, Styled, Window,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Render function for a route, tab or stack screen
pub type RenderFn = Rc<dyn Fn(&Router, &mut Window, &mut App) -> AnyElement>;

/// Box a closure as a [`RenderFn`]
pub fn render_fn(f: impl Fn(&Router, &mut Window, &mut App) -> AnyElement + 'static) -> RenderFn {
    Rc::new(f)
}

/// Navigate after the current effect cycle
pub(crate) fn navigate_deferred(
    history: &HistoryRef,
    to: String,
    options: NavigateOptions,
    cx: &mut App,
) {
    let history = Rc::clone(history);
    cx.defer(move |cx| navigate_now(&history, &to, options, cx));
}

fn same_history(a: &HistoryRef, b: &HistoryRef) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// Navigate `history`, through the global router when it drives that history
fn navigate_now(history: &HistoryRef, to: &str, options: NavigateOptions, cx: &mut App) {
    let global = cx
        .try_global::<GlobalRouter>()
        .is_some_and(|router| same_history(router.history(), history));
    let result = if global {
        cx.update_global::<GlobalRouter, _>(|router, _| router.navigate(to, options))
    } else {
        let result = history.navigate(to, options);
        cx.refresh_windows();
        result
    };
    if let Err(err) = result {
        error_log!("navigation to '{}' failed: {}", to, err);
    }
}

// ============================================================================
// Switch
// ============================================================================

/// Render the route `switch` selects for `router`
///
/// A redirect renders nothing and replaces the location once the frame is
/// done; an empty resolution renders nothing.
pub fn switch_element(
    switch: &Switch<RenderFn>,
    router: &Router,
    window: &mut Window,
    cx: &mut App,
) -> AnyElement {
    let outcome = switch.resolve(router);
    match &outcome.current {
        Resolution::Redirect { to, .. } => {
            debug_log!("switch redirect -> '{}'", to.href());
            navigate_deferred(router.history(), to.href(), NavigateOptions::replace(), cx);
            div().into_any_element()
        }
        Resolution::Empty => div().into_any_element(),
        Resolution::Matched { index, .. } => {
            let (Some(route), Some(child)) = (switch.get(*index), outcome.child_router(router))
            else {
                return div().into_any_element();
            };
            let render = Rc::clone(route.render());
            render(&child, window, cx)
        }
    }
}

// ============================================================================
// Tabs
// ============================================================================

/// Render every visited tab, showing only the active one
///
/// The caller owns `tabs` so that tab memory survives re-renders.
pub fn tabs_element(
    tabs: &mut Tabs<RenderFn>,
    router: &Router,
    window: &mut Window,
    cx: &mut App,
) -> AnyElement {
    let Some(resolution) = tabs.resolve(router.location()) else {
        return div().into_any_element();
    };
    if let Some(to) = &resolution.redirect {
        navigate_deferred(router.history(), to.href(), NavigateOptions::replace(), cx);
    }
    let next = tabs.resolve_next(router.next_location());

    let mut container = div().relative().size_full();
    for (index, pane) in resolution.panes.iter().enumerate() {
        let (Some(location), Some(tab)) = (pane.location(), tabs.tabs().get(index)) else {
            continue;
        };
        let next_location = match (&next, pane) {
            (Some((next_index, next_location)), TabPane::Active(_)) if *next_index == index => {
                next_location.clone()
            }
            _ => location.clone(),
        };

        let child = router.child(location.clone(), next_location);
        let render = Rc::clone(tab.render());
        let layer = div()
            .absolute()
            .top_0()
            .left_0()
            .size_full()
            .child(render(&child, window, cx));
        container = container.child(if pane.is_hidden() {
            layer.invisible()
        } else {
            layer
        });
    }
    container.into_any_element()
}

// ============================================================================
// NavStack
// ============================================================================

#[derive(Clone)]
struct Screen {
    route: usize,
    router: Router,
}

/// Mouse sessions use a single pointer id
const MOUSE_POINTER: u64 = 0;

/// Window-space origin and width of a laid out container
type AreaCell = Rc<Cell<Option<(Point<Pixels>, f32)>>>;

/// Navigation stack view with animated transitions and back-swipe
pub struct NavStackView {
    switch: Switch<RenderFn>,
    stack: NavStack<Screen>,
    swipe: BackSwipe,
    router: Option<Router>,
    /// Recorded at prepaint; pointer positions are made relative to it
    area: AreaCell,
}

impl NavStackView {
    /// Create the view; it re-renders whenever the global router changes
    pub fn new(
        switch: Switch<RenderFn>,
        config: NavStackConfig,
        cx: &mut Context<'_, Self>,
    ) -> Self {
        if cx.has_global::<GlobalRouter>() {
            cx.observe_global::<GlobalRouter>(|_, cx| cx.notify()).detach();
        }
        Self {
            switch,
            stack: NavStack::new(config),
            swipe: BackSwipe::new(SwipeConfig::default()),
            router: None,
            area: Rc::new(Cell::new(None)),
        }
    }

    pub fn with_swipe(mut self, config: SwipeConfig) -> Self {
        self.swipe = BackSwipe::new(config);
        self
    }

    /// Render under `router` instead of the global root router
    pub fn set_router(&mut self, router: Router) {
        self.router = Some(router);
    }

    /// Key of the screen a back gesture would return to
    pub fn back_target(&self) -> Option<&str> {
        self.stack.back_target()
    }

    fn current_router(&self, cx: &App) -> Option<Router> {
        match &self.router {
            Some(router) => Some(router.clone()),
            None => cx.try_global::<GlobalRouter>().map(GlobalRouter::root),
        }
    }

    /// Reconcile the stack with the screens `router` resolves to
    fn sync_stack(&mut self, router: &Router, now: Instant, cx: &mut App) {
        let entries = stack_entries(&self.switch, router.location());
        if entries.is_empty() {
            let resolution = self.switch.resolve_location(router.location());
            if let Resolution::Redirect { to, .. } = resolution {
                navigate_deferred(router.history(), to.href(), NavigateOptions::replace(), cx);
            }
        }
        self.stack.reconcile(
            entries.into_iter().map(|entry| {
                let screen = Screen {
                    route: entry.route,
                    router: router.child(entry.location.clone(), entry.location),
                };
                (entry.key, screen)
            }),
            now,
        );
    }

    fn local(&self, position: Point<Pixels>) -> (f32, f32) {
        let (x, y) = (f32::from(position.x), f32::from(position.y));
        match self.area.get() {
            Some((origin, _)) => (x - f32::from(origin.x), y - f32::from(origin.y)),
            None => (x, y),
        }
    }

    fn swipe_down(&mut self, position: Point<Pixels>) -> bool {
        let (x, y) = self.local(position);
        let back = self.stack.back_target().map(str::to_string);
        self.swipe.pointer_down(MOUSE_POINTER, x, y, back.as_deref())
    }

    /// A move without the button held means the release was lost
    fn swipe_move(&mut self, position: Point<Pixels>, pressed: bool, cx: &mut Context<'_, Self>) {
        if !pressed {
            if self.swipe.owns(MOUSE_POINTER) {
                trace_log!("back swipe session lost its release");
                let outcome = self.swipe.cancel(MOUSE_POINTER);
                self.finish_swipe(outcome, cx);
            }
            return;
        }
        let (x, y) = self.local(position);
        let update = self.swipe.pointer_move(MOUSE_POINTER, x, y);
        if matches!(update, SwipeUpdate::Claimed { .. } | SwipeUpdate::Progress(_)) {
            cx.notify();
        }
    }

    fn swipe_release(&mut self, cx: &mut Context<'_, Self>) {
        let outcome = self.swipe.pointer_up(MOUSE_POINTER);
        self.finish_swipe(outcome, cx);
    }

    fn finish_swipe(&mut self, outcome: SwipeOutcome, cx: &mut Context<'_, Self>) {
        match outcome {
            SwipeOutcome::Completed { target } => {
                if let Some(router) = self.current_router(cx) {
                    navigate_now(router.history(), &target, NavigateOptions::push(), cx);
                }
                cx.notify();
            }
            SwipeOutcome::Cancelled => cx.notify(),
            SwipeOutcome::None => {}
        }
    }
}

fn animate_layer(
    layer: Div,
    id: SharedString,
    transition: Transition,
    phase: TransitionPhase,
    duration: Duration,
) -> AnyElement {
    if transition.is_none() || duration.is_zero() {
        return layer.into_any_element();
    }
    layer
        .with_animation(id, Animation::new(duration), move |this, delta| {
            apply_transition(this, &transition, phase, apply_easing(delta))
        })
        .into_any_element()
}

impl Render for NavStackView {
    fn render(&mut self, window: &mut Window, cx: &mut Context<'_, Self>) -> impl IntoElement {
        let Some(router) = self.current_router(cx) else {
            return div().into_any_element();
        };

        let now = Instant::now();
        self.stack.on_timer(now);

        self.sync_stack(&router, now, cx);

        let animating = self.stack.next_deadline().is_some();
        if animating {
            window.request_animation_frame();
        }

        let width = match self.area.get() {
            Some((_, width)) if width > 0.0 => width,
            _ => f32::from(window.viewport_size().width),
        };
        self.swipe.set_width(width);
        let dragging = self.swipe.is_dragging();
        let drag_offset = self.swipe.progress() * width;
        let config = *self.stack.config();
        trace_log!(
            "nav stack render: {} items, animating: {}, dragging: {}",
            self.stack.len(),
            animating,
            dragging
        );

        let area = Rc::clone(&self.area);
        let mut container = div().relative().size_full().overflow_hidden().child(
            canvas(
                move |bounds, _, _| area.set(Some((bounds.origin, f32::from(bounds.size.width)))),
                |_, _, _, _| {},
            )
            .absolute()
            .size_full(),
        );
        for (index, item) in self.stack.items().iter().enumerate() {
            let Some(route) = self.switch.get(item.value().route) else {
                continue;
            };
            let render = Rc::clone(route.render());
            let content = render(&item.value().router, window, cx);
            let hidden = self.stack.is_hidden(index);

            let mut layer = div().absolute().top_0().left_0().size_full().child(content);
            if hidden && !animating && !dragging {
                layer = layer.invisible();
            }

            let layer = match item.phase() {
                Phase::Entering { .. } => animate_layer(
                    layer,
                    SharedString::from(format!("nav-stack-enter-{}", item.key())),
                    config.transition,
                    TransitionPhase::Enter,
                    config.enter,
                ),
                Phase::Exiting { .. } => animate_layer(
                    layer,
                    SharedString::from(format!("nav-stack-exit-{}", item.key())),
                    config.transition,
                    TransitionPhase::Exit,
                    config.exit,
                ),
                Phase::Active if dragging && !hidden => {
                    layer.left(px(drag_offset)).into_any_element()
                }
                Phase::Active => layer.into_any_element(),
            };
            container = container.child(layer);
        }

        container
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, event: &MouseDownEvent, _window, _cx| {
                    this.swipe_down(event.position);
                }),
            )
            .on_mouse_move(cx.listener(|this, event: &MouseMoveEvent, _window, cx| {
                let pressed = event.pressed_button == Some(MouseButton::Left);
                this.swipe_move(event.position, pressed, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _event: &MouseUpEvent, _window, cx| this.swipe_release(cx)),
            )
            .on_mouse_up_out(
                MouseButton::Left,
                cx.listener(|this, _event: &MouseUpEvent, _window, cx| this.swipe_release(cx)),
            )
            .into_any_element()
    }
}

// ============================================================================
// RouterLink
// ============================================================================

/// Clickable link resolved against a router
///
/// Relative paths resolve against the router's claimed location, so the same
/// link works at any nesting depth.
pub struct RouterLink {
    path: SharedString,
    options: NavigateOptions,
    active_style: Option<Box<dyn Fn(Div) -> Div>>,
    children: Vec<AnyElement>,
}

impl RouterLink {
    pub fn new(path: impl Into<SharedString>) -> Self {
        Self {
            path: path.into(),
            options: NavigateOptions::push(),
            active_style: None,
            children: Vec::new(),
        }
    }

    /// Replace the current entry instead of pushing
    pub fn replace(mut self) -> Self {
        self.options = NavigateOptions::replace();
        self
    }

    pub fn child(mut self, child: impl IntoElement) -> Self {
        self.children.push(child.into_any_element());
        self
    }

    /// Styling applied when the link points at the current location
    pub fn active_style(mut self, style: impl Fn(Div) -> Div + 'static) -> Self {
        self.active_style = Some(Box::new(style));
        self
    }

    /// Absolute href this link navigates to under `router`
    pub fn href(&self, router: &Router) -> String {
        router.link_to(&self.path)
    }

    pub fn build<V: 'static>(self, router: &Router, cx: &mut Context<'_, V>) -> Div {
        let href = self.href(router);
        let is_active = router.location().href() == href;
        let history = Rc::clone(router.history());
        let options = self.options;

        let mut link = div().cursor_pointer().on_mouse_down(
            MouseButton::Left,
            cx.listener(move |_view, _event: &MouseDownEvent, _window, cx| {
                navigate_now(&history, &href, options, cx);
            }),
        );

        if is_active {
            if let Some(style) = self.active_style {
                link = style(link);
            }
        }

        for child in self.children {
            link = link.child(child);
        }
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{init_router, Navigator};
    use crate::history::MemoryHistory;
    use crate::location::Location;
    use crate::switch::Route;
    use gpui::{point, AppContext, Entity, TestAppContext};

    /// Stack of `/` and `/users`, laid out 100px right of the window edge
    fn users_stack(cx: &mut TestAppContext, history: &HistoryRef) -> Entity<NavStackView> {
        let screen = render_fn(|_, _, _| div().into_any_element());
        let switch = Switch::new()
            .route(Route::root(Rc::clone(&screen)))
            .route(Route::new("users", screen));
        let router = Router::root(Rc::clone(history));
        cx.new(|cx| {
            let mut view = NavStackView::new(switch, NavStackConfig::default(), cx);
            view.sync_stack(&router, Instant::now(), cx);
            view.set_router(router);
            view.swipe.set_width(200.0);
            view.area.set(Some((point(px(100.0), px(0.0)), 200.0)));
            view
        })
    }

    #[gpui::test]
    fn test_redirect_is_deferred(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/nowhere").into_ref();
        cx.update(|cx| init_router(cx, Rc::clone(&history)));

        cx.update(|cx| {
            navigate_deferred(&history, "/home".to_string(), NavigateOptions::replace(), cx);
            assert_eq!(history.top().href(), "/nowhere");
        });
        cx.run_until_parked();

        assert_eq!(cx.read(Navigator::current_path), "/home");
    }

    #[gpui::test]
    fn test_navigation_without_global_router(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/").into_ref();
        cx.update(|cx| {
            navigate_now(&history, "/direct", NavigateOptions::push(), cx);
        });
        assert_eq!(history.top().href(), "/direct");
    }

    #[gpui::test]
    fn test_navigation_targets_the_given_history(cx: &mut TestAppContext) {
        let global = MemoryHistory::new("/a").into_ref();
        let other = MemoryHistory::new("/").into_ref();
        cx.update(|cx| init_router(cx, Rc::clone(&global)));

        cx.update(|cx| navigate_now(&other, "/b", NavigateOptions::push(), cx));
        assert_eq!(other.top().href(), "/b");
        assert_eq!(cx.read(Navigator::current_path), "/a");

        cx.update(|cx| navigate_now(&global, "/c", NavigateOptions::push(), cx));
        assert_eq!(cx.read(Navigator::current_path), "/c");
        assert_eq!(other.top().href(), "/b");
    }

    #[gpui::test]
    fn test_back_swipe_uses_container_coordinates(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/users").into_ref();
        let view = users_stack(cx, &history);

        view.update(cx, |view, cx| {
            assert_eq!(view.back_target(), Some("/"));
            // Inside the window edge but left of the stack
            assert!(!view.swipe_down(point(px(5.0), px(50.0))));
            assert!(view.swipe_down(point(px(105.0), px(50.0))));
            view.swipe_move(point(px(205.0), px(50.0)), true, cx);
            assert!(view.swipe.is_dragging());
            assert_eq!(view.swipe.progress(), 0.5);
            view.swipe_release(cx);
        });

        assert_eq!(history.top().href(), "/");
    }

    #[gpui::test]
    fn test_lost_release_ends_back_swipe(cx: &mut TestAppContext) {
        let history = MemoryHistory::new("/users").into_ref();
        let view = users_stack(cx, &history);

        view.update(cx, |view, cx| {
            assert!(view.swipe_down(point(px(105.0), px(50.0))));
            view.swipe_move(point(px(205.0), px(50.0)), true, cx);
            assert!(view.swipe.is_dragging());

            // Released outside the stack; the next move has no button held
            view.swipe_move(point(px(400.0), px(50.0)), false, cx);
            assert!(!view.swipe.owns(MOUSE_POINTER));
            assert!(view.swipe_down(point(px(105.0), px(50.0))));
        });

        assert_eq!(history.top().href(), "/users");
    }

    #[test]
    fn test_router_link_href() {
        let history = MemoryHistory::new("/app/users").into_ref();
        let root = Router::root(history);
        let app = root.location().claim("app").unwrap();
        let router = root.child(app.clone(), app);

        assert_eq!(RouterLink::new("settings").href(&router), "/app/settings");
        assert_eq!(RouterLink::new("..").href(&router), "/");
        assert_eq!(RouterLink::new("/abs").href(&router), "/abs");
        assert_eq!(
            Location::from_href(&RouterLink::new("?q=1").href(&router)).search(),
            "?q=1"
        );
    }
}

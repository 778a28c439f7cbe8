//! Edge back-swipe recognizer
//!
//! [`BackSwipe`] follows one pointer at a time. A session starts only on a
//! press inside the leading edge while a back target exists. Once horizontal
//! movement passes the touch slop the session claims the drag; mostly vertical
//! movement hands it over to scrolling instead. Either way the session owns
//! the pointer until release, so one press is never read as two gestures.
//!
//! Releasing a claimed drag past the completion ratio completes the swipe;
//! anything shorter cancels it and nothing navigates.

use crate::{debug_log, trace_log};

/// Thresholds for the back-swipe recognizer, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    /// Presses further than this from the leading edge are ignored
    pub edge_width: f32,
    /// Movement needed before a press is claimed or rejected
    pub touch_slop: f32,
    /// Fraction of `width` a drag must cover to complete
    pub completion_ratio: f32,
    /// Width of the swipeable area
    pub width: f32,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            edge_width: 24.0,
            touch_slop: 8.0,
            completion_ratio: 0.35,
            width: 390.0,
        }
    }
}

impl SwipeConfig {
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Session {
    Idle,
    /// Pressed on the edge, not yet claimed
    Tracking {
        pointer: u64,
        start_x: f32,
        start_y: f32,
        target: String,
    },
    /// Claimed as a back swipe
    Dragging {
        pointer: u64,
        start_x: f32,
        progress: f32,
        target: String,
    },
    /// Given up to scrolling; held until release
    Rejected { pointer: u64 },
}

impl Session {
    fn pointer(&self) -> Option<u64> {
        match self {
            Session::Idle => None,
            Session::Tracking { pointer, .. }
            | Session::Dragging { pointer, .. }
            | Session::Rejected { pointer } => Some(*pointer),
        }
    }
}

/// Result of a pointer move
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeUpdate {
    /// Not this recognizer's pointer, or no session
    Ignored,
    /// Pressed on the edge but below the slop
    Pending,
    /// This move claimed the drag
    Claimed { progress: f32 },
    /// Claimed drag moved
    Progress(f32),
    /// Handed over to scrolling
    Rejected,
}

/// Result of a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Nothing to do
    None,
    /// Navigate back to `target`
    Completed { target: String },
    /// A claimed drag ended short of the threshold
    Cancelled,
}

/// Back-swipe gesture recognizer
#[derive(Debug, Clone)]
pub struct BackSwipe {
    config: SwipeConfig,
    session: Session,
}

impl Default for BackSwipe {
    fn default() -> Self {
        Self::new(SwipeConfig::default())
    }
}

impl BackSwipe {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            session: Session::Idle,
        }
    }

    pub fn config(&self) -> &SwipeConfig {
        &self.config
    }

    pub fn set_width(&mut self, width: f32) {
        self.config.width = width;
    }

    /// True while `pointer` belongs to the current session
    pub fn owns(&self, pointer: u64) -> bool {
        self.session.pointer() == Some(pointer)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.session, Session::Dragging { .. })
    }

    /// Progress of a claimed drag, 0.0 otherwise
    pub fn progress(&self) -> f32 {
        match self.session {
            Session::Dragging { progress, .. } => progress,
            _ => 0.0,
        }
    }

    /// Start a session; returns `false` when the press is not eligible
    pub fn pointer_down(
        &mut self,
        pointer: u64,
        x: f32,
        y: f32,
        back_target: Option<&str>,
    ) -> bool {
        if self.session != Session::Idle {
            trace_log!("pointer {} ignored, session already active", pointer);
            return false;
        }
        let Some(target) = back_target else {
            return false;
        };
        if !(0.0..=self.config.edge_width).contains(&x) {
            return false;
        }

        self.session = Session::Tracking {
            pointer,
            start_x: x,
            start_y: y,
            target: target.to_string(),
        };
        true
    }

    pub fn pointer_move(&mut self, pointer: u64, x: f32, y: f32) -> SwipeUpdate {
        if !self.owns(pointer) {
            return SwipeUpdate::Ignored;
        }

        match &mut self.session {
            Session::Idle => SwipeUpdate::Ignored,
            Session::Rejected { .. } => SwipeUpdate::Rejected,
            Session::Dragging {
                start_x, progress, ..
            } => {
                *progress = Self::progress_for(&self.config, x - *start_x);
                SwipeUpdate::Progress(*progress)
            }
            Session::Tracking {
                start_x,
                start_y,
                target,
                ..
            } => {
                let dx = x - *start_x;
                let dy = y - *start_y;
                let slop = self.config.touch_slop;

                if (dy.abs() > slop && dy.abs() > dx.abs()) || dx < -slop {
                    trace_log!("pointer {} rejected as scroll", pointer);
                    self.session = Session::Rejected { pointer };
                    return SwipeUpdate::Rejected;
                }
                if dx <= slop {
                    return SwipeUpdate::Pending;
                }

                let progress = Self::progress_for(&self.config, dx);
                debug_log!("back swipe claimed by pointer {} towards '{}'", pointer, target);
                self.session = Session::Dragging {
                    pointer,
                    start_x: *start_x,
                    progress,
                    target: std::mem::take(target),
                };
                SwipeUpdate::Claimed { progress }
            }
        }
    }

    pub fn pointer_up(&mut self, pointer: u64) -> SwipeOutcome {
        if !self.owns(pointer) {
            return SwipeOutcome::None;
        }

        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Dragging {
                progress, target, ..
            } => {
                if progress >= self.config.completion_ratio {
                    debug_log!("back swipe completed at {:.2}", progress);
                    SwipeOutcome::Completed { target }
                } else {
                    debug_log!("back swipe cancelled at {:.2}", progress);
                    SwipeOutcome::Cancelled
                }
            }
            _ => SwipeOutcome::None,
        }
    }

    /// Abort the session for `pointer` (e.g. the platform cancelled it)
    pub fn cancel(&mut self, pointer: u64) -> SwipeOutcome {
        if !self.owns(pointer) {
            return SwipeOutcome::None;
        }
        let was_dragging = self.is_dragging();
        self.session = Session::Idle;
        if was_dragging {
            SwipeOutcome::Cancelled
        } else {
            SwipeOutcome::None
        }
    }

    fn progress_for(config: &SwipeConfig, dx: f32) -> f32 {
        if config.width <= 0.0 {
            return 0.0;
        }
        (dx / config.width).clamp(0.0, 1.0)
    }
}

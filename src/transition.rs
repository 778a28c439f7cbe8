//! Screen transition animations
//!
//! A [`Transition`] describes how a navigation stack item enters. Exiting
//! items play the same transition backwards, so a screen that slid in from
//! the right slides back out to the right.
//!
//! [`Transition::frame`] computes the visual state for a given progress
//! without touching the UI layer; `apply_transition` (feature `gpui`) applies
//! a frame to a styled element.

use std::time::Duration;

/// Horizontal distance a sliding screen travels, in pixels
pub const SLIDE_DISTANCE_PX: f32 = 100.0;

/// Direction for slide transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideDirection {
    /// Enter from the right, moving left
    Left,
    /// Enter from the left, moving right
    Right,
    /// Enter from below, moving up
    Up,
    /// Enter from above, moving down
    Down,
}

impl SlideDirection {
    pub fn opposite(self) -> Self {
        match self {
            SlideDirection::Left => SlideDirection::Right,
            SlideDirection::Right => SlideDirection::Left,
            SlideDirection::Up => SlideDirection::Down,
            SlideDirection::Down => SlideDirection::Up,
        }
    }
}

/// Platform family, selecting the default stack transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Horizontal slide
    Ios,
    /// Scale and fade ("pop")
    Android,
    /// No animation
    #[default]
    Web,
}

/// Whether an item is appearing or leaving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Enter,
    Exit,
}

/// Built-in transition types
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Transition {
    /// No transition animation
    #[default]
    None,

    /// Opacity only
    Fade {
        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// Slide in from one side
    Slide {
        direction: SlideDirection,
        /// Duration in milliseconds
        duration_ms: u64,
    },

    /// Grow from `from` to `to` while fading in
    Scale {
        from: f32,
        to: f32,
        /// Duration in milliseconds
        duration_ms: u64,
    },
}

/// Visual state of an item at one point of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub scale: f32,
}

impl TransitionFrame {
    /// Fully settled, untransformed
    pub const IDENTITY: TransitionFrame = TransitionFrame {
        x: 0.0,
        y: 0.0,
        opacity: 1.0,
        scale: 1.0,
    };
}

impl Transition {
    /// Create a fade transition
    pub fn fade(duration_ms: u64) -> Self {
        Self::Fade { duration_ms }
    }

    /// Create a slide-left transition
    pub fn slide_left(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Left,
            duration_ms,
        }
    }

    /// Create a slide-right transition
    pub fn slide_right(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Right,
            duration_ms,
        }
    }

    /// Create a slide-up transition
    pub fn slide_up(duration_ms: u64) -> Self {
        Self::Slide {
            direction: SlideDirection::Up,
            duration_ms,
        }
    }

    /// Create a scale transition
    pub fn scale(from: f32, to: f32, duration_ms: u64) -> Self {
        Self::Scale {
            from,
            to,
            duration_ms,
        }
    }

    /// Scale-and-fade used by Android-style stacks
    pub fn pop(duration_ms: u64) -> Self {
        Self::scale(0.9, 1.0, duration_ms)
    }

    /// Default stack transition for a platform family
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Ios => Self::slide_left(350),
            Platform::Android => Self::pop(250),
            Platform::Web => Self::None,
        }
    }

    /// Get the duration of this transition
    pub fn duration(&self) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fade { duration_ms, .. }
            | Self::Slide { duration_ms, .. }
            | Self::Scale { duration_ms, .. } => Duration::from_millis(*duration_ms),
        }
    }

    /// Check if this is a no-op transition
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Same transition with a different duration
    pub fn with_duration(self, duration: Duration) -> Self {
        let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        match self {
            Self::None => Self::None,
            Self::Fade { .. } => Self::Fade { duration_ms },
            Self::Slide { direction, .. } => Self::Slide {
                direction,
                duration_ms,
            },
            Self::Scale { from, to, .. } => Self::Scale {
                from,
                to,
                duration_ms,
            },
        }
    }

    /// Visual state at `progress` (0.0 to 1.0) of the given phase
    ///
    /// Exit frames are enter frames played backwards.
    pub fn frame(&self, phase: TransitionPhase, progress: f32) -> TransitionFrame {
        let progress = progress.clamp(0.0, 1.0);
        let shown = match phase {
            TransitionPhase::Enter => progress,
            TransitionPhase::Exit => 1.0 - progress,
        };

        match self {
            Transition::None => TransitionFrame::IDENTITY,
            Transition::Fade { .. } => TransitionFrame {
                opacity: shown,
                ..TransitionFrame::IDENTITY
            },
            Transition::Slide { direction, .. } => {
                let offset = (1.0 - shown) * SLIDE_DISTANCE_PX;
                let (x, y) = match direction {
                    SlideDirection::Left => (offset, 0.0),
                    SlideDirection::Right => (-offset, 0.0),
                    SlideDirection::Up => (0.0, offset),
                    SlideDirection::Down => (0.0, -offset),
                };
                TransitionFrame {
                    x,
                    y,
                    ..TransitionFrame::IDENTITY
                }
            }
            Transition::Scale { from, to, .. } => TransitionFrame {
                opacity: shown,
                scale: from + (to - from) * shown,
                ..TransitionFrame::IDENTITY
            },
        }
    }
}

/// Applies a transition frame to an element
///
/// Offsets and fades `element` according to the frame at `progress`. gpui has
/// no scale transform for arbitrary elements, so scaling contributes through
/// opacity only.
#[cfg(feature = "gpui")]
pub fn apply_transition<E: gpui::Styled>(
    element: E,
    transition: &Transition,
    phase: TransitionPhase,
    progress: f32,
) -> E {
    let frame = transition.frame(phase, progress);
    element
        .left(gpui::px(frame.x))
        .top(gpui::px(frame.y))
        .opacity(frame.opacity)
}

/// Easing function - ease in out cubic
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Apply easing to progress
pub fn apply_easing(progress: f32) -> f32 {
    ease_in_out_cubic(progress.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_direction_opposite() {
        assert_eq!(SlideDirection::Left.opposite(), SlideDirection::Right);
        assert_eq!(SlideDirection::Up.opposite().opposite(), SlideDirection::Up);
    }

    #[test]
    fn test_transition_none() {
        let transition = Transition::None;
        assert!(transition.is_none());
        assert_eq!(transition.duration(), Duration::ZERO);
        assert_eq!(
            transition.frame(TransitionPhase::Enter, 0.0),
            TransitionFrame::IDENTITY
        );
    }

    #[test]
    fn test_platform_presets() {
        assert!(matches!(
            Transition::for_platform(Platform::Ios),
            Transition::Slide {
                direction: SlideDirection::Left,
                duration_ms: 350
            }
        ));
        assert!(matches!(
            Transition::for_platform(Platform::Android),
            Transition::Scale { duration_ms: 250, .. }
        ));
        assert!(Transition::for_platform(Platform::Web).is_none());
        assert_eq!(Platform::default(), Platform::Web);
    }

    #[test]
    fn test_slide_frames() {
        let slide = Transition::slide_left(300);
        let start = slide.frame(TransitionPhase::Enter, 0.0);
        assert_eq!(start.x, SLIDE_DISTANCE_PX);
        assert_eq!(slide.frame(TransitionPhase::Enter, 1.0).x, 0.0);

        // Leaving goes back the way it came
        assert_eq!(slide.frame(TransitionPhase::Exit, 0.0).x, 0.0);
        assert_eq!(slide.frame(TransitionPhase::Exit, 1.0).x, SLIDE_DISTANCE_PX);
    }

    #[test]
    fn test_pop_frames() {
        let pop = Transition::pop(250);
        let start = pop.frame(TransitionPhase::Enter, 0.0);
        assert_eq!(start.opacity, 0.0);
        assert!((start.scale - 0.9).abs() < f32::EPSILON);

        let end = pop.frame(TransitionPhase::Exit, 1.0);
        assert_eq!(end.opacity, 0.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let fade = Transition::fade(200);
        assert_eq!(fade.frame(TransitionPhase::Enter, 2.0).opacity, 1.0);
        assert_eq!(fade.frame(TransitionPhase::Enter, -1.0).opacity, 0.0);
    }

    #[test]
    fn test_with_duration() {
        let slide = Transition::slide_left(350).with_duration(Duration::from_millis(120));
        assert_eq!(slide.duration(), Duration::from_millis(120));
        assert!(Transition::None.with_duration(Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(apply_easing(0.0), 0.0);
        assert_eq!(apply_easing(1.0), 1.0);
        assert_eq!(apply_easing(0.5), 0.5);
        assert_eq!(apply_easing(3.0), 1.0);
    }
}

//! Error handling for the router
//!
//! Programming errors (relative navigation targets, claims that cannot match,
//! malformed route patterns) are reported as [`RouterError`]. A vetoed
//! navigation is not an error: it is reported as [`NavigationResult::Vetoed`].

use crate::location::Location;
use thiserror::Error;

// ============================================================================
// Navigation Result Types
// ============================================================================

/// Outcome of a navigation that was accepted by the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// The history moved to a new location and listeners were notified.
    Navigated {
        /// The newly resolved location
        location: Location,
    },
    /// A `before_navigate` listener rejected the navigation. Nothing changed.
    Vetoed {
        /// The href that was requested
        to: String,
    },
}

impl NavigationResult {
    /// Check if the history moved
    pub fn is_navigated(&self) -> bool {
        matches!(self, NavigationResult::Navigated { .. })
    }

    /// Check if a guard rejected the navigation
    pub fn is_vetoed(&self) -> bool {
        matches!(self, NavigationResult::Vetoed { .. })
    }

    /// The location navigated to, if any
    pub fn location(&self) -> Option<&Location> {
        match self {
            NavigationResult::Navigated { location } => Some(location),
            NavigationResult::Vetoed { .. } => None,
        }
    }
}

// ============================================================================
// Router Errors
// ============================================================================

/// Errors raised by misuse of the routing API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// `History::navigate` only accepts absolute paths.
    #[error("cannot navigate to relative path '{to}': resolve it with location.link_to() first")]
    RelativeNavigation {
        /// The rejected target
        to: String,
    },

    /// `Location::claim` was called with a pattern that does not match.
    #[error("pattern '{pattern}' does not match '{unclaimed}' (unclaimed part of '{href}')")]
    ClaimFailed {
        /// The pattern that failed
        pattern: String,
        /// Full href of the location
        href: String,
        /// The unclaimed remainder the pattern was matched against
        unclaimed: String,
    },

    /// A route or tab declaration used a malformed path pattern.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Convenience alias used across the crate.
pub type Result<T, E = RouterError> = std::result::Result<T, E>;

// ============================================================================
// Tests
// ============================================================================

#![forbid(unsafe_code)]

//! Canonical host events.
//!
//! The host (a browser binding or a test) translates DOM signals into these
//! values and pushes them into the runtime. Every variant is a discrete,
//! already-measured fact: handlers never query the page themselves.
//!
//! # Design Notes
//!
//! - Scroll and resize arrive at high frequency and are coalesced/throttled
//!   before dispatch; everything else is delivered in arrival order.
//! - Link activation is addressed by index into the bound link list, so a
//!   cloned mobile link and its desktop counterpart resolve to the same entry.

use crate::geometry::LayoutSnapshot;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The document scrolled.
    Scroll {
        /// New vertical scroll offset in CSS pixels.
        offset_y: f64,
    },

    /// The viewport was resized.
    Resize {
        /// New inner width in CSS pixels.
        width: f64,
        /// New inner height in CSS pixels.
        height: f64,
    },

    /// A navigation link was clicked.
    LinkActivate {
        /// Index into the bound link list.
        index: usize,
    },

    /// The hamburger control was clicked.
    MenuToggle,

    /// The overlay backdrop (outside the menu links) was clicked.
    OverlayClick,

    /// The theme toggle was clicked.
    ThemeToggle,

    /// The system color-scheme preference changed.
    SystemTheme {
        /// `true` when the system now prefers a dark scheme.
        prefers_dark: bool,
    },

    /// The page structure changed and was re-measured.
    Layout(LayoutSnapshot),

    /// A host frame elapsed with no other input.
    Tick,
}

impl Event {
    /// Whether bursts of this event collapse to their latest value.
    #[must_use]
    pub const fn is_coalescable(&self) -> bool {
        matches!(
            self,
            Self::Scroll { .. } | Self::Resize { .. } | Self::Layout(_)
        )
    }

    /// Stable name for logging.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::LinkActivate { .. } => "link_activate",
            Self::MenuToggle => "menu_toggle",
            Self::OverlayClick => "overlay_click",
            Self::ThemeToggle => "theme_toggle",
            Self::SystemTheme { .. } => "system_theme",
            Self::Layout(_) => "layout",
            Self::Tick => "tick",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_events_are_coalescable() {
        assert!(Event::Scroll { offset_y: 1.0 }.is_coalescable());
        assert!(
            Event::Resize {
                width: 10.0,
                height: 10.0
            }
            .is_coalescable()
        );
        assert!(Event::Layout(LayoutSnapshot::default()).is_coalescable());
    }

    #[test]
    fn interactions_are_not_coalescable() {
        for ev in [
            Event::LinkActivate { index: 0 },
            Event::MenuToggle,
            Event::OverlayClick,
            Event::ThemeToggle,
            Event::SystemTheme { prefers_dark: true },
            Event::Tick,
        ] {
            assert!(!ev.is_coalescable(), "{} should pass through", ev.kind_str());
        }
    }
}

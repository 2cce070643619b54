#![forbid(unsafe_code)]

//! Sticky header state.
//!
//! [`HeaderScrollState`] drives the blurred/shadowed "scrolled" look and is a
//! pure function of the scroll offset. [`HeaderVisibilityTracker`] is the
//! optional hide-on-scroll-down behavior; it is direction-dependent and so
//! keeps the previous offset, but it never feeds back into the scroll state.

/// Whether the page has scrolled past the header threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderScrollState {
    #[default]
    AtTop,
    Scrolled,
}

impl HeaderScrollState {
    /// `Scrolled` iff `offset > threshold`.
    ///
    /// NaN offsets compare false and yield `AtTop`.
    #[inline]
    #[must_use]
    pub fn from_offset(offset: f64, threshold: f64) -> Self {
        if offset > threshold {
            Self::Scrolled
        } else {
            Self::AtTop
        }
    }

    #[must_use]
    pub const fn is_scrolled(self) -> bool {
        matches!(self, Self::Scrolled)
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AtTop => "at_top",
            Self::Scrolled => "scrolled",
        }
    }
}

/// Header slide state for hide-on-scroll-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderVisibility {
    #[default]
    Shown,
    Hidden,
}

impl HeaderVisibility {
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }
}

/// Tracks scroll direction to hide the header while the reader moves down.
#[derive(Debug, Clone)]
pub struct HeaderVisibilityTracker {
    hide_threshold: f64,
    last_offset: Option<f64>,
    state: HeaderVisibility,
}

impl HeaderVisibilityTracker {
    /// Create a tracker that only hides past `hide_threshold`.
    #[must_use]
    pub const fn new(hide_threshold: f64) -> Self {
        Self {
            hide_threshold,
            last_offset: None,
            state: HeaderVisibility::Shown,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> HeaderVisibility {
        self.state
    }

    /// Feed a new offset.
    ///
    /// Past the threshold the header hides when the offset grew since the last
    /// update and shows otherwise. At or below the threshold it is always shown.
    pub fn update(&mut self, offset: f64) -> HeaderVisibility {
        let moving_down = self.last_offset.is_some_and(|prev| offset > prev);
        self.state = if offset > self.hide_threshold && moving_down {
            HeaderVisibility::Hidden
        } else {
            HeaderVisibility::Shown
        };
        self.last_offset = Some(offset);
        self.state
    }
}

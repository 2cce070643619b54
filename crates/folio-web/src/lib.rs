#![forbid(unsafe_code)]

//! `folio-web` drives the Folio navigation state machines from a web page.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding page pushes scroll, resize and click
//!   events; nothing here installs listeners on its own.
//! - **Deterministic time**: the host advances a monotonic clock explicitly,
//!   so throttling and the loading flag replay identically in tests.
//! - **Output as data**: every page mutation is a [`DomOp`]. Native tests
//!   inspect the list; on `wasm32` the [`FolioSite`] surface applies it.

pub mod step_program;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::FolioSite;

use core::time::Duration;
use std::collections::VecDeque;

use folio_core::event::Event;
use folio_nav::reveal::RevealConfig;
use folio_nav::{NavConfig, Theme};
use serde::{Deserialize, Serialize};

/// Web backend error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebBackendError {
    /// `init` was called more than once.
    AlreadyInitialized,
    /// `step` was called before `init`.
    NotInitialized,
    /// Host options could not be parsed.
    InvalidOptions(String),
    /// A required page element or browser API is missing.
    Dom(String),
}

impl core::fmt::Display for WebBackendError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "site program already initialized"),
            Self::NotInitialized => write!(f, "site program not initialized"),
            Self::InvalidOptions(msg) => write!(f, "invalid options: {msg}"),
            Self::Dom(msg) => write!(f, "dom: {msg}"),
        }
    }
}

impl std::error::Error for WebBackendError {}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Current monotonic time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Set current monotonic time. Never moves backwards.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

/// Host-driven event source.
///
/// The host is responsible for pushing [`Event`] values.
#[derive(Debug, Clone, Default)]
pub struct WebEventSource {
    queue: VecDeque<Event>,
}

impl WebEventSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a canonical event into the queue.
    pub fn push_event(&mut self, event: Event) {
        self.queue.push_back(event);
    }

    /// Pop the oldest pending event.
    pub fn read_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drain all pending events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}

/// One page mutation.
///
/// Indices refer to the link and reveal-target lists the program was bound
/// with, in document order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DomOp {
    /// Add or remove the `active` class on a nav link.
    SetLinkActive { index: usize, active: bool },
    /// Add or remove the `scrolled` class on the header.
    SetHeaderScrolled(bool),
    /// Slide the header out of view or back in.
    SetHeaderHidden(bool),
    /// Open or close the mobile menu.
    SetMenuOpen(bool),
    /// Build the hamburger button and overlay menu.
    MountMobileMenu,
    /// Remove the hamburger button and overlay menu.
    UnmountMobileMenu,
    /// Scroll the window.
    ScrollTo { top: f64, smooth: bool },
    /// Add or remove the `loading` class on the body.
    SetLoading(bool),
    /// Apply a theme to the document root, meta color and toggle label.
    SetTheme(Theme),
    /// Fade an animated element in.
    Reveal { index: usize },
    /// Swap a deferred image source in.
    LoadImage { index: usize },
}

/// Captured outputs for host consumption.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WebOutputs {
    /// Mutations in the order they must be applied.
    pub ops: Vec<DomOp>,
}

impl WebOutputs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Hand each op to `apply` in order. A failing op is logged and the rest
    /// are still applied. Returns the number of failures.
    pub fn apply_each<E, F>(self, mut apply: F) -> usize
    where
        E: core::fmt::Display,
        F: FnMut(DomOp) -> Result<(), E>,
    {
        let mut failed = 0;
        for op in self.ops {
            if let Err(err) = apply(op) {
                tracing::warn!(error = %err, ?op, "dom op failed");
                failed += 1;
            }
        }
        failed
    }
}

/// CSS selectors used to find page elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Scroll-spy sections; each needs a unique `id`.
    pub sections: String,
    /// Navigation anchors with `#id` hrefs.
    pub nav_links: String,
    /// The list cloned into the mobile overlay.
    pub nav_list: String,
    /// Fixed header.
    pub header: String,
    /// Container receiving the hamburger button.
    pub nav_container: String,
    /// Theme toggle control.
    pub theme_toggle: String,
    /// `<meta name="theme-color">`.
    pub theme_meta: String,
    /// Elements that fade in once scrolled into view.
    pub animate: String,
    /// Images with a deferred `data-src`.
    pub lazy_images: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            sections: "section[id]".to_owned(),
            nav_links: ".nav-links a[href^=\"#\"]".to_owned(),
            nav_list: ".nav-links".to_owned(),
            header: ".nav".to_owned(),
            nav_container: ".nav-container".to_owned(),
            theme_toggle: "#themeToggle".to_owned(),
            theme_meta: "meta[name=\"theme-color\"]".to_owned(),
            animate: ".animate-on-scroll".to_owned(),
            lazy_images: "img[data-src]".to_owned(),
        }
    }
}

/// Options accepted from the host as JSON.
///
/// Every field is optional; missing fields take their defaults.
///
/// ```
/// use folio_web::SiteOptions;
///
/// let opts = SiteOptions::from_json(r#"{"nav": {"breakpoint_px": 900}}"#).unwrap();
/// assert_eq!(opts.nav.breakpoint_px, 900.0);
/// assert_eq!(opts.nav.lookahead_px, 100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteOptions {
    pub nav: NavConfig,
    pub reveal: RevealConfig,
    pub selectors: Selectors,
}

impl SiteOptions {
    /// Parse options. Blank input yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, WebBackendError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json).map_err(|e| WebBackendError::InvalidOptions(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn clock_is_monotonic() {
        let mut clock = DeterministicClock::new();
        clock.advance(Duration::from_millis(30));
        clock.set(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::from_millis(30));
        clock.set(Duration::from_millis(50));
        assert_eq!(clock.now(), Duration::from_millis(50));
    }

    #[test]
    fn event_source_is_fifo() {
        let mut src = WebEventSource::new();
        src.push_event(Event::MenuToggle);
        src.push_event(Event::Scroll { offset_y: 12.0 });
        assert_eq!(src.len(), 2);
        assert_eq!(src.read_event(), Some(Event::MenuToggle));
        let rest: Vec<_> = src.drain_events().collect();
        assert_eq!(rest, vec![Event::Scroll { offset_y: 12.0 }]);
        assert!(src.is_empty());
    }

    #[test]
    fn failed_op_does_not_drop_the_rest() {
        let outputs = WebOutputs {
            ops: vec![
                DomOp::SetLinkActive {
                    index: 0,
                    active: true,
                },
                DomOp::SetMenuOpen(false),
                DomOp::UnmountMobileMenu,
            ],
        };
        let mut applied = Vec::new();
        let failed = outputs.apply_each(|op| match op {
            DomOp::SetLinkActive { .. } => Err("invalid selector"),
            other => {
                applied.push(other);
                Ok(())
            }
        });
        assert_eq!(failed, 1);
        assert_eq!(
            applied,
            vec![DomOp::SetMenuOpen(false), DomOp::UnmountMobileMenu]
        );
    }

    #[test]
    fn options_defaults_and_overrides() {
        assert_eq!(SiteOptions::from_json("  ").unwrap(), SiteOptions::default());
        let opts = SiteOptions::from_json(
            r##"{"selectors": {"header": "#top"}, "reveal": {"threshold": 0.5}}"##,
        )
        .unwrap();
        assert_eq!(opts.selectors.header, "#top");
        assert_eq!(opts.selectors.sections, "section[id]");
        assert_eq!(opts.reveal.threshold, 0.5);
        assert_eq!(opts.reveal.root_margin_bottom, 50.0);
    }

    #[test]
    fn options_reject_malformed_json() {
        let err = SiteOptions::from_json("{nav:").unwrap_err();
        assert!(matches!(err, WebBackendError::InvalidOptions(_)));
        assert!(err.to_string().starts_with("invalid options"));
    }
}

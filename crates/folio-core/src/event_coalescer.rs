#![forbid(unsafe_code)]

//! Event coalescing for high-frequency page signals.
//!
//! Browsers fire `scroll` and `resize` many times per frame. Every handler in
//! this workspace recomputes from the latest value, so intermediate values
//! carry no information. [`EventCoalescer`]:
//! - keeps only the latest scroll offset,
//! - keeps only the latest viewport size,
//! - keeps only the latest layout snapshot,
//! - passes every other event through immediately.
//!
//! The caller is responsible for flushing pending events before handling a
//! pass-through event so ordering is preserved.
//!
//! # Usage
//!
//! ```
//! use folio_core::event::Event;
//! use folio_core::event_coalescer::EventCoalescer;
//!
//! let mut coalescer = EventCoalescer::new();
//! assert!(coalescer.push(Event::Scroll { offset_y: 10.0 }).is_none());
//! assert!(coalescer.push(Event::Scroll { offset_y: 40.0 }).is_none());
//!
//! // Clicks pass through; flush first to keep order.
//! let click = coalescer.push(Event::MenuToggle);
//! assert_eq!(click, Some(Event::MenuToggle));
//!
//! let pending = coalescer.flush();
//! assert_eq!(pending, vec![Event::Scroll { offset_y: 40.0 }]);
//! ```

use crate::event::Event;
use crate::geometry::LayoutSnapshot;

/// Latest-wins coalescer for scroll, resize, and layout events.
///
/// Not thread-safe; use from the single event-processing thread. Holds at
/// most one pending event per coalescable kind.
#[derive(Debug, Clone, Default)]
pub struct EventCoalescer {
    pending_layout: Option<LayoutSnapshot>,
    pending_resize: Option<(f64, f64)>,
    pending_scroll: Option<f64>,
    scroll_count: u32,
    resize_count: u32,
}

impl EventCoalescer {
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event.
    ///
    /// Returns `Some(event)` when it must be handled now, or `None` when it
    /// was folded into a pending value.
    pub fn push(&mut self, event: Event) -> Option<Event> {
        match event {
            Event::Scroll { offset_y } => {
                self.pending_scroll = Some(offset_y);
                self.scroll_count = self.scroll_count.saturating_add(1);
                None
            }
            Event::Resize { width, height } => {
                self.pending_resize = Some((width, height));
                self.resize_count = self.resize_count.saturating_add(1);
                None
            }
            Event::Layout(snapshot) => {
                self.pending_layout = Some(snapshot);
                None
            }
            other => Some(other),
        }
    }

    /// Flush all pending events.
    ///
    /// Order: layout, then resize, then scroll. Structural changes land
    /// before the positional signals that depend on them.
    #[must_use]
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::with_capacity(3);
        self.flush_each(|e| events.push(e));
        events
    }

    /// Flush pending events through a closure, in [`flush`](Self::flush) order.
    pub fn flush_each<F>(&mut self, mut f: F)
    where
        F: FnMut(Event),
    {
        if let Some(snapshot) = self.pending_layout.take() {
            f(Event::Layout(snapshot));
        }
        if let Some((width, height)) = self.pending_resize.take() {
            f(Event::Resize { width, height });
        }
        if let Some(offset_y) = self.pending_scroll.take() {
            f(Event::Scroll { offset_y });
        }
        self.scroll_count = 0;
        self.resize_count = 0;
    }

    /// Check if anything is pending.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_layout.is_some() || self.pending_resize.is_some() || self.pending_scroll.is_some()
    }

    /// Number of scroll events folded into the pending one.
    #[must_use]
    pub fn pending_scroll_count(&self) -> u32 {
        self.scroll_count
    }

    /// Number of resize events folded into the pending one.
    #[must_use]
    pub fn pending_resize_count(&self) -> u32 {
        self.resize_count
    }

    /// Discard pending events.
    pub fn clear(&mut self) {
        self.pending_layout = None;
        self.pending_resize = None;
        self.pending_scroll = None;
        self.scroll_count = 0;
        self.resize_count = 0;
    }
}

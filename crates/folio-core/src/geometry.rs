#![forbid(unsafe_code)]

//! Layout snapshot primitives.
//!
//! All positions are CSS pixels measured from the document top. Snapshots are
//! taken by the host when the page structure changes (load, resize, content
//! mutation) and are read-only afterwards.

/// A uniquely identified page section.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Element id, without the leading `#`.
    pub id: String,
    /// Distance from the document top to the section's top edge.
    pub top: f64,
    /// Rendered height.
    pub height: f64,
}

impl Section {
    /// Create a new section.
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check whether a document position falls inside `[top, bottom)`.
    #[inline]
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.bottom()
    }

    /// The fragment an anchor uses to target this section (`#id`).
    pub fn anchor(&self) -> String {
        format!("#{}", self.id)
    }
}

/// What should happen once a reveal target enters the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevealKind {
    /// Add the fade-in class.
    #[default]
    Animate,
    /// Swap a deferred image source in.
    LazyImage,
}

impl RevealKind {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Animate => "animate",
            Self::LazyImage => "lazy_image",
        }
    }
}

/// Vertical bounds of an element that animates or loads when scrolled into view.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RevealBox {
    pub top: f64,
    pub height: f64,
    pub kind: RevealKind,
}

impl RevealBox {
    /// Create a new reveal box.
    pub const fn new(top: f64, height: f64, kind: RevealKind) -> Self {
        Self { top, height, kind }
    }
}

/// Cached page layout, recomputed only on structural change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    /// Sections in document order.
    pub sections: Vec<Section>,
    /// Measured height of the fixed header.
    pub header_height: f64,
    /// Elements tracked for scroll reveal, in document order.
    pub reveal: Vec<RevealBox>,
}

impl LayoutSnapshot {
    /// Create a snapshot from sections with no header and no reveal targets.
    pub fn new(sections: Vec<Section>) -> Self {
        Self {
            sections,
            header_height: 0.0,
            reveal: Vec::new(),
        }
    }

    /// Set the measured header height.
    #[must_use]
    pub fn with_header_height(mut self, height: f64) -> Self {
        self.header_height = height;
        self
    }

    /// Set the reveal targets.
    #[must_use]
    pub fn with_reveal(mut self, reveal: Vec<RevealBox>) -> Self {
        self.reveal = reveal;
        self
    }

    /// True when there are no sections to spy on.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Look up a section by id.
    pub fn section_by_id(&self, id: &str) -> Option<(usize, &Section)> {
        self.sections.iter().enumerate().find(|(_, s)| s.id == id)
    }

    /// First section (document order) whose range contains `y`.
    pub fn section_at(&self, y: f64) -> Option<usize> {
        self.sections.iter().position(|s| s.contains(y))
    }

    /// Bottom edge of the lowest section.
    pub fn document_height(&self) -> f64 {
        self.sections
            .iter()
            .map(Section::bottom)
            .fold(0.0, f64::max)
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Current vertical scroll offset.
    pub scroll_y: f64,
    /// Inner width.
    pub width: f64,
    /// Inner height.
    pub height: f64,
}

impl Viewport {
    /// Create a new viewport.
    pub const fn new(scroll_y: f64, width: f64, height: f64) -> Self {
        Self {
            scroll_y,
            width,
            height,
        }
    }

    /// Bottom edge in document coordinates.
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.scroll_y + self.height
    }

    /// Fraction of `[top, top + height)` visible inside the viewport, with the
    /// viewport's bottom edge pulled up by `bottom_margin`.
    ///
    /// Zero-height targets report `1.0` when they sit inside the window and
    /// `0.0` otherwise.
    pub fn visible_ratio(&self, top: f64, height: f64, bottom_margin: f64) -> f64 {
        let view_top = self.scroll_y;
        let view_bottom = self.bottom() - bottom_margin;
        if view_bottom <= view_top {
            return 0.0;
        }
        if height <= 0.0 {
            return if top >= view_top && top <= view_bottom {
                1.0
            } else {
                0.0
            };
        }
        let overlap = (top + height).min(view_bottom) - top.max(view_top);
        (overlap.max(0.0) / height).min(1.0)
    }
}

#![forbid(unsafe_code)]

//! Scroll-spy: which navigation link matches the section in view.
//!
//! # Invariants
//!
//! 1. At most one link is active.
//! 2. The active link is the first link, in document order, whose target
//!    section's half-open range contains the spy position.
//! 3. A spy position above the first section (or in a gap) activates nothing.
//!
//! Link targets are resolved once per layout snapshot ([`resolve_targets`])
//! so a scroll tick is a linear scan over small cached indices.

use folio_core::geometry::LayoutSnapshot;

/// A navigation anchor pointing at a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Raw `href` attribute, expected to be `#` + section id.
    pub href: String,
    /// Whether this link is currently highlighted.
    pub is_active: bool,
}

impl NavLink {
    /// Create an inactive link.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            is_active: false,
        }
    }

    /// Section id this link targets, if the href is a non-empty fragment.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        self.href.strip_prefix('#').filter(|id| !id.is_empty())
    }
}

/// Map each link to the index of the section it targets.
#[must_use]
pub fn resolve_targets(layout: &LayoutSnapshot, links: &[NavLink]) -> Vec<Option<usize>> {
    links
        .iter()
        .map(|link| {
            link.target_id()
                .and_then(|id| layout.section_by_id(id))
                .map(|(idx, _)| idx)
        })
        .collect()
}

/// Index of the link to activate for a spy position.
#[must_use]
pub fn active_link_at(
    layout: &LayoutSnapshot,
    targets: &[Option<usize>],
    position: f64,
) -> Option<usize> {
    targets.iter().position(|target| {
        target
            .and_then(|idx| layout.sections.get(idx))
            .is_some_and(|section| section.contains(position))
    })
}

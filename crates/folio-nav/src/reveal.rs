#![forbid(unsafe_code)]

//! One-shot scroll reveal for fade-in elements and deferred images.
//!
//! # Invariants
//!
//! 1. Revealing is monotone: once an element is revealed it never reverts,
//!    even if it scrolls back out of view.
//! 2. [`RevealKind::Animate`] targets reveal when at least `threshold` of
//!    their height is inside the viewport, with the bottom edge pulled up by
//!    `root_margin_bottom`.
//! 3. [`RevealKind::LazyImage`] targets reveal on any overlap, with no margin.

use folio_core::geometry::{RevealBox, RevealKind, Viewport};

/// Tuning for [`RevealTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RevealConfig {
    /// Minimum visible fraction for animated targets.
    pub threshold: f64,
    /// Pixels shaved off the viewport bottom for animated targets.
    pub root_margin_bottom: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin_bottom: 50.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Target {
    bounds: RevealBox,
    revealed: bool,
}

/// Tracks which reveal targets have entered the viewport.
#[derive(Debug, Clone, Default)]
pub struct RevealTracker {
    config: RevealConfig,
    targets: Vec<Target>,
}

impl RevealTracker {
    #[must_use]
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Replace target bounds after a layout change.
    ///
    /// Targets keep their revealed flag by index; new targets start hidden.
    pub fn sync_layout(&mut self, boxes: &[RevealBox]) {
        let previous = std::mem::take(&mut self.targets);
        self.targets = boxes
            .iter()
            .enumerate()
            .map(|(idx, bounds)| Target {
                bounds: *bounds,
                revealed: previous.get(idx).is_some_and(|t| t.revealed),
            })
            .collect();
    }

    /// Reveal everything now in view. Returns indices revealed by this call.
    pub fn update(&mut self, viewport: &Viewport) -> Vec<usize> {
        let config = self.config;
        let mut newly = Vec::new();
        for (idx, target) in self.targets.iter_mut().enumerate() {
            if target.revealed {
                continue;
            }
            let RevealBox { top, height, kind } = target.bounds;
            let visible = match kind {
                RevealKind::Animate => {
                    let ratio = viewport.visible_ratio(top, height, config.root_margin_bottom);
                    ratio > 0.0 && ratio >= config.threshold
                }
                RevealKind::LazyImage => viewport.visible_ratio(top, height, 0.0) > 0.0,
            };
            if visible {
                target.revealed = true;
                newly.push(idx);
            }
        }
        if !newly.is_empty() {
            tracing::trace!(count = newly.len(), "reveal targets entered view");
        }
        newly
    }

    #[must_use]
    pub fn is_revealed(&self, index: usize) -> bool {
        self.targets.get(index).is_some_and(|t| t.revealed)
    }

    /// Kind of the target at `index`.
    #[must_use]
    pub fn kind(&self, index: usize) -> Option<RevealKind> {
        self.targets.get(index).map(|t| t.bounds.kind)
    }

    /// Targets not yet revealed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.targets.iter().filter(|t| !t.revealed).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(boxes: &[RevealBox]) -> RevealTracker {
        let mut t = RevealTracker::new(RevealConfig::default());
        t.sync_layout(boxes);
        t
    }

    #[test]
    fn animate_needs_threshold_inside_margin() {
        // Viewport 0..800, effective bottom 750 for animated targets.
        let mut t = tracker(&[
            RevealBox::new(700.0, 200.0, RevealKind::Animate),
            RevealBox::new(740.0, 200.0, RevealKind::Animate),
            RevealBox::new(760.0, 200.0, RevealKind::Animate),
        ]);
        let vp = Viewport::new(0.0, 1024.0, 800.0);
        // 50/200 = 0.25 visible, 10/200 = 0.05, 0.
        assert_eq!(t.update(&vp), vec![0]);
        assert_eq!(t.pending(), 2);
    }

    #[test]
    fn lazy_image_loads_on_any_overlap() {
        let mut t = tracker(&[
            RevealBox::new(790.0, 300.0, RevealKind::LazyImage),
            RevealBox::new(800.0, 300.0, RevealKind::LazyImage),
        ]);
        let vp = Viewport::new(0.0, 1024.0, 800.0);
        assert_eq!(t.update(&vp), vec![0]);
        assert_eq!(t.kind(0), Some(RevealKind::LazyImage));
    }

    #[test]
    fn reveal_is_monotone() {
        let mut t = tracker(&[RevealBox::new(1000.0, 200.0, RevealKind::Animate)]);
        assert!(t.update(&Viewport::new(0.0, 1024.0, 800.0)).is_empty());
        assert_eq!(t.update(&Viewport::new(600.0, 1024.0, 800.0)), vec![0]);
        assert!(t.update(&Viewport::new(0.0, 1024.0, 800.0)).is_empty());
        assert!(t.is_revealed(0));
    }

    #[test]
    fn sync_layout_keeps_revealed_by_index() {
        let mut t = tracker(&[
            RevealBox::new(0.0, 100.0, RevealKind::Animate),
            RevealBox::new(5000.0, 100.0, RevealKind::Animate),
        ]);
        t.update(&Viewport::new(0.0, 1024.0, 800.0));
        t.sync_layout(&[
            RevealBox::new(20.0, 100.0, RevealKind::Animate),
            RevealBox::new(5100.0, 100.0, RevealKind::Animate),
            RevealBox::new(6000.0, 100.0, RevealKind::LazyImage),
        ]);
        assert_eq!(t.len(), 3);
        assert!(t.is_revealed(0));
        assert!(!t.is_revealed(1));
        assert!(!t.is_revealed(2));
        assert!(!t.is_revealed(9));
    }

    #[test]
    fn collapsed_viewport_reveals_nothing() {
        let mut t = tracker(&[RevealBox::new(0.0, 10.0, RevealKind::Animate)]);
        assert!(t.update(&Viewport::new(0.0, 1024.0, 40.0)).is_empty());
    }
}

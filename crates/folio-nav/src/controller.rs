#![forbid(unsafe_code)]

//! Navigation controller: scroll-spy, sticky header, and mobile menu.
//!
//! [`NavigationController`] is the single context object a page binds at
//! startup. The host feeds it measured facts (scroll offset, viewport width,
//! clicks, layout snapshots) and reads back a [`NavChanges`] set describing
//! which parts of the page need repainting.
//!
//! # Invariants
//!
//! 1. At most one link is active.
//! 2. [`MenuState`] changes only through an explicit toggle/open/close, a link
//!    activation while open, an overlay click while open, or the viewport
//!    widening past the breakpoint while open.
//! 3. [`HeaderScrollState`] is recomputed from the offset alone.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | No sections or no links | Unbound: scroll-spy and link scrolling are no-ops; header and menu still work |
//! | Link href matches no section | Link never activates; clicking it only closes the menu |
//! | Non-finite offset or width | Event ignored |

use core::time::Duration;

use bitflags::bitflags;
use folio_core::geometry::{LayoutSnapshot, Section};

use crate::config::NavConfig;
use crate::header::{HeaderScrollState, HeaderVisibility, HeaderVisibilityTracker};
use crate::menu::{MenuState, MobileAffordance};
use crate::scroll_spy::{self, NavLink};

bitflags! {
    /// Parts of the page touched by an operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NavChanges: u16 {
        /// The active link moved (or cleared).
        const ACTIVE_LINK = 1 << 0;
        /// Header scroll state flipped.
        const HEADER = 1 << 1;
        /// Header slid in or out.
        const HEADER_VISIBILITY = 1 << 2;
        /// Menu opened or closed.
        const MENU = 1 << 3;
        /// Mobile affordance built or torn down.
        const AFFORDANCE = 1 << 4;
        /// Loading flag raised or cleared.
        const LOADING = 1 << 5;
        /// Layout snapshot replaced.
        const LAYOUT = 1 << 6;
    }
}

/// A smooth-scroll target produced by a link click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Document offset to scroll to.
    pub top: f64,
    /// Animate the scroll.
    pub smooth: bool,
}

/// Outcome of [`NavigationController::on_link_activate`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinkActivation {
    pub changes: NavChanges,
    /// `None` when the link does not resolve to a section.
    pub scroll: Option<ScrollRequest>,
}

/// Scroll-synchronized navigation state.
#[derive(Debug, Clone)]
pub struct NavigationController {
    config: NavConfig,
    layout: LayoutSnapshot,
    links: Vec<NavLink>,
    targets: Vec<Option<usize>>,
    bound: bool,
    active: Option<usize>,
    header: HeaderScrollState,
    visibility: HeaderVisibilityTracker,
    menu: MenuState,
    affordance: MobileAffordance,
    viewport_width: Option<f64>,
    last_offset: f64,
    loading_until: Option<Duration>,
}

impl NavigationController {
    /// Create an unbound controller.
    #[must_use]
    pub fn new(config: NavConfig) -> Self {
        let config = config.normalized();
        Self {
            visibility: HeaderVisibilityTracker::new(config.hide_threshold_px),
            config,
            layout: LayoutSnapshot::default(),
            links: Vec::new(),
            targets: Vec::new(),
            bound: false,
            active: None,
            header: HeaderScrollState::AtTop,
            menu: MenuState::Closed,
            affordance: MobileAffordance::Absent,
            viewport_width: None,
            last_offset: 0.0,
            loading_until: None,
        }
    }

    /// Create a controller bound to `sections` and `links`.
    ///
    /// Empty input leaves the controller unbound rather than failing.
    #[must_use]
    pub fn initialize(sections: Vec<Section>, links: Vec<NavLink>, config: NavConfig) -> Self {
        let mut controller = Self::new(config);
        controller.bind(LayoutSnapshot::new(sections), links);
        controller
    }

    /// Bind to a layout snapshot and link list, resetting link highlight.
    pub fn bind(&mut self, layout: LayoutSnapshot, links: Vec<NavLink>) {
        self.links = links;
        for link in &mut self.links {
            link.is_active = false;
        }
        self.active = None;
        self.install_layout(layout);
    }

    /// Replace the cached layout and re-run scroll-spy at the last offset.
    ///
    /// An empty snapshot unbinds the controller.
    pub fn on_layout_change(&mut self, layout: LayoutSnapshot) -> NavChanges {
        self.install_layout(layout);
        let mut changes = NavChanges::LAYOUT;
        changes |= self.refresh_active(self.last_offset);
        changes
    }

    fn install_layout(&mut self, layout: LayoutSnapshot) {
        self.targets = scroll_spy::resolve_targets(&layout, &self.links);
        self.layout = layout;
        self.bound = !self.layout.is_empty() && !self.links.is_empty();
        if self.bound {
            let unresolved = self.targets.iter().filter(|t| t.is_none()).count();
            if unresolved > 0 {
                tracing::debug!(unresolved, "some nav links target no section");
            }
            tracing::debug!(
                sections = self.layout.sections.len(),
                links = self.links.len(),
                "navigation bound"
            );
        } else {
            tracing::warn!(
                sections = self.layout.sections.len(),
                links = self.links.len(),
                "navigation unbound: nothing to spy on"
            );
        }
    }

    /// Handle a scroll to `offset_y`.
    pub fn on_scroll(&mut self, offset_y: f64) -> NavChanges {
        if !offset_y.is_finite() {
            return NavChanges::empty();
        }
        let mut changes = NavChanges::empty();

        let header = HeaderScrollState::from_offset(offset_y, self.config.header_threshold_px);
        if header != self.header {
            self.header = header;
            changes |= NavChanges::HEADER;
        }

        if self.config.hide_on_scroll_down {
            let before = self.visibility.state();
            if self.visibility.update(offset_y) != before {
                changes |= NavChanges::HEADER_VISIBILITY;
            }
        }

        self.last_offset = offset_y;
        changes |= self.refresh_active(offset_y);
        changes
    }

    fn refresh_active(&mut self, offset_y: f64) -> NavChanges {
        let next = if self.bound {
            let spy_y = offset_y + self.config.lookahead_px;
            scroll_spy::active_link_at(&self.layout, &self.targets, spy_y)
        } else {
            None
        };
        if next == self.active {
            return NavChanges::empty();
        }
        if let Some(prev) = self.active.and_then(|i| self.links.get_mut(i)) {
            prev.is_active = false;
        }
        if let Some(cur) = next.and_then(|i| self.links.get_mut(i)) {
            cur.is_active = true;
        }
        tracing::trace!(from = ?self.active, to = ?next, "active link changed");
        self.active = next;
        NavChanges::ACTIVE_LINK
    }

    /// Handle a click on the link at `index`.
    ///
    /// Always closes the menu. When the link resolves to a section, returns a
    /// smooth-scroll request clearing the header plus margin and raises the
    /// loading flag until `now + loading_duration`.
    pub fn on_link_activate(&mut self, index: usize, now: Duration) -> LinkActivation {
        let mut changes = self.close_menu();

        if !self.bound {
            tracing::debug!(index, "link activated while unbound");
            return LinkActivation {
                changes,
                scroll: None,
            };
        }
        let Some(section) = self
            .targets
            .get(index)
            .copied()
            .flatten()
            .and_then(|idx| self.layout.sections.get(idx))
        else {
            tracing::debug!(index, "link activated with no target section");
            return LinkActivation {
                changes,
                scroll: None,
            };
        };

        let top = (section.top - self.layout.header_height - self.config.scroll_margin_px).max(0.0);
        if self.loading_until.is_none() {
            changes |= NavChanges::LOADING;
        }
        self.loading_until = Some(now.saturating_add(self.config.loading_duration()));
        tracing::debug!(section = %section.id, top, "scrolling to section");

        LinkActivation {
            changes,
            scroll: Some(ScrollRequest { top, smooth: true }),
        }
    }

    /// Clear the loading flag once its deadline has passed.
    pub fn poll_loading(&mut self, now: Duration) -> NavChanges {
        match self.loading_until {
            Some(deadline) if now >= deadline => {
                self.loading_until = None;
                NavChanges::LOADING
            }
            _ => NavChanges::empty(),
        }
    }

    /// Flip the menu.
    pub fn toggle_menu(&mut self) -> NavChanges {
        self.menu = self.menu.toggled();
        tracing::debug!(menu = self.menu.as_str(), "menu toggled");
        NavChanges::MENU
    }

    /// Open the menu if closed.
    pub fn open_menu(&mut self) -> NavChanges {
        if self.menu.is_open() {
            NavChanges::empty()
        } else {
            self.toggle_menu()
        }
    }

    /// Close the menu if open.
    pub fn close_menu(&mut self) -> NavChanges {
        if self.menu.is_open() {
            self.toggle_menu()
        } else {
            NavChanges::empty()
        }
    }

    /// Handle a click on the overlay backdrop.
    pub fn on_overlay_click(&mut self) -> NavChanges {
        self.close_menu()
    }

    /// Handle a viewport width change.
    ///
    /// Narrowing to the breakpoint materializes the mobile affordance once;
    /// widening past it tears the affordance down and closes the menu.
    pub fn on_viewport_resize(&mut self, width_px: f64) -> NavChanges {
        if !width_px.is_finite() {
            return NavChanges::empty();
        }
        let breakpoint = self.config.breakpoint_px;
        let was_mobile = self.viewport_width.is_some_and(|w| w <= breakpoint);
        self.viewport_width = Some(width_px);

        let mut changes = NavChanges::empty();
        if width_px <= breakpoint {
            if !self.affordance.is_materialized() {
                self.affordance = MobileAffordance::Materialized;
                tracing::debug!(width_px, "mobile menu materialized");
                changes |= NavChanges::AFFORDANCE;
            }
        } else {
            let had_affordance = self.affordance.is_materialized();
            if had_affordance || was_mobile {
                changes |= self.close_menu();
            }
            if had_affordance {
                self.affordance = MobileAffordance::Absent;
                tracing::debug!(width_px, "mobile menu torn down");
                changes |= NavChanges::AFFORDANCE;
            }
        }
        changes
    }

    /// Index of the first link with this exact href.
    #[must_use]
    pub fn link_index(&self, href: &str) -> Option<usize> {
        self.links.iter().position(|l| l.href == href)
    }

    #[must_use]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutSnapshot {
        &self.layout
    }

    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    /// Whether scroll-spy has sections and links to work with.
    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    #[must_use]
    pub const fn active_link(&self) -> Option<usize> {
        self.active
    }

    /// Id of the section behind the active link.
    #[must_use]
    pub fn active_section_id(&self) -> Option<&str> {
        let idx = self.targets.get(self.active?).copied().flatten()?;
        self.layout.sections.get(idx).map(|s| s.id.as_str())
    }

    #[must_use]
    pub const fn header_state(&self) -> HeaderScrollState {
        self.header
    }

    #[must_use]
    pub const fn header_visibility(&self) -> HeaderVisibility {
        self.visibility.state()
    }

    #[must_use]
    pub const fn menu_state(&self) -> MenuState {
        self.menu
    }

    #[must_use]
    pub const fn mobile_affordance(&self) -> MobileAffordance {
        self.affordance
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading_until.is_some()
    }

    /// When the loading flag will clear, if raised.
    #[must_use]
    pub const fn loading_deadline(&self) -> Option<Duration> {
        self.loading_until
    }
}

#![forbid(unsafe_code)]

//! Step-based runner for the site navigation state.
//!
//! [`SiteProgram`] drives the navigation controller, theme manager and reveal
//! tracker without threads, timers or blocking. The host controls the loop:
//!
//! 1. Push events via [`SiteProgram::push_event`].
//! 2. Advance time via [`SiteProgram::advance_time`].
//! 3. Call [`SiteProgram::step`] to process pending events.
//! 4. Apply the ops from [`SiteProgram::take_outputs`].
//! 5. If [`StepResult::next_deadline`] is set, step again at that time so
//!    throttled trailing values and the loading flag are not left hanging.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use core::time::Duration;
//!
//! use folio_core::event::Event;
//! use folio_core::geometry::{LayoutSnapshot, Section, Viewport};
//! use folio_nav::{MemoryStorage, NavConfig, NavLink};
//! use folio_web::DomOp;
//! use folio_web::step_program::SiteProgram;
//!
//! let layout = LayoutSnapshot::new(vec![
//!     Section::new("home", 0.0, 800.0),
//!     Section::new("about", 800.0, 600.0),
//! ]);
//! let links = vec![NavLink::new("#home"), NavLink::new("#about")];
//! let mut prog = SiteProgram::new(NavConfig::default(), Arc::new(MemoryStorage::new()))
//!     .with_layout(layout, links)
//!     .with_viewport(Viewport::new(0.0, 1280.0, 720.0));
//! prog.init().unwrap();
//! prog.take_outputs();
//!
//! prog.advance_time(Duration::from_millis(500));
//! prog.push_event(Event::Scroll { offset_y: 750.0 });
//! prog.step().unwrap();
//! let ops = prog.take_outputs().ops;
//! assert!(ops.contains(&DomOp::SetLinkActive { index: 1, active: true }));
//! ```

use core::time::Duration;
use std::sync::Arc;

use folio_core::event::Event;
use folio_core::event_coalescer::EventCoalescer;
use folio_core::geometry::{LayoutSnapshot, RevealKind, Viewport};
use folio_core::throttle::Throttle;
use folio_nav::reveal::{RevealConfig, RevealTracker};
use folio_nav::{NavChanges, NavConfig, NavLink, NavigationController, PreferenceStore, ThemeManager};

use crate::{DeterministicClock, DomOp, WebBackendError, WebEventSource, WebOutputs};

/// Result of a single [`SiteProgram::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Number of events drained from the queue.
    pub events_processed: u32,
    /// Number of ops emitted during this step.
    pub ops_emitted: u32,
    /// Earliest time at which another step has work to do.
    pub next_deadline: Option<Duration>,
    /// A resize got past the throttle and was applied; the host should
    /// re-measure the layout.
    pub resized: bool,
}

/// Host-driven, non-blocking runner for one page.
///
/// # Lifecycle
///
/// 1. [`SiteProgram::new`] with configuration and a preference store.
/// 2. Optionally bind layout and viewport with the `with_*` builders.
/// 3. [`SiteProgram::init`] once: loads the theme and emits the initial ops.
/// 4. [`SiteProgram::step`] repeatedly from the host loop.
pub struct SiteProgram {
    controller: NavigationController,
    store: Arc<dyn PreferenceStore>,
    theme: Option<ThemeManager>,
    reveal: RevealTracker,
    events: WebEventSource,
    clock: DeterministicClock,
    coalescer: EventCoalescer,
    scroll_throttle: Throttle<f64>,
    resize_throttle: Throttle<(f64, f64)>,
    viewport: Viewport,
    system_dark: bool,
    rendered_active: Option<usize>,
    resized: bool,
    outputs: WebOutputs,
    initialized: bool,
}

impl SiteProgram {
    /// Create an unbound program.
    #[must_use]
    pub fn new(config: NavConfig, store: Arc<dyn PreferenceStore>) -> Self {
        let controller = NavigationController::new(config);
        let scroll_throttle = Throttle::new(controller.config().scroll_throttle());
        let resize_throttle = Throttle::new(controller.config().resize_throttle());
        Self {
            controller,
            store,
            theme: None,
            reveal: RevealTracker::new(RevealConfig::default()),
            events: WebEventSource::new(),
            clock: DeterministicClock::new(),
            coalescer: EventCoalescer::new(),
            scroll_throttle,
            resize_throttle,
            viewport: Viewport::default(),
            system_dark: false,
            rendered_active: None,
            resized: false,
            outputs: WebOutputs::default(),
            initialized: false,
        }
    }

    /// Bind sections, links and reveal targets.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSnapshot, links: Vec<NavLink>) -> Self {
        self.reveal.sync_layout(&layout.reveal);
        self.controller.bind(layout, links);
        self
    }

    /// Set the viewport applied at [`init`](Self::init).
    #[must_use]
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set the system color-scheme preference seen at [`init`](Self::init).
    #[must_use]
    pub fn with_system_dark(mut self, prefers_dark: bool) -> Self {
        self.system_dark = prefers_dark;
        self
    }

    /// Replace the reveal thresholds, keeping bound targets.
    #[must_use]
    pub fn with_reveal_config(mut self, config: RevealConfig) -> Self {
        let boxes = self.controller.layout().reveal.clone();
        self.reveal = RevealTracker::new(config);
        self.reveal.sync_layout(&boxes);
        self
    }

    /// Load the theme and emit ops bringing the page in line with the
    /// initial viewport.
    ///
    /// Never writes the theme preference.
    pub fn init(&mut self) -> Result<(), WebBackendError> {
        if self.initialized {
            return Err(WebBackendError::AlreadyInitialized);
        }
        self.initialized = true;

        let theme = ThemeManager::load(Arc::clone(&self.store), self.system_dark);
        self.outputs.ops.push(DomOp::SetTheme(theme.theme()));
        self.theme = Some(theme);

        let mut changes = NavChanges::HEADER;
        // Zero width means the host could not read it; assume desktop.
        if self.viewport.width > 0.0 {
            changes |= self.controller.on_viewport_resize(self.viewport.width);
        }
        changes |= self.controller.on_scroll(self.viewport.scroll_y);
        self.emit(changes);
        self.update_reveal();

        tracing::debug!(
            width = self.viewport.width,
            scroll_y = self.viewport.scroll_y,
            bound = self.controller.is_bound(),
            "site program initialized"
        );
        Ok(())
    }

    /// Process pending events, flush due throttles and expire the loading
    /// flag.
    pub fn step(&mut self) -> Result<StepResult, WebBackendError> {
        if !self.initialized {
            return Err(WebBackendError::NotInitialized);
        }
        let ops_before = self.outputs.ops.len();
        self.resized = false;

        let mut events_processed: u32 = 0;
        while let Some(event) = self.events.read_event() {
            events_processed = events_processed.saturating_add(1);
            if let Some(discrete) = self.coalescer.push(event) {
                // Keep discrete events ordered after the motion that preceded them.
                self.flush_coalesced();
                self.handle_discrete(discrete);
            }
        }
        self.flush_coalesced();

        let now = self.clock.now();
        if let Some((width, height)) = self.resize_throttle.poll(now) {
            self.apply_resize(width, height);
        }
        if let Some(offset) = self.scroll_throttle.poll(now) {
            self.apply_scroll(offset);
        }
        let expired = self.controller.poll_loading(now);
        self.emit(expired);

        let ops_emitted = (self.outputs.ops.len() - ops_before).min(u32::MAX as usize) as u32;
        Ok(StepResult {
            events_processed,
            ops_emitted,
            next_deadline: self.next_deadline(),
            resized: self.resized,
        })
    }

    /// Push an event into the queue. Processed on the next [`step`](Self::step).
    pub fn push_event(&mut self, event: Event) {
        self.events.push_event(event);
    }

    /// Advance the deterministic clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the deterministic clock to an absolute time.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Take the captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Read the captured outputs without consuming them.
    #[must_use]
    pub fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    #[must_use]
    pub fn controller(&self) -> &NavigationController {
        &self.controller
    }

    /// Theme manager, once [`init`](Self::init) has run.
    #[must_use]
    pub fn theme(&self) -> Option<&ThemeManager> {
        self.theme.as_ref()
    }

    #[must_use]
    pub fn reveal(&self) -> &RevealTracker {
        &self.reveal
    }

    /// Last applied viewport.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.clock.now()
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Earliest pending throttle or loading deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        [
            self.scroll_throttle.next_deadline(),
            self.resize_throttle.next_deadline(),
            self.controller.loading_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    // --- Private helpers ---

    fn flush_coalesced(&mut self) {
        if !self.coalescer.has_pending() {
            return;
        }
        let now = self.clock.now();
        for event in self.coalescer.flush() {
            match event {
                Event::Layout(layout) => self.apply_layout(layout),
                Event::Resize { width, height } => {
                    if let Some((w, h)) = self.resize_throttle.offer((width, height), now) {
                        self.apply_resize(w, h);
                    } else {
                        tracing::trace!(width, "resize deferred by throttle");
                    }
                }
                Event::Scroll { offset_y } => {
                    if let Some(offset) = self.scroll_throttle.offer(offset_y, now) {
                        self.apply_scroll(offset);
                    } else {
                        tracing::trace!(offset_y, "scroll deferred by throttle");
                    }
                }
                other => self.handle_discrete(other),
            }
        }
    }

    fn handle_discrete(&mut self, event: Event) {
        let now = self.clock.now();
        tracing::trace!(kind = event.kind_str(), ?now, "dispatching event");
        match event {
            Event::LinkActivate { index } => {
                let activation = self.controller.on_link_activate(index, now);
                self.emit(activation.changes);
                if let Some(scroll) = activation.scroll {
                    self.outputs.ops.push(DomOp::ScrollTo {
                        top: scroll.top,
                        smooth: scroll.smooth,
                    });
                }
            }
            Event::MenuToggle => {
                let changes = self.controller.toggle_menu();
                self.emit(changes);
            }
            Event::OverlayClick => {
                let changes = self.controller.on_overlay_click();
                self.emit(changes);
            }
            Event::ThemeToggle => {
                if let Some(theme) = self.theme.as_mut() {
                    let next = theme.toggle();
                    tracing::debug!(theme = next.as_str(), "theme toggled");
                    self.outputs.ops.push(DomOp::SetTheme(next));
                }
            }
            Event::SystemTheme { prefers_dark } => {
                self.system_dark = prefers_dark;
                if let Some(theme) = self.theme.as_mut()
                    && theme.on_system_preference_change(prefers_dark)
                {
                    self.outputs.ops.push(DomOp::SetTheme(theme.theme()));
                }
            }
            Event::Tick => {}
            Event::Scroll { offset_y } => self.apply_scroll(offset_y),
            Event::Resize { width, height } => self.apply_resize(width, height),
            Event::Layout(layout) => self.apply_layout(layout),
        }
    }

    fn apply_scroll(&mut self, offset_y: f64) {
        if !offset_y.is_finite() {
            return;
        }
        self.viewport.scroll_y = offset_y;
        let changes = self.controller.on_scroll(offset_y);
        self.emit(changes);
        self.update_reveal();
    }

    fn apply_resize(&mut self, width: f64, height: f64) {
        if !width.is_finite() || !height.is_finite() {
            return;
        }
        self.viewport.width = width;
        self.viewport.height = height;
        self.resized = true;
        let changes = self.controller.on_viewport_resize(width);
        self.emit(changes);
        self.update_reveal();
    }

    fn apply_layout(&mut self, layout: LayoutSnapshot) {
        self.reveal.sync_layout(&layout.reveal);
        let changes = self.controller.on_layout_change(layout);
        self.emit(changes);
        self.update_reveal();
    }

    fn update_reveal(&mut self) {
        for index in self.reveal.update(&self.viewport) {
            let op = match self.reveal.kind(index) {
                Some(RevealKind::LazyImage) => DomOp::LoadImage { index },
                _ => DomOp::Reveal { index },
            };
            self.outputs.ops.push(op);
        }
    }

    /// Translate a change set into ops.
    ///
    /// The mobile menu is mounted before anything references it and
    /// unmounted only after it has been closed. A freshly mounted menu is
    /// synced to an already open menu state.
    fn emit(&mut self, changes: NavChanges) {
        if changes.is_empty() {
            return;
        }
        let affordance = self.controller.mobile_affordance();
        let ops = &mut self.outputs.ops;

        if changes.contains(NavChanges::AFFORDANCE) && affordance.is_materialized() {
            ops.push(DomOp::MountMobileMenu);
            if self.controller.menu_state().is_open() && !changes.contains(NavChanges::MENU) {
                ops.push(DomOp::SetMenuOpen(true));
            }
        }
        if changes.contains(NavChanges::HEADER) {
            ops.push(DomOp::SetHeaderScrolled(
                self.controller.header_state().is_scrolled(),
            ));
        }
        if changes.contains(NavChanges::HEADER_VISIBILITY) {
            ops.push(DomOp::SetHeaderHidden(
                self.controller.header_visibility().is_hidden(),
            ));
        }
        if changes.intersects(NavChanges::ACTIVE_LINK | NavChanges::LAYOUT) {
            let next = self.controller.active_link();
            if next != self.rendered_active {
                if let Some(index) = self.rendered_active {
                    ops.push(DomOp::SetLinkActive {
                        index,
                        active: false,
                    });
                }
                if let Some(index) = next {
                    ops.push(DomOp::SetLinkActive {
                        index,
                        active: true,
                    });
                }
                self.rendered_active = next;
            }
        }
        if changes.contains(NavChanges::MENU) {
            ops.push(DomOp::SetMenuOpen(self.controller.menu_state().is_open()));
        }
        if changes.contains(NavChanges::AFFORDANCE) && !affordance.is_materialized() {
            ops.push(DomOp::UnmountMobileMenu);
        }
        if changes.contains(NavChanges::LOADING) {
            ops.push(DomOp::SetLoading(self.controller.is_loading()));
        }
    }
}

impl core::fmt::Debug for SiteProgram {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SiteProgram")
            .field("controller", &self.controller)
            .field("store", &self.store.name())
            .field("theme", &self.theme)
            .field("viewport", &self.viewport)
            .field("now", &self.clock.now())
            .field("pending_events", &self.events.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::geometry::{RevealBox, Section};
    use folio_nav::{MemoryStorage, THEME_KEY, Theme};
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn layout() -> LayoutSnapshot {
        LayoutSnapshot::new(vec![
            Section::new("home", 0.0, 800.0),
            Section::new("about", 800.0, 600.0),
            Section::new("work", 1400.0, 1200.0),
        ])
        .with_header_height(70.0)
    }

    fn links() -> Vec<NavLink> {
        vec![
            NavLink::new("#home"),
            NavLink::new("#about"),
            NavLink::new("#work"),
        ]
    }

    fn program(width: f64) -> SiteProgram {
        let mut prog = SiteProgram::new(NavConfig::default(), Arc::new(MemoryStorage::new()))
            .with_layout(layout(), links())
            .with_viewport(Viewport::new(0.0, width, 800.0));
        prog.init().unwrap();
        prog.take_outputs();
        prog
    }

    #[test]
    fn init_emits_initial_state() {
        let mut prog = SiteProgram::new(NavConfig::default(), Arc::new(MemoryStorage::new()))
            .with_layout(layout(), links())
            .with_viewport(Viewport::new(0.0, 600.0, 800.0))
            .with_system_dark(true);
        prog.init().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetTheme(Theme::Dark),
                DomOp::MountMobileMenu,
                DomOp::SetHeaderScrolled(false),
                DomOp::SetLinkActive {
                    index: 0,
                    active: true
                },
            ]
        );
    }

    #[test]
    fn init_twice_is_an_error() {
        let mut prog = program(1280.0);
        assert_eq!(prog.init(), Err(WebBackendError::AlreadyInitialized));
    }

    #[test]
    fn step_before_init_is_an_error() {
        let mut prog = SiteProgram::new(NavConfig::default(), Arc::new(MemoryStorage::new()));
        assert_eq!(prog.step(), Err(WebBackendError::NotInitialized));
    }

    #[test]
    fn scroll_burst_applies_first_then_trailing() {
        let mut prog = program(1280.0);
        prog.advance_time(ms(1000));
        prog.push_event(Event::Scroll { offset_y: 100.0 });
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetHeaderScrolled(true)]);

        prog.advance_time(ms(20));
        prog.push_event(Event::Scroll { offset_y: 400.0 });
        prog.push_event(Event::Scroll { offset_y: 750.0 });
        let result = prog.step().unwrap();
        assert_eq!(result.events_processed, 2);
        assert_eq!(result.ops_emitted, 0);
        assert_eq!(result.next_deadline, Some(ms(1100)));

        prog.set_time(ms(1100));
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetLinkActive {
                    index: 0,
                    active: false
                },
                DomOp::SetLinkActive {
                    index: 1,
                    active: true
                },
            ]
        );
        assert_eq!(prog.viewport().scroll_y, 750.0);
    }

    #[test]
    fn link_click_scrolls_closes_menu_and_flags_loading() {
        let mut prog = program(600.0);
        prog.push_event(Event::MenuToggle);
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetMenuOpen(true)]);

        prog.push_event(Event::LinkActivate { index: 2 });
        let result = prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetMenuOpen(false),
                DomOp::SetLoading(true),
                DomOp::ScrollTo {
                    top: 1310.0,
                    smooth: true
                },
            ]
        );
        assert_eq!(result.next_deadline, Some(ms(1000)));

        prog.advance_time(ms(999));
        prog.step().unwrap();
        assert!(prog.take_outputs().is_empty());

        prog.advance_time(ms(1));
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetLoading(false)]);
        assert_eq!(prog.step().unwrap().next_deadline, None);
    }

    #[test]
    fn resize_across_breakpoint_mounts_and_unmounts() {
        let mut prog = program(1024.0);
        prog.advance_time(ms(500));
        prog.push_event(Event::Resize {
            width: 600.0,
            height: 800.0,
        });
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::MountMobileMenu]);

        prog.push_event(Event::MenuToggle);
        prog.advance_time(ms(200));
        prog.push_event(Event::Resize {
            width: 1024.0,
            height: 800.0,
        });
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetMenuOpen(true),
                DomOp::SetMenuOpen(false),
                DomOp::UnmountMobileMenu,
            ]
        );
    }

    #[test]
    fn menu_opened_on_desktop_is_synced_when_mounted() {
        let mut prog = program(1280.0);
        prog.push_event(Event::MenuToggle);
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetMenuOpen(true)]);

        prog.advance_time(ms(500));
        prog.push_event(Event::Resize {
            width: 600.0,
            height: 800.0,
        });
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![DomOp::MountMobileMenu, DomOp::SetMenuOpen(true)]
        );
        assert!(prog.controller().menu_state().is_open());
    }

    #[test]
    fn resized_reports_only_applied_resizes() {
        let mut prog = program(1280.0);
        prog.advance_time(ms(500));
        prog.push_event(Event::Resize {
            width: 1200.0,
            height: 800.0,
        });
        assert!(prog.step().unwrap().resized);

        prog.advance_time(ms(10));
        prog.push_event(Event::Resize {
            width: 1100.0,
            height: 800.0,
        });
        let deferred = prog.step().unwrap();
        assert!(!deferred.resized);
        assert_eq!(deferred.next_deadline, Some(ms(600)));
        assert_eq!(prog.viewport().width, 1200.0);

        prog.push_event(Event::Scroll { offset_y: 10.0 });
        assert!(!prog.step().unwrap().resized);

        prog.set_time(ms(600));
        assert!(prog.step().unwrap().resized);
        assert_eq!(prog.viewport().width, 1100.0);
        assert!(!prog.step().unwrap().resized);
    }

    #[test]
    fn unknown_width_boots_as_desktop() {
        let mut prog = SiteProgram::new(NavConfig::default(), Arc::new(MemoryStorage::new()));
        prog.init().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![DomOp::SetTheme(Theme::Light), DomOp::SetHeaderScrolled(false)]
        );
        assert!(!prog.controller().mobile_affordance().is_materialized());
    }

    #[test]
    fn discrete_events_see_preceding_motion() {
        let mut prog = program(600.0);
        prog.advance_time(ms(500));
        prog.push_event(Event::MenuToggle);
        prog.push_event(Event::Resize {
            width: 1280.0,
            height: 800.0,
        });
        prog.push_event(Event::MenuToggle);
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetMenuOpen(true),
                DomOp::SetMenuOpen(false),
                DomOp::UnmountMobileMenu,
                DomOp::SetMenuOpen(true),
            ]
        );
    }

    #[test]
    fn theme_toggle_persists_and_system_is_ignored_after() {
        let store = Arc::new(MemoryStorage::new());
        let mut prog = SiteProgram::new(NavConfig::default(), store.clone())
            .with_viewport(Viewport::new(0.0, 1280.0, 800.0));
        prog.init().unwrap();
        prog.take_outputs();
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        prog.push_event(Event::SystemTheme { prefers_dark: true });
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetTheme(Theme::Dark)]);
        assert_eq!(store.get(THEME_KEY).unwrap(), None);

        prog.push_event(Event::ThemeToggle);
        prog.push_event(Event::SystemTheme { prefers_dark: true });
        prog.step().unwrap();
        assert_eq!(prog.take_outputs().ops, vec![DomOp::SetTheme(Theme::Light)]);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn layout_change_reveals_and_respies() {
        let mut prog = program(1280.0);
        let relaid = layout().with_reveal(vec![
            RevealBox::new(200.0, 100.0, RevealKind::Animate),
            RevealBox::new(780.0, 300.0, RevealKind::LazyImage),
            RevealBox::new(3000.0, 100.0, RevealKind::Animate),
        ]);
        prog.push_event(Event::Layout(relaid));
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![DomOp::Reveal { index: 0 }, DomOp::LoadImage { index: 1 }]
        );
        assert_eq!(prog.reveal().pending(), 1);

        // Shrinking home moves the spy position into about.
        let shifted = LayoutSnapshot::new(vec![
            Section::new("home", 0.0, 50.0),
            Section::new("about", 50.0, 600.0),
        ]);
        prog.push_event(Event::Layout(shifted));
        prog.step().unwrap();
        assert_eq!(
            prog.take_outputs().ops,
            vec![
                DomOp::SetLinkActive {
                    index: 0,
                    active: false
                },
                DomOp::SetLinkActive {
                    index: 1,
                    active: true
                },
            ]
        );
    }

    #[test]
    fn non_finite_scroll_is_ignored() {
        let mut prog = program(1280.0);
        prog.advance_time(ms(500));
        prog.push_event(Event::Scroll {
            offset_y: f64::NAN,
        });
        prog.step().unwrap();
        assert!(prog.take_outputs().is_empty());
        assert_eq!(prog.viewport().scroll_y, 0.0);
    }
}

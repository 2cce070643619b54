#![forbid(unsafe_code)]

use std::sync::Arc;

use folio_core::event::Event;
use folio_core::geometry::{LayoutSnapshot, RevealBox, RevealKind, Section, Viewport};
use folio_nav::{NavLink, PreferenceStore, StorageError, StorageResult, Theme};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};
use web_time::Instant;

use crate::step_program::SiteProgram;
use crate::{DomOp, SiteOptions, WebBackendError};

const DARK_SCHEME_QUERY: &str = "(prefers-color-scheme: dark)";
const MENU_BUTTON_CLASS: &str = "mobile-menu-btn";
const MENU_CLASS: &str = "mobile-menu";
const MENU_LINKS_CLASS: &str = "mobile-nav-links";

/// `window.localStorage` as a preference store.
///
/// Looks the storage object up on every call so the adapter itself stays
/// `Send + Sync`. Private browsing modes that throw on access surface as
/// [`StorageError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
struct LocalStorage;

impl LocalStorage {
    fn storage() -> StorageResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

impl PreferenceStore for LocalStorage {
    fn name(&self) -> &str {
        "LocalStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn is_available(&self) -> bool {
        Self::storage().is_ok()
    }
}

fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn to_js(err: WebBackendError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Elements resolved once at `init`.
struct PageElements {
    root: Option<Element>,
    body: Option<HtmlElement>,
    header: Option<Element>,
    nav_container: Option<Element>,
    nav_list: Option<Element>,
    theme_toggle: Option<Element>,
    theme_meta: Option<Element>,
    links: Vec<Element>,
    reveal: Vec<Element>,
    mobile_button: Option<Element>,
    mobile_menu: Option<Element>,
}

/// Site navigation bound to the live document.
///
/// The page owns its listeners and forwards them here:
///
/// ```text
/// const site = new FolioSite(JSON.stringify({ nav: { breakpoint_px: 768 } }));
/// site.init();
/// addEventListener("scroll", () => site.scroll(scrollY));
/// addEventListener("resize", () => site.resize(innerWidth, innerHeight));
/// document.addEventListener("click", (e) => site.click(e.target));
/// ```
///
/// Each forwarding call steps the program and applies the resulting
/// mutations. Calls return the delay in milliseconds after which `tick()`
/// should run again, or `undefined` when nothing is pending.
#[wasm_bindgen]
pub struct FolioSite {
    options: SiteOptions,
    program: Option<SiteProgram>,
    page: Option<PageElements>,
    started: Instant,
}

#[wasm_bindgen]
impl FolioSite {
    /// Parse options (a JSON string, or nothing for defaults).
    #[wasm_bindgen(constructor)]
    pub fn new(options: Option<String>) -> Result<FolioSite, JsValue> {
        let options = SiteOptions::from_json(options.as_deref().unwrap_or_default()).map_err(to_js)?;
        Ok(Self {
            options,
            program: None,
            page: None,
            started: Instant::now(),
        })
    }

    /// Measure the document, load the theme and apply the initial state.
    pub fn init(&mut self) -> Result<Option<f64>, JsValue> {
        if self.program.is_some() {
            return Err(to_js(WebBackendError::AlreadyInitialized));
        }
        let window = window()?;
        let document = document(&window)?;
        let page = self.collect_elements(&document);
        let layout = measure_layout(&window, &document, &self.options, &page);
        let links = page
            .links
            .iter()
            .map(|el| NavLink::new(el.get_attribute("href").unwrap_or_default()))
            .collect();
        let system_dark = window
            .match_media(DARK_SCHEME_QUERY)
            .ok()
            .flatten()
            .is_some_and(|mq| mq.matches());

        let mut program = SiteProgram::new(self.options.nav.clone(), Arc::new(LocalStorage))
            .with_reveal_config(self.options.reveal)
            .with_layout(layout, links)
            .with_viewport(viewport(&window))
            .with_system_dark(system_dark);
        program.set_time(self.elapsed());
        program.init().map_err(to_js)?;

        self.page = Some(page);
        self.program = Some(program);
        self.flush(&document)
    }

    /// Forward a window scroll.
    pub fn scroll(&mut self, offset_y: f64) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::Scroll { offset_y })
    }

    /// Forward a window resize. The layout is re-measured once the resize
    /// gets past the throttle.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::Resize { width, height })
    }

    /// Re-measure sections and reveal targets after content changed.
    pub fn relayout(&mut self) -> Result<Option<f64>, JsValue> {
        let window = window()?;
        let document = document(&window)?;
        if let Some(page) = self.page.as_ref() {
            let layout = measure_layout(&window, &document, &self.options, page);
            self.enqueue(Event::Layout(layout));
        }
        self.dispatch(Event::Tick)
    }

    /// Route a document click.
    ///
    /// Nav links (desktop or mobile copies), the hamburger button, the
    /// overlay backdrop and the theme toggle are recognized; other targets
    /// are ignored. Returns `true` when the click was handled and the default
    /// action should be prevented.
    pub fn click(&mut self, target: Element) -> Result<bool, JsValue> {
        let Some(event) = self.classify_click(&target) else {
            return Ok(false);
        };
        let prevent = matches!(event, Event::LinkActivate { .. });
        self.dispatch(event)?;
        Ok(prevent)
    }

    /// Activate the nav link at `index`.
    #[wasm_bindgen(js_name = activateLink)]
    pub fn activate_link(&mut self, index: usize) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::LinkActivate { index })
    }

    #[wasm_bindgen(js_name = toggleMenu)]
    pub fn toggle_menu(&mut self) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::MenuToggle)
    }

    #[wasm_bindgen(js_name = toggleTheme)]
    pub fn toggle_theme(&mut self) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::ThemeToggle)
    }

    /// Forward a `prefers-color-scheme` change.
    #[wasm_bindgen(js_name = systemTheme)]
    pub fn system_theme(&mut self, prefers_dark: bool) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::SystemTheme { prefers_dark })
    }

    /// Release throttled values and expire the loading flag.
    pub fn tick(&mut self) -> Result<Option<f64>, JsValue> {
        self.dispatch(Event::Tick)
    }

    /// Drop element references and stop processing.
    pub fn destroy(&mut self) {
        self.program = None;
        self.page = None;
    }
}

impl FolioSite {
    fn elapsed(&self) -> core::time::Duration {
        self.started.elapsed()
    }

    fn enqueue(&mut self, event: Event) {
        if let Some(program) = self.program.as_mut() {
            program.push_event(event);
        }
    }

    fn dispatch(&mut self, event: Event) -> Result<Option<f64>, JsValue> {
        if self.program.is_none() {
            return Err(to_js(WebBackendError::NotInitialized));
        }
        self.enqueue(event);
        let document = document(&window()?)?;
        self.flush(&document)
    }

    fn flush(&mut self, document: &Document) -> Result<Option<f64>, JsValue> {
        let now = self.elapsed();
        let Some(program) = self.program.as_mut() else {
            return Err(to_js(WebBackendError::NotInitialized));
        };
        program.set_time(now);
        let mut result = program.step().map_err(to_js)?;
        apply_outputs(document, self.page.as_mut(), program);

        if result.resized
            && let Some(page) = self.page.as_ref()
        {
            let layout = measure_layout(&window()?, document, &self.options, page);
            program.push_event(Event::Layout(layout));
            result = program.step().map_err(to_js)?;
            apply_outputs(document, self.page.as_mut(), program);
        }
        Ok(result
            .next_deadline
            .map(|deadline| deadline.saturating_sub(now).as_secs_f64() * 1000.0))
    }

    fn collect_elements(&self, document: &Document) -> PageElements {
        let sel = &self.options.selectors;
        let mut reveal = query_all(document, &sel.animate);
        reveal.extend(query_all(document, &sel.lazy_images));
        PageElements {
            root: document.document_element(),
            body: document.body(),
            header: query(document, &sel.header),
            nav_container: query(document, &sel.nav_container),
            nav_list: query(document, &sel.nav_list),
            theme_toggle: query(document, &sel.theme_toggle),
            theme_meta: query(document, &sel.theme_meta),
            links: query_all(document, &sel.nav_links),
            reveal,
            mobile_button: None,
            mobile_menu: None,
        }
    }

    fn classify_click(&self, target: &Element) -> Option<Event> {
        let page = self.page.as_ref()?;
        if let Some(menu) = page.mobile_menu.as_ref()
            && target == menu
        {
            return Some(Event::OverlayClick);
        }
        if closest(target, &format!(".{MENU_BUTTON_CLASS}")).is_some() {
            return Some(Event::MenuToggle);
        }
        if page.theme_toggle.is_some()
            && closest(target, &self.options.selectors.theme_toggle).is_some()
        {
            return Some(Event::ThemeToggle);
        }
        let anchor = closest(target, "a[href]")?;
        let href = anchor.get_attribute("href")?;
        let index = self.program.as_ref()?.controller().link_index(&href)?;
        Some(Event::LinkActivate { index })
    }
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| to_js(WebBackendError::Dom("no window".into())))
}

fn document(window: &Window) -> Result<Document, JsValue> {
    window
        .document()
        .ok_or_else(|| to_js(WebBackendError::Dom("no document".into())))
}

fn query(document: &Document, selector: &str) -> Option<Element> {
    document.query_selector(selector).ok().flatten()
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(selector) else {
        tracing::warn!(selector, "invalid selector");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn closest(target: &Element, selector: &str) -> Option<Element> {
    target.closest(selector).ok().flatten()
}

fn viewport(window: &Window) -> Viewport {
    let px = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(
        window.scroll_y().unwrap_or(0.0),
        px(window.inner_width()),
        px(window.inner_height()),
    )
}

fn document_top(element: &Element, scroll_y: f64) -> (f64, f64) {
    let rect = element.get_bounding_client_rect();
    (rect.top() + scroll_y, rect.height())
}

fn measure_layout(
    window: &Window,
    document: &Document,
    options: &SiteOptions,
    page: &PageElements,
) -> LayoutSnapshot {
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let sections = query_all(document, &options.selectors.sections)
        .iter()
        .filter(|el| !el.id().is_empty())
        .map(|el| {
            let (top, height) = document_top(el, scroll_y);
            Section::new(el.id(), top, height)
        })
        .collect();
    let header_height = page
        .header
        .as_ref()
        .map_or(0.0, |el| el.get_bounding_client_rect().height());
    let reveal = page
        .reveal
        .iter()
        .map(|el| {
            let (top, height) = document_top(el, scroll_y);
            let kind = if el.has_attribute("data-src") {
                RevealKind::LazyImage
            } else {
                RevealKind::Animate
            };
            RevealBox::new(top, height, kind)
        })
        .collect();
    LayoutSnapshot::new(sections)
        .with_header_height(header_height)
        .with_reveal(reveal)
}

fn apply_outputs(
    document: &Document,
    page: Option<&mut PageElements>,
    program: &mut SiteProgram,
) {
    let outputs = program.take_outputs();
    let Some(page) = page else {
        return;
    };
    outputs.apply_each(|op| apply_op(document, page, op).map_err(|err| js_message(&err)));
}

/// Anchor in the mobile overlay with exactly this href.
fn overlay_copy(menu: &Element, href: &str) -> Option<Element> {
    let anchors = menu.query_selector_all("a").ok()?;
    (0..anchors.length())
        .filter_map(|i| anchors.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .find(|anchor| anchor.get_attribute("href").as_deref() == Some(href))
}

fn set_class(element: Option<&Element>, class: &str, on: bool) -> Result<(), JsValue> {
    if let Some(el) = element {
        el.class_list().toggle_with_force(class, on)?;
    }
    Ok(())
}

fn apply_op(document: &Document, page: &mut PageElements, op: DomOp) -> Result<(), JsValue> {
    match op {
        DomOp::SetLinkActive { index, active } => {
            set_class(page.links.get(index), "active", active)?;
            // Mirror onto the overlay copy, which holds the same hrefs.
            if let (Some(menu), Some(link)) = (page.mobile_menu.as_ref(), page.links.get(index))
                && let Some(href) = link.get_attribute("href")
            {
                set_class(overlay_copy(menu, &href).as_ref(), "active", active)?;
            }
        }
        DomOp::SetHeaderScrolled(on) => set_class(page.header.as_ref(), "scrolled", on)?,
        DomOp::SetHeaderHidden(hidden) => {
            if let Some(header) = page.header.as_ref().and_then(|h| h.dyn_ref::<HtmlElement>()) {
                let transform = if hidden { "translateY(-100%)" } else { "translateY(0)" };
                header.style().set_property("transform", transform)?;
            }
        }
        DomOp::SetMenuOpen(open) => {
            set_class(page.mobile_menu.as_ref(), "active", open)?;
            set_class(page.mobile_button.as_ref(), "active", open)?;
            if let Some(body) = page.body.as_ref() {
                body.class_list().toggle_with_force("menu-open", open)?;
            }
        }
        DomOp::MountMobileMenu => mount_mobile_menu(document, page)?,
        DomOp::UnmountMobileMenu => {
            if let Some(button) = page.mobile_button.take() {
                button.remove();
            }
            if let Some(menu) = page.mobile_menu.take() {
                menu.remove();
            }
        }
        DomOp::ScrollTo { top, smooth } => {
            let opts = ScrollToOptions::new();
            opts.set_top(top);
            opts.set_behavior(if smooth {
                ScrollBehavior::Smooth
            } else {
                ScrollBehavior::Auto
            });
            window()?.scroll_to_with_scroll_to_options(&opts);
        }
        DomOp::SetLoading(on) => {
            if let Some(body) = page.body.as_ref() {
                body.class_list().toggle_with_force("loading", on)?;
            }
        }
        DomOp::SetTheme(theme) => apply_theme(page, theme)?,
        DomOp::Reveal { index } => {
            set_class(page.reveal.get(index), "animate-in", true)?;
        }
        DomOp::LoadImage { index } => {
            if let Some(img) = page.reveal.get(index)
                && let Some(src) = img.get_attribute("data-src")
            {
                img.set_attribute("src", &src)?;
                img.remove_attribute("data-src")?;
            }
        }
    }
    Ok(())
}

fn apply_theme(page: &PageElements, theme: Theme) -> Result<(), JsValue> {
    if let Some(root) = page.root.as_ref() {
        root.set_attribute("data-theme", theme.as_str())?;
    }
    if let Some(meta) = page.theme_meta.as_ref() {
        meta.set_attribute("content", theme.meta_color())?;
    }
    if let Some(toggle) = page.theme_toggle.as_ref() {
        toggle.set_attribute("aria-label", theme.toggle_label())?;
    }
    Ok(())
}

fn mount_mobile_menu(document: &Document, page: &mut PageElements) -> Result<(), JsValue> {
    if page.mobile_button.is_some() {
        return Ok(());
    }
    let (Some(container), Some(body)) = (page.nav_container.as_ref(), page.body.as_ref()) else {
        tracing::warn!("mobile menu skipped: nav container or body missing");
        return Ok(());
    };

    let button = document.create_element("button")?;
    button.set_class_name(MENU_BUTTON_CLASS);
    button.set_inner_html("<span></span><span></span><span></span>");
    button.set_attribute("aria-label", "Toggle navigation menu")?;

    let menu = document.create_element("div")?;
    menu.set_class_name(MENU_CLASS);
    if let Some(list) = page.nav_list.as_ref() {
        let copy = list.clone_node_with_deep(true)?;
        if let Some(copy) = copy.dyn_ref::<Element>() {
            copy.set_class_name(MENU_LINKS_CLASS);
        }
        menu.append_child(&copy)?;
    }

    container.append_child(&button)?;
    body.append_child(&menu)?;
    page.mobile_button = Some(button);
    page.mobile_menu = Some(menu);
    Ok(())
}

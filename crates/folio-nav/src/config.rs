#![forbid(unsafe_code)]

//! Navigation configuration.
//!
//! Every constant the page scripts used to hard-code (breakpoint, lookahead,
//! header threshold, throttle intervals) lives here. Defaults are the
//! canonical values; hosts override them with the `with_*` builders, from the
//! environment ([`NavConfig::from_env`]), or from JSON with the `serde`
//! feature.

use core::time::Duration;
use std::str::FromStr;

/// Environment variable names read by [`NavConfig::from_env`].
pub mod env {
    pub const BREAKPOINT_PX: &str = "FOLIO_BREAKPOINT_PX";
    pub const LOOKAHEAD_PX: &str = "FOLIO_LOOKAHEAD_PX";
    pub const HEADER_THRESHOLD_PX: &str = "FOLIO_HEADER_THRESHOLD_PX";
    pub const SCROLL_MARGIN_PX: &str = "FOLIO_SCROLL_MARGIN_PX";
    pub const HIDE_ON_SCROLL: &str = "FOLIO_HIDE_ON_SCROLL";
    pub const HIDE_THRESHOLD_PX: &str = "FOLIO_HIDE_THRESHOLD_PX";
    pub const LOADING_MS: &str = "FOLIO_LOADING_MS";
    pub const SCROLL_THROTTLE_MS: &str = "FOLIO_SCROLL_THROTTLE_MS";
    pub const RESIZE_THROTTLE_MS: &str = "FOLIO_RESIZE_THROTTLE_MS";
}

/// Configuration for the navigation controller and its host runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NavConfig {
    /// Viewport widths at or below this use the mobile menu.
    pub breakpoint_px: f64,

    /// Added to the scroll offset before scroll-spy lookup, compensating for
    /// the fixed header covering the top of the viewport.
    pub lookahead_px: f64,

    /// Header is `Scrolled` strictly above this offset.
    pub header_threshold_px: f64,

    /// Extra gap kept above a section when scrolling to it from a link.
    pub scroll_margin_px: f64,

    /// Hide the header while scrolling down, show it while scrolling up.
    pub hide_on_scroll_down: bool,

    /// Offset above which hide-on-scroll-down applies.
    pub hide_threshold_px: f64,

    /// How long the transient loading flag stays raised after a link click (ms).
    pub loading_ms: u64,

    /// Minimum spacing between scroll recomputations (ms).
    pub scroll_throttle_ms: u64,

    /// Minimum spacing between resize recomputations (ms).
    pub resize_throttle_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            breakpoint_px: 768.0,
            lookahead_px: 100.0,
            header_threshold_px: 50.0,
            scroll_margin_px: 20.0,
            hide_on_scroll_down: false,
            hide_threshold_px: 100.0,
            loading_ms: 1000,
            scroll_throttle_ms: 100,
            resize_throttle_ms: 100,
        }
    }
}

impl NavConfig {
    /// Set the mobile breakpoint.
    #[must_use]
    pub fn with_breakpoint(mut self, px: f64) -> Self {
        self.breakpoint_px = px;
        self
    }

    /// Set the scroll-spy lookahead.
    #[must_use]
    pub fn with_lookahead(mut self, px: f64) -> Self {
        self.lookahead_px = px;
        self
    }

    /// Set the header scroll threshold.
    #[must_use]
    pub fn with_header_threshold(mut self, px: f64) -> Self {
        self.header_threshold_px = px;
        self
    }

    /// Set the gap kept above a section when navigating to it.
    #[must_use]
    pub fn with_scroll_margin(mut self, px: f64) -> Self {
        self.scroll_margin_px = px;
        self
    }

    /// Enable hide-on-scroll-down with the given threshold.
    #[must_use]
    pub fn with_hide_on_scroll_down(mut self, threshold_px: f64) -> Self {
        self.hide_on_scroll_down = true;
        self.hide_threshold_px = threshold_px;
        self
    }

    /// Set the loading flag duration.
    #[must_use]
    pub fn with_loading(mut self, duration: Duration) -> Self {
        self.loading_ms = duration_ms(duration);
        self
    }

    /// Set scroll and resize throttle intervals.
    #[must_use]
    pub fn with_throttle(mut self, scroll: Duration, resize: Duration) -> Self {
        self.scroll_throttle_ms = duration_ms(scroll);
        self.resize_throttle_ms = duration_ms(resize);
        self
    }

    /// Loading flag duration.
    #[must_use]
    pub const fn loading_duration(&self) -> Duration {
        Duration::from_millis(self.loading_ms)
    }

    /// Scroll throttle interval.
    #[must_use]
    pub const fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    /// Resize throttle interval.
    #[must_use]
    pub const fn resize_throttle(&self) -> Duration {
        Duration::from_millis(self.resize_throttle_ms)
    }

    /// Read overrides from the process environment on top of the defaults.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_with(&lookup, env::BREAKPOINT_PX, &mut config.breakpoint_px);
        override_with(&lookup, env::LOOKAHEAD_PX, &mut config.lookahead_px);
        override_with(
            &lookup,
            env::HEADER_THRESHOLD_PX,
            &mut config.header_threshold_px,
        );
        override_with(&lookup, env::SCROLL_MARGIN_PX, &mut config.scroll_margin_px);
        override_with(&lookup, env::HIDE_ON_SCROLL, &mut config.hide_on_scroll_down);
        override_with(
            &lookup,
            env::HIDE_THRESHOLD_PX,
            &mut config.hide_threshold_px,
        );
        override_with(&lookup, env::LOADING_MS, &mut config.loading_ms);
        override_with(
            &lookup,
            env::SCROLL_THROTTLE_MS,
            &mut config.scroll_throttle_ms,
        );
        override_with(
            &lookup,
            env::RESIZE_THROTTLE_MS,
            &mut config.resize_throttle_ms,
        );
        config
    }

    /// Replace non-finite or negative pixel values with defaults.
    #[must_use]
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            breakpoint_px: sane_px("breakpoint_px", self.breakpoint_px, defaults.breakpoint_px),
            lookahead_px: sane_px("lookahead_px", self.lookahead_px, defaults.lookahead_px),
            header_threshold_px: sane_px(
                "header_threshold_px",
                self.header_threshold_px,
                defaults.header_threshold_px,
            ),
            scroll_margin_px: sane_px(
                "scroll_margin_px",
                self.scroll_margin_px,
                defaults.scroll_margin_px,
            ),
            hide_threshold_px: sane_px(
                "hide_threshold_px",
                self.hide_threshold_px,
                defaults.hide_threshold_px,
            ),
            ..self
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn sane_px(field: &'static str, value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        tracing::warn!(field, value, fallback, "invalid pixel value, using default");
        fallback
    }
}

fn override_with<F, T>(lookup: &F, key: &'static str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => {
            tracing::warn!(key, raw = %raw, "ignoring unparseable config override");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_canonical() {
        let c = NavConfig::default();
        assert_eq!(c.breakpoint_px, 768.0);
        assert_eq!(c.lookahead_px, 100.0);
        assert_eq!(c.header_threshold_px, 50.0);
        assert_eq!(c.scroll_margin_px, 20.0);
        assert_eq!(c.loading_duration(), Duration::from_millis(1000));
        assert_eq!(c.scroll_throttle(), Duration::from_millis(100));
        assert!(!c.hide_on_scroll_down);
    }

    #[test]
    fn builders_chain() {
        let c = NavConfig::default()
            .with_breakpoint(900.0)
            .with_lookahead(150.0)
            .with_header_threshold(100.0)
            .with_scroll_margin(0.0)
            .with_hide_on_scroll_down(120.0)
            .with_loading(Duration::from_millis(250))
            .with_throttle(Duration::from_millis(16), Duration::from_millis(50));
        assert_eq!(c.breakpoint_px, 900.0);
        assert_eq!(c.lookahead_px, 150.0);
        assert_eq!(c.header_threshold_px, 100.0);
        assert_eq!(c.scroll_margin_px, 0.0);
        assert!(c.hide_on_scroll_down);
        assert_eq!(c.hide_threshold_px, 120.0);
        assert_eq!(c.loading_ms, 250);
        assert_eq!(c.scroll_throttle_ms, 16);
        assert_eq!(c.resize_throttle_ms, 50);
    }

    #[test]
    fn lookup_overrides_known_keys() {
        let c = NavConfig::from_lookup(lookup_from(&[
            (env::BREAKPOINT_PX, "1024"),
            (env::LOOKAHEAD_PX, " 150 "),
            (env::HIDE_ON_SCROLL, "true"),
            (env::SCROLL_THROTTLE_MS, "16"),
        ]));
        assert_eq!(c.breakpoint_px, 1024.0);
        assert_eq!(c.lookahead_px, 150.0);
        assert!(c.hide_on_scroll_down);
        assert_eq!(c.scroll_throttle_ms, 16);
        assert_eq!(c.header_threshold_px, 50.0);
    }

    #[test]
    fn lookup_ignores_garbage() {
        let c = NavConfig::from_lookup(lookup_from(&[
            (env::BREAKPOINT_PX, "wide"),
            (env::LOADING_MS, "-5"),
        ]));
        assert_eq!(c, NavConfig::default());
    }

    #[test]
    fn normalized_repairs_bad_pixels() {
        let c = NavConfig {
            breakpoint_px: f64::NAN,
            lookahead_px: -10.0,
            header_threshold_px: f64::INFINITY,
            ..NavConfig::default()
        }
        .normalized();
        assert_eq!(c.breakpoint_px, 768.0);
        assert_eq!(c.lookahead_px, 100.0);
        assert_eq!(c.header_threshold_px, 50.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let c: NavConfig =
            serde_json::from_str(r#"{"breakpoint_px": 600, "loading_ms": 500}"#).unwrap();
        assert_eq!(c.breakpoint_px, 600.0);
        assert_eq!(c.loading_ms, 500);
        assert_eq!(c.lookahead_px, 100.0);
    }
}

#![forbid(unsafe_code)]

//! Light/dark theme selection and persistence.
//!
//! The stored preference is read once at startup and written only when the
//! user toggles. Until the user has chosen (or a stored choice exists), the
//! theme follows the system color-scheme preference.

use std::fmt;
use std::sync::Arc;

use crate::state_persistence::PreferenceStore;

/// Storage key holding the persisted theme.
pub const THEME_KEY: &str = "theme";

/// Site color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Canonical persisted and `data-theme` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parse a stored value. Accepts the legacy `*-mode` spellings.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" | "light-mode" => Some(Self::Light),
            "dark" | "dark-mode" => Some(Self::Dark),
            _ => None,
        }
    }

    /// Theme matching a system color-scheme preference.
    #[must_use]
    pub const fn from_system(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }

    /// The other theme.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    /// `<meta name="theme-color">` content.
    #[must_use]
    pub const fn meta_color(self) -> &'static str {
        match self {
            Self::Light => "#FFFFFF",
            Self::Dark => "#000000",
        }
    }

    /// Accessible label for the toggle control while this theme is active.
    #[must_use]
    pub const fn toggle_label(self) -> &'static str {
        match self {
            Self::Light => "Switch to dark theme",
            Self::Dark => "Switch to light theme",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the current theme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    /// Read from storage at startup.
    Stored,
    /// Following the system preference.
    System,
    /// Chosen by the user this session.
    User,
}

/// Owns the active theme and its persistence.
pub struct ThemeManager {
    store: Arc<dyn PreferenceStore>,
    theme: Theme,
    source: ThemeSource,
}

impl ThemeManager {
    /// Read the stored preference once, falling back to the system preference.
    ///
    /// Never writes to the store.
    pub fn load(store: Arc<dyn PreferenceStore>, system_prefers_dark: bool) -> Self {
        let stored = match store.get(THEME_KEY) {
            Ok(Some(raw)) => {
                let parsed = Theme::parse(&raw);
                if parsed.is_none() {
                    tracing::warn!(value = %raw, "ignoring unrecognized stored theme");
                }
                parsed
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(store = store.name(), error = %err, "theme preference unreadable");
                None
            }
        };

        let (theme, source) = match stored {
            Some(theme) => (theme, ThemeSource::Stored),
            None => (Theme::from_system(system_prefers_dark), ThemeSource::System),
        };
        tracing::debug!(theme = theme.as_str(), ?source, "theme loaded");
        Self {
            store,
            theme,
            source,
        }
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub const fn source(&self) -> ThemeSource {
        self.source
    }

    /// Whether a stored or user choice overrides the system preference.
    #[must_use]
    pub const fn has_explicit_preference(&self) -> bool {
        !matches!(self.source, ThemeSource::System)
    }

    /// Flip the theme and persist it.
    pub fn toggle(&mut self) -> Theme {
        self.set(self.theme.toggled())
    }

    /// Apply a user-chosen theme and persist it.
    ///
    /// A storage failure is logged; the in-memory theme still changes.
    pub fn set(&mut self, theme: Theme) -> Theme {
        self.theme = theme;
        self.source = ThemeSource::User;
        if let Err(err) = self.store.set(THEME_KEY, theme.as_str()) {
            tracing::warn!(
                store = self.store.name(),
                error = %err,
                "failed to persist theme preference"
            );
        }
        theme
    }

    /// Follow a system preference change unless the user has chosen.
    ///
    /// Returns `true` if the active theme changed.
    pub fn on_system_preference_change(&mut self, prefers_dark: bool) -> bool {
        if self.has_explicit_preference() {
            return false;
        }
        let next = Theme::from_system(prefers_dark);
        let changed = next != self.theme;
        self.theme = next;
        changed
    }
}

impl fmt::Debug for ThemeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeManager")
            .field("store", &self.store.name())
            .field("theme", &self.theme)
            .field("source", &self.source)
            .finish()
    }
}

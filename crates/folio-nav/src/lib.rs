#![forbid(unsafe_code)]

//! Folio Navigation
//!
//! State machines behind a single-page portfolio's chrome: which nav link is
//! highlighted, whether the sticky header looks scrolled, whether the mobile
//! menu is open, which theme is active, and which elements have faded in.
//!
//! # Key Components
//!
//! - [`NavigationController`] - scroll-spy, header, menu, and link scrolling
//! - [`ThemeManager`] - light/dark theme with one persisted key
//! - [`RevealTracker`] - one-shot reveal for animated elements and lazy images
//! - [`PreferenceStore`] - pluggable key/value storage for preferences
//!
//! # Role in Folio
//! `folio-nav` consumes measured facts from `folio-core` and answers with
//! [`NavChanges`] sets. It never touches a DOM; `folio-web` turns those sets
//! into page mutations.

pub mod config;
pub mod controller;
pub mod header;
pub mod menu;
pub mod reveal;
pub mod scroll_spy;
pub mod state_persistence;
pub mod theme;

pub use config::NavConfig;
pub use controller::{LinkActivation, NavChanges, NavigationController, ScrollRequest};
pub use header::{HeaderScrollState, HeaderVisibility};
pub use menu::{MenuState, MobileAffordance};
pub use reveal::{RevealConfig, RevealTracker};
pub use scroll_spy::NavLink;
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use state_persistence::{MemoryStorage, PreferenceStore, StorageError, StorageResult};
pub use theme::{THEME_KEY, Theme, ThemeManager, ThemeSource};

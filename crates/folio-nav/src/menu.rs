#![forbid(unsafe_code)]

//! Mobile menu state.

/// Open/closed state of the overlay menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuState {
    #[default]
    Closed,
    Open,
}

impl MenuState {
    /// The opposite state.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Closed => Self::Open,
            Self::Open => Self::Closed,
        }
    }

    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
        }
    }
}

/// Whether the hamburger button and overlay exist in the page.
///
/// Built lazily the first time the viewport narrows to the breakpoint and
/// torn down when it widens past it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MobileAffordance {
    #[default]
    Absent,
    Materialized,
}

impl MobileAffordance {
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::Materialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggled_is_an_involution() {
        for s in [MenuState::Closed, MenuState::Open] {
            assert_eq!(s.toggled().toggled(), s);
            assert_ne!(s.toggled(), s);
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(MenuState::default(), MenuState::Closed);
        assert!(!MobileAffordance::default().is_materialized());
        assert_eq!(MenuState::Open.as_str(), "open");
    }
}

#![forbid(unsafe_code)]

//! Tracing subscriber setup for native hosts.
//!
//! Library code only emits `tracing` events. Binaries, test harnesses, and
//! native replay tools call [`init_subscriber`] (feature `subscriber`) to get
//! formatted output filtered by the `FOLIO_LOG` environment variable. With the
//! `tracing-json` feature the output is JSON lines.
//!
//! On `wasm32` no subscriber is installed by this crate; events are dropped
//! unless the embedding page installs one.

/// Environment variable holding the `EnvFilter` directive.
pub const LOG_ENV: &str = "FOLIO_LOG";

/// Directive used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Build the filter from [`LOG_ENV`], falling back to [`DEFAULT_DIRECTIVE`].
#[cfg(feature = "subscriber")]
#[must_use]
pub fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber.
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "subscriber")]
pub fn init_subscriber() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true);

    #[cfg(feature = "tracing-json")]
    let result = builder.json().try_init();
    #[cfg(not(feature = "tracing-json"))]
    let result = builder.try_init();

    result.map_err(Into::into)
}

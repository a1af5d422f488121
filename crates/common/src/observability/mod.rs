//! Tracing initialisation
//!
//! Library code only emits `tracing` events. Binaries, demos and tests that
//! want to see them install a subscriber once through [`init_tracing`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter applied when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name (`pretty`/`console` or `json`), case-insensitive.
    ///
    /// Unknown names fall back to [`LogFormat::Pretty`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Install the global tracing subscriber.
///
/// The filter comes from `RUST_LOG`, defaulting to [`DEFAULT_FILTER`].
///
/// # Errors
/// Returns [`TryInitError`] if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), TryInitError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry().with(filter).with(fmt::layer().json()).try_init()
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(filter).with(fmt::layer().pretty()).try_init()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(LogFormat::from_name("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_name("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("console"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_name("something"), LogFormat::Pretty);
    }

    #[test]
    fn second_init_is_an_error_not_a_panic() {
        let _ = init_tracing(LogFormat::Pretty);
        assert!(init_tracing(LogFormat::Json).is_err());
    }
}

//! Logging initialization

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Default filter for the development profile
pub const DEVELOPMENT_FILTER: &str = "equivex=debug";
/// Default filter for the production profile
pub const PRODUCTION_FILTER: &str = "equivex=info";

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode; the capture layer itself is installed by `init_test_capture()`
    Test,
}

impl Profile {
    fn default_filter(self) -> &'static str {
        match self {
            Profile::Development | Profile::Test => DEVELOPMENT_FILTER,
            Profile::Production => PRODUCTION_FILTER,
        }
    }
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Idempotent: only the first call installs a subscriber. `RUST_LOG`
/// overrides the profile's default filter.
///
/// ```
/// use equivex_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// init(Profile::Development); // no-op
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(profile.default_filter()));
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        // Another subscriber (e.g. test capture) may already own the global slot.
        if installed.is_err() {
            tracing::debug!(?profile, "global subscriber already installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
        init(Profile::Development);
    }

    #[test]
    fn test_profile_filters() {
        assert_eq!(Profile::Development.default_filter(), "equivex=debug");
        assert_eq!(Profile::Production.default_filter(), "equivex=info");
    }
}

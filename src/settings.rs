//! Pipeline settings: timeouts, cache TTLs, retry policy, and paths.
//!
//! The NWS API asks that automated clients identify themselves with
//! contact information in the `User-Agent` header; [`user_agent`] builds
//! that string from the configured contact email.

use std::time::Duration;

/// Fallback contact for the weather API when none is configured.
pub const DEFAULT_CONTACT_EMAIL: &str = "tahoe-conditions-bot@example.com";

/// Per-request network timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimum spacing between requests to the same host.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(1500);

/// Maximum retry attempts for a single fetch.
pub const MAX_RETRIES: usize = 3;

/// Initial retry delay; doubles per attempt up to [`RETRY_MAX_DELAY`].
pub const RETRY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Cap on the exponential backoff delay.
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(30);

/// Cache lifetime for resort conditions pages.
pub const CONDITIONS_CACHE_TTL: Duration = Duration::from_secs(900);

/// Cache lifetime for NWS points and forecast responses.
pub const NWS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Default on-disk cache directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache";

/// Default base directory for generated JSON artifacts.
pub const DEFAULT_OUTPUT_DIR: &str = "public/data";

/// Default path of the resort registry.
pub const DEFAULT_REGISTRY: &str = "resorts.yaml";

/// Build the identifying `User-Agent` string required by the NWS API.
pub fn user_agent(contact_email: &str) -> String {
    format!(
        "TahoeConditionsBot/{} ({})",
        env!("CARGO_PKG_VERSION"),
        contact_email
    )
}

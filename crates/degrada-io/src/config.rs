//! Backend connection settings.

use std::time::Duration;

/// Base URL used when `DEGRADA_API_BASE` is not set at build time.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Request timeout for native builds. The browser applies its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where the backend lives and how long to wait for it.
///
/// Provided to components through Dioxus context by the app root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without a trailing slash, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Per-request timeout (native only).
    pub timeout: Duration,
}

impl ApiConfig {
    /// Settings for `base_url` with the default timeout.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Absolute URL of an endpoint path such as `/upload`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(option_env!("DEGRADA_API_BASE").unwrap_or(DEFAULT_BASE_URL))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_normalized() {
        let config = ApiConfig::new("http://example.test/api/");
        assert_eq!(config.base_url, "http://example.test/api");
        assert_eq!(config.endpoint("/upload"), "http://example.test/api/upload");
        assert_eq!(config.endpoint("media-info"), "http://example.test/api/media-info");
    }

    #[test]
    fn default_timeout_is_five_minutes() {
        assert_eq!(ApiConfig::new(DEFAULT_BASE_URL).timeout.as_secs(), 300);
    }
}

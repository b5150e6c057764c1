//! Client configuration.
//!
//! Holds the media service location and the fixed delays used by the two
//! delivery techniques. Nothing here is persisted; a host may hand the
//! configuration in as JSON when the page boots.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default delay before the download flow reports optimistic success.
pub const DEFAULT_OPTIMISTIC_DOWNLOAD_DELAY_MS: u64 = 1500;

/// Default delay before the transient download form is removed.
pub const DEFAULT_FORM_CLEANUP_DELAY_MS: u64 = 100;

/// Default delay before a conversion result's object URL is revoked.
pub const DEFAULT_OBJECT_URL_REVOKE_DELAY_MS: u64 = 1000;

/// Default timeout for metadata and conversion requests (native hosts only).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 600;

/// Path of the metadata endpoint.
pub const INFO_PATH: &str = "/api/info";

/// Path of the native-submission download endpoint.
pub const DOWNLOAD_PATH: &str = "/api/download";

/// Path of the conversion endpoint.
pub const CONVERT_PATH: &str = "/api/v2/convert";

/// MediaFlow client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the media service. Empty means same origin.
    #[serde(default)]
    pub api_base: String,
    /// Request timeout in seconds. Ignored in the browser.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay before the optimistic "download started" message.
    #[serde(default = "default_optimistic_download_delay_ms")]
    pub optimistic_download_delay_ms: u64,
    /// Delay before the transient submission element is removed.
    #[serde(default = "default_form_cleanup_delay_ms")]
    pub form_cleanup_delay_ms: u64,
    /// Delay before an object URL is released.
    #[serde(default = "default_object_url_revoke_delay_ms")]
    pub object_url_revoke_delay_ms: u64,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_optimistic_download_delay_ms() -> u64 {
    DEFAULT_OPTIMISTIC_DOWNLOAD_DELAY_MS
}

const fn default_form_cleanup_delay_ms() -> u64 {
    DEFAULT_FORM_CLEANUP_DELAY_MS
}

const fn default_object_url_revoke_delay_ms() -> u64 {
    DEFAULT_OBJECT_URL_REVOKE_DELAY_MS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            optimistic_download_delay_ms: DEFAULT_OPTIMISTIC_DOWNLOAD_DELAY_MS,
            form_cleanup_delay_ms: DEFAULT_FORM_CLEANUP_DELAY_MS,
            object_url_revoke_delay_ms: DEFAULT_OBJECT_URL_REVOKE_DELAY_MS,
        }
    }
}

impl ClientConfig {
    /// Create a configuration pointing at the given service base URL.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a configuration from JSON.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Configuration(format!("Failed to parse client config: {e}")))?;
        config.validate()?;
        debug!("Loaded client config (api_base={:?})", config.api_base);
        Ok(config)
    }

    /// Check the configuration for inconsistent values.
    pub fn validate(&self) -> Result<()> {
        let base = self.api_base.trim();
        if !base.is_empty() && !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(Error::Configuration(format!(
                "api_base must be empty or an http(s) URL, got {base:?}"
            )));
        }
        if self.form_cleanup_delay_ms > self.optimistic_download_delay_ms {
            return Err(Error::Configuration(
                "form_cleanup_delay_ms must not exceed optimistic_download_delay_ms".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Configuration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// URL of the metadata endpoint, without the query string.
    #[must_use]
    pub fn info_url(&self) -> String {
        self.endpoint(INFO_PATH)
    }

    /// URL the download form posts to.
    #[must_use]
    pub fn download_url(&self) -> String {
        self.endpoint(DOWNLOAD_PATH)
    }

    /// URL of the conversion endpoint.
    #[must_use]
    pub fn convert_url(&self) -> String {
        self.endpoint(CONVERT_PATH)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim().trim_end_matches('/'))
    }

    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Optimistic download delay as a `Duration`.
    #[must_use]
    pub const fn optimistic_download_delay(&self) -> Duration {
        Duration::from_millis(self.optimistic_download_delay_ms)
    }

    /// Form cleanup delay as a `Duration`.
    #[must_use]
    pub const fn form_cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.form_cleanup_delay_ms)
    }

    /// Object URL revoke delay as a `Duration`.
    #[must_use]
    pub const fn object_url_revoke_delay(&self) -> Duration {
        Duration::from_millis(self.object_url_revoke_delay_ms)
    }
}

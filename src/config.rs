//! Client configuration.

use std::env;
use std::time::Duration;

use crate::error::Error;

/// Default base URL for the lakeFS API.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API base URL.
pub const ENDPOINT_ENV: &str = "LAKEFS_ENDPOINT";

/// Environment variable holding the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "LAKEFS_TIMEOUT_SECS";

/// Settings for the default HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the API prefix, e.g. `https://lakefs.example.com/api/v1`
    pub base_url: String,
    /// Per-request timeout, enforced by the transport
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("lakefs-sdk-rust/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Create a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `LAKEFS_ENDPOINT` - Base URL for the API (optional, default: `http://localhost:8000/api/v1`)
    /// * `LAKEFS_TIMEOUT_SECS` - Request timeout in seconds (optional, default: 30)
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the timeout is not a positive integer.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = endpoint.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    Error::Configuration(format!(
                        "Invalid {TIMEOUT_ENV}: `{raw}`. Must be a positive number of seconds"
                    ))
                })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(config.user_agent.starts_with("lakefs-sdk-rust/"));
    }

    #[test]
    fn test_env_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENDPOINT_ENV, " https://lakefs.example.com/api/v1 "),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://lakefs.example.com/api/v1");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_timeout() {
        for raw in ["zero", "0", "-3", ""] {
            let result = ClientConfig::from_lookup(lookup_from(&[(TIMEOUT_ENV, raw)]));
            assert!(
                matches!(result, Err(Error::Configuration(ref msg)) if msg.contains(TIMEOUT_ENV)),
                "expected configuration error for {raw:?}"
            );
        }
    }

    #[test]
    fn test_blank_endpoint_keeps_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[(ENDPOINT_ENV, "  ")])).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }
}

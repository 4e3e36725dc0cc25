//! Runtime configuration.
//!
//! Use the builder methods to customize, or [`Config::from_env`] to pick up
//! overrides from the environment.
//!
//! # Example
//!
//! ```ignore
//! use chatstream::config::Config;
//!
//! let config = Config::from_env()
//!     .with_base_url("http://localhost:5001/v1")
//!     .with_timeout_secs(60);
//! ```

use std::time::Duration;

use crate::adapters::DEFAULT_API_KEY_ENV;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.dify.ai/v1";

/// Default whole-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const BASE_URL_ENV: &str = "CHATSTREAM_BASE_URL";
pub const USER_ENV: &str = "CHATSTREAM_USER";
pub const TIMEOUT_ENV: &str = "CHATSTREAM_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// API base URL, without the `/chat-messages` path
    pub base_url: String,
    /// End-user identifier sent with every request
    pub user: String,
    /// Environment variable consulted for the API key before the credentials file
    pub api_key_env: String,
    /// Whole-request timeout in seconds, streamed body included
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user: format!("chatstream-{}", uuid::Uuid::new_v4()),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = var.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Defaults overridden by `CHATSTREAM_BASE_URL`, `CHATSTREAM_USER` and
    /// `CHATSTREAM_TIMEOUT_SECS`. Blank or unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(url) = non_blank_env(BASE_URL_ENV) {
            config = config.with_base_url(url);
        }
        if let Some(user) = non_blank_env(USER_ENV) {
            config = config.with_user(user);
        }
        if let Some(raw) = non_blank_env(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config = config.with_timeout_secs(secs),
                _ => tracing::warn!("Ignoring invalid {}={:?}", TIMEOUT_ENV, raw),
            }
        }

        config
    }
}

fn non_blank_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [BASE_URL_ENV, USER_ENV, TIMEOUT_ENV] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.base_url, "https://api.dify.ai/v1");
        assert!(config.user.starts_with("chatstream-"));
        assert_eq!(config.api_key_env, "CHATSTREAM_API_KEY");
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_builder() {
        let config = Config::new()
            .with_base_url("http://localhost:5001/v1")
            .with_user("alice")
            .with_api_key_env("MY_KEY")
            .with_timeout_secs(10);

        assert_eq!(config.base_url, "http://localhost:5001/v1");
        assert_eq!(config.user, "alice");
        assert_eq!(config.api_key_env, "MY_KEY");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var(BASE_URL_ENV, "http://example.test/v1");
        std::env::set_var(USER_ENV, "bob");
        std::env::set_var(TIMEOUT_ENV, "45");

        let config = Config::from_env();
        assert_eq!(config.base_url, "http://example.test/v1");
        assert_eq!(config.user, "bob");
        assert_eq!(config.timeout_secs, 45);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_bad_values() {
        clear_env();
        std::env::set_var(BASE_URL_ENV, "   ");
        std::env::set_var(TIMEOUT_ENV, "soon");

        let config = Config::from_env();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        std::env::set_var(TIMEOUT_ENV, "0");
        assert_eq!(Config::from_env().timeout_secs, DEFAULT_TIMEOUT_SECS);

        clear_env();
    }
}

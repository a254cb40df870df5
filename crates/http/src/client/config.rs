//! Client configuration

use super::routes::DEFAULT_AUTH_PREFIX;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings fixed when the client is built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, e.g. `http://localhost:8080`
    pub base_url: String,

    /// Path prefix of the login/registration endpoints
    pub auth_prefix: String,

    /// Request timeout in seconds (0 = transport default)
    pub timeout_secs: u64,

    /// User agent sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_prefix: DEFAULT_AUTH_PREFIX.to_string(),
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.auth_prefix, "/api/auth");
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_timeout_means_none() {
        let config = ClientConfig {
            timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"https://estoque.example.com"}"#).unwrap();
        assert_eq!(config.base_url, "https://estoque.example.com");
        assert_eq!(config.auth_prefix, DEFAULT_AUTH_PREFIX);
    }
}

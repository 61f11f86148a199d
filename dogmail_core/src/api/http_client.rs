//! HTTP client construction for the submission endpoint
//!
//! The form sends at most one request at a time, so the pool is kept small.

use reqwest::Client;
use std::time::Duration;

/// Configuration for the submission client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Overall request timeout (default: 5 seconds)
    pub timeout: Duration,
    /// Connection timeout (default: 3 seconds)
    pub connect_timeout: Duration,
    /// Pool idle timeout (default: 60 seconds)
    pub pool_idle_timeout: Duration,
    /// Max idle connections per host (default: 2)
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(3),
            pool_idle_timeout: Duration::from_secs(60),
            pool_max_idle_per_host: 2,
        }
    }
}

impl ClientConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout: timeout.min(Duration::from_secs(3)),
            ..Default::default()
        }
    }
}

/// Create the client used to post emails
pub fn create_submit_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .user_agent(format!("dogmail/{}", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout.as_secs(), 5);
        assert_eq!(config.connect_timeout.as_secs(), 3);
    }

    #[test]
    fn test_short_timeout_caps_connect_timeout() {
        let config = ClientConfig::with_timeout(Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_create_submit_client() {
        assert!(create_submit_client(&ClientConfig::default()).is_ok());
    }
}

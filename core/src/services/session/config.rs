//! Configuration for the session service

use std::time::Duration;

use ks_shared::config::SessionConfig;

/// Configuration for the session service
#[derive(Debug, Clone)]
pub struct SessionServiceConfig {
    /// Deadline for one login, renew or logout
    pub request_timeout: Duration,
}

impl Default for SessionServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&SessionConfig> for SessionServiceConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout),
        }
    }
}

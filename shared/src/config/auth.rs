//! Token and session configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{env_parse, env_string};

const DEFAULT_ACCESS_SECRET: &str = "access-secret-change-in-production";
const DEFAULT_REFRESH_SECRET: &str = "refresh-secret-change-in-production";

/// JWT signing configuration
///
/// Access and refresh tokens are signed with independent secrets so a leak
/// of one cannot be used to forge the other.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Secret key for signing access tokens
    pub access_secret: String,

    /// Secret key for signing refresh tokens
    pub refresh_secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: String::from(DEFAULT_ACCESS_SECRET),
            refresh_secret: String::from(DEFAULT_REFRESH_SECRET),
            access_token_expiry: 2520,     // 42 minutes
            refresh_token_expiry: 120960,  // 33.6 hours
            issuer: String::from("keystone"),
        }
    }
}

impl JwtConfig {
    /// Create a new configuration with explicit secrets
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            access_secret: env_string("ACCESS_TOKEN_SECRET", DEFAULT_ACCESS_SECRET),
            refresh_secret: env_string("REFRESH_TOKEN_SECRET", DEFAULT_REFRESH_SECRET),
            access_token_expiry: env_parse(
                "ACCESS_TOKEN_EXPIRY_IN_SECS",
                defaults.access_token_expiry,
            ),
            refresh_token_expiry: env_parse(
                "REFRESH_TOKEN_EXPIRY_IN_SECS",
                defaults.refresh_token_expiry,
            ),
            issuer: env_string("JWT_ISSUER", &defaults.issuer),
        }
    }

    /// Set access token expiry in seconds
    pub fn with_access_expiry_secs(mut self, secs: i64) -> Self {
        self.access_token_expiry = secs;
        self
    }

    /// Set refresh token expiry in seconds
    pub fn with_refresh_expiry_secs(mut self, secs: i64) -> Self {
        self.refresh_token_expiry = secs;
        self
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Check if either secret is still the built-in default (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.access_secret == DEFAULT_ACCESS_SECRET || self.refresh_secret == DEFAULT_REFRESH_SECRET
    }

    /// Check if both token classes are signed with the same key
    pub fn shares_secret(&self) -> bool {
        self.access_secret == self.refresh_secret
    }
}

/// Which session store backs the running process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStoreKind {
    /// MySQL tables via the connection pool
    Mysql,
    /// Process-local store, lost on restart
    Memory,
}

impl Default for SessionStoreKind {
    fn default() -> Self {
        SessionStoreKind::Mysql
    }
}

impl FromStr for SessionStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "database" | "db" => Ok(SessionStoreKind::Mysql),
            "memory" | "in-memory" | "mem" => Ok(SessionStoreKind::Memory),
            _ => Err(format!("Invalid session store: {}", s)),
        }
    }
}

/// Session handling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Deadline for a single login, renew or logout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Token cookies are only sent over HTTPS
    pub cookie_secure: bool,

    /// SameSite attribute for token cookies
    #[serde(default = "default_same_site")]
    pub cookie_same_site: String,

    /// Interval between expired-session sweeps in seconds
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: u64,

    /// Run the background sweep at all
    #[serde(default = "default_cleanup_enabled")]
    pub cleanup_enabled: bool,

    /// Backing store
    #[serde(default)]
    pub store: SessionStoreKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            cookie_secure: false,  // Forced on in production
            cookie_same_site: default_same_site(),
            cleanup_interval: default_cleanup_interval(),
            cleanup_enabled: default_cleanup_enabled(),
            store: SessionStoreKind::default(),
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            request_timeout: env_parse("REQUEST_TIMEOUT_SECS", defaults.request_timeout),
            cookie_secure: env_parse("COOKIE_SECURE", defaults.cookie_secure),
            cookie_same_site: defaults.cookie_same_site,
            cleanup_interval: env_parse("SESSION_CLEANUP_INTERVAL_SECS", defaults.cleanup_interval),
            cleanup_enabled: env_parse("SESSION_CLEANUP_ENABLED", defaults.cleanup_enabled),
            store: env_parse("SESSION_STORE", defaults.store),
        }
    }

    /// Set the per-request deadline in seconds
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout = secs;
        self
    }

    /// Select the backing store
    pub fn with_store(mut self, store: SessionStoreKind) -> Self {
        self.store = store;
        self
    }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_same_site() -> String {
    String::from("Strict")
}

fn default_cleanup_interval() -> u64 {
    3600  // 1 hour
}

fn default_cleanup_enabled() -> bool {
    true
}

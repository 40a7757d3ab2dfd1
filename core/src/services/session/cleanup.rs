//! Session cleanup service for periodic removal of expired session records
//!
//! Expired records stay in the store until a login from the same device
//! replaces them or this sweep removes them.

use std::sync::Arc;
use tracing::{error, info, warn};

use ks_shared::config::SessionConfig;

use crate::errors::DomainError;
use crate::repositories::SessionRepository;
use crate::services::clock::Clock;

/// Configuration for session cleanup service
#[derive(Debug, Clone)]
pub struct SessionCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Whether to enable automatic cleanup
    pub enabled: bool,
}

impl Default for SessionCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600, // Run every hour
            enabled: true,
        }
    }
}

impl From<&SessionConfig> for SessionCleanupConfig {
    fn from(config: &SessionConfig) -> Self {
        Self {
            interval_seconds: config.cleanup_interval.max(1),
            enabled: config.cleanup_enabled,
        }
    }
}

/// Service for deleting expired sessions
pub struct SessionCleanupService<R: SessionRepository + 'static> {
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    config: SessionCleanupConfig,
}

impl<R: SessionRepository> SessionCleanupService<R> {
    /// Create a new session cleanup service
    pub fn new(repository: Arc<R>, clock: Arc<dyn Clock>, config: SessionCleanupConfig) -> Self {
        Self {
            repository,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle
    ///
    /// Only records already past their expiry are removed; live sessions are
    /// never touched.
    ///
    /// # Returns
    /// * `Ok(CleanupResult)` - Summary of cleanup operations
    /// * `Err(DomainError)` - If cleanup fails
    pub async fn run_cleanup(&self) -> Result<CleanupResult, DomainError> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let mut result = CleanupResult::default();

        match self.repository.delete_expired(self.clock.now()).await {
            Ok(count) => {
                result.expired_sessions_deleted = count;
                info!("Deleted {} expired sessions", count);
            }
            Err(e) => {
                error!("Failed to cleanup expired sessions: {}", e);
                result.errors.push(format!("Session cleanup error: {}", e));
            }
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task
    ///
    /// This spawns a tokio task that runs cleanup at regular intervals
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("Session cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "Session cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.is_success() {
                            warn!("Cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("Session cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}

/// Result of a cleanup operation
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of expired sessions deleted
    pub expired_sessions_deleted: usize,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

//! Capability interface consumed by the HTTP layer

use async_trait::async_trait;

use crate::domain::entities::{DeviceContext, EntityRef, TokenPair};
use crate::errors::DomainResult;

/// Everything needed to open a session for a known entity
#[derive(Clone)]
pub struct LoginRequest {
    /// Entity the session is opened for
    pub entity: EntityRef,
    /// Stored one-way hash of the entity's secret
    pub stored_hash: String,
    /// Secret submitted by the caller
    pub candidate_secret: String,
    /// Device the request came from
    pub device: DeviceContext,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("entity", &self.entity)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

/// Login, renew and logout as seen by callers
///
/// Each call either returns a token pair or a classified `DomainError`.
#[async_trait]
pub trait SessionManager: Send + Sync {
    /// Verify credentials and open (or reuse) the device's session
    async fn login(&self, request: LoginRequest) -> DomainResult<TokenPair>;

    /// Exchange a refresh token for a new pair, consuming the old one
    async fn renew(&self, refresh_token: &str, device: &DeviceContext) -> DomainResult<TokenPair>;

    /// Terminate the session behind a refresh token
    async fn logout(&self, refresh_token: &str) -> DomainResult<()>;

    /// Identify the entity behind an access token
    fn verify_access(&self, access_token: &str) -> DomainResult<EntityRef>;
}

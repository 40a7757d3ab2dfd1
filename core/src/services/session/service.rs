//! Session service implementing login, rotation with reuse detection, and logout

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::{
    Claims, DeviceContext, EntityRef, IssuedToken, Session, TokenClass, TokenPair,
};
use crate::errors::{AuthError, DomainError, DomainResult, SessionError, TokenError};
use crate::repositories::SessionRepository;
use crate::services::credential::CredentialVerifier;
use crate::services::token::TokenCodec;

use super::config::SessionServiceConfig;
use super::manager::{LoginRequest, SessionManager};

/// Orchestrates the token codec and session store
///
/// The only shared mutable state is the session record set, reached through
/// the repository's atomic operations. No in-process locks are held.
pub struct SessionService<R: SessionRepository, V: CredentialVerifier> {
    repository: Arc<R>,
    verifier: Arc<V>,
    codec: Arc<TokenCodec>,
    config: SessionServiceConfig,
}

impl<R, V> SessionService<R, V>
where
    R: SessionRepository,
    V: CredentialVerifier + 'static,
{
    /// Creates a new session service
    ///
    /// # Arguments
    ///
    /// * `repository` - Session store
    /// * `verifier` - Credential comparison used at login
    /// * `codec` - Token codec; its clock is also used for session expiry
    /// * `config` - Request deadline
    pub fn new(
        repository: Arc<R>,
        verifier: Arc<V>,
        codec: Arc<TokenCodec>,
        config: SessionServiceConfig,
    ) -> Self {
        Self {
            repository,
            verifier,
            codec,
            config,
        }
    }

    /// Access to the underlying store
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Runs `operation` under the request deadline
    ///
    /// On expiry the in-flight future is dropped, abandoning any store call
    /// it was awaiting.
    async fn with_deadline<T, F>(&self, operation: &'static str, future: F) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>>,
    {
        match tokio::time::timeout(self.config.request_timeout, future).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.config.request_timeout, "Session operation exceeded its deadline");
                Err(DomainError::Timeout {
                    operation: operation.to_string(),
                })
            }
        }
    }

    async fn verify_credentials(&self, stored_hash: String, candidate: String) -> DomainResult<()> {
        let verifier = Arc::clone(&self.verifier);
        let matched = tokio::task::spawn_blocking(move || verifier.compare(&stored_hash, &candidate))
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("Credential check did not complete: {}", e),
            })?;

        if matched {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials.into())
        }
    }

    /// Decodes a presented refresh token; every failure is an invalid token
    fn decode_refresh(&self, refresh_token: &str) -> DomainResult<Claims> {
        match self.codec.verify(refresh_token, TokenClass::Refresh) {
            Ok(Some(claims)) => Ok(claims),
            Ok(None) => Err(SessionError::InvalidRefreshToken.into()),
            Err(TokenError::Malformed { reason }) => {
                warn!(%reason, "Malformed refresh token presented");
                Err(SessionError::InvalidRefreshToken.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Session id and entity id embedded in refresh claims
    fn refresh_ids(claims: &Claims) -> DomainResult<(Uuid, Uuid)> {
        match (claims.token_id(), claims.entity_id()) {
            (Some(session_id), Some(entity_id)) => Ok((session_id, entity_id)),
            _ => Err(SessionError::InvalidRefreshToken.into()),
        }
    }

    /// Purges every session of the entity and returns the error to signal
    ///
    /// The purge completes before the caller sees `SessionNotFound`.
    async fn revoke_all(&self, entity_id: Uuid, session_id: Uuid) -> DomainError {
        match self.repository.delete_all_by_entity(entity_id).await {
            Ok(revoked) => {
                warn!(
                    %entity_id,
                    %session_id,
                    revoked,
                    "Refresh token reuse detected, all sessions of the entity revoked"
                );
                SessionError::SessionNotFound.into()
            }
            Err(e) => e,
        }
    }

    /// First binding between stored session and presented token that fails
    fn binding_mismatch(
        session: &Session,
        claims: &Claims,
        entity_id: Uuid,
        device: &DeviceContext,
        now: DateTime<Utc>,
    ) -> Option<&'static str> {
        if session.is_expired(now) {
            Some("session expired")
        } else if session.expires_at.timestamp() != claims.exp {
            Some("expiry differs from token")
        } else if session.entity_id != entity_id {
            Some("entity differs from token")
        } else if session.user_agent != device.user_agent {
            Some("user agent changed")
        } else if session.client_ip != device.client_ip {
            Some("client ip changed")
        } else {
            None
        }
    }

    fn session_from(
        refresh: &IssuedToken,
        entity: &EntityRef,
        device: &DeviceContext,
        now: DateTime<Utc>,
    ) -> DomainResult<Session> {
        let session_id = refresh.claims.token_id().ok_or_else(|| TokenError::GenerationFailed {
            reason: "refresh token issued without an id".to_string(),
        })?;

        Ok(Session::new(
            session_id,
            entity,
            refresh.token.clone(),
            refresh.claims.expires_at(),
            device,
            now,
        ))
    }

    async fn login_inner(&self, request: LoginRequest) -> DomainResult<TokenPair> {
        let LoginRequest {
            entity,
            stored_hash,
            candidate_secret,
            device,
        } = request;

        self.verify_credentials(stored_hash, candidate_secret).await?;

        let access = self.codec.issue(TokenClass::Access, &entity)?;
        let now = self.codec.now();

        if let Some(existing) = self
            .repository
            .find_by_entity_and_device(entity.id, &device.user_agent)
            .await?
        {
            if existing.is_live(now) {
                debug!(entity_id = %entity.id, session_id = %existing.session_id, "Reusing live session for device");
                return Ok(TokenPair::new(access.details(), existing.refresh_details()));
            }

            debug!(entity_id = %entity.id, session_id = %existing.session_id, "Replacing stale session for device");
            self.repository.delete_by_id(existing.session_id).await?;
        }

        let refresh = self.codec.issue(TokenClass::Refresh, &entity)?;
        let session = Self::session_from(&refresh, &entity, &device, now)?;
        let session_id = session.session_id;

        match self.repository.create(session).await {
            Ok(_) => {
                info!(entity_id = %entity.id, %session_id, entity_type = %entity.entity_type, "Session created");
                Ok(TokenPair::new(access.details(), refresh.details()))
            }
            Err(DomainError::Conflict { message }) => {
                // A concurrent login for the same device committed first
                debug!(entity_id = %entity.id, %message, "Concurrent login detected, returning winning session");
                match self
                    .repository
                    .find_by_entity_and_device(entity.id, &device.user_agent)
                    .await?
                {
                    Some(winner) if winner.is_live(now) => {
                        Ok(TokenPair::new(access.details(), winner.refresh_details()))
                    }
                    _ => Err(DomainError::Conflict { message }),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn renew_inner(&self, refresh_token: &str, device: &DeviceContext) -> DomainResult<TokenPair> {
        let claims = self.decode_refresh(refresh_token)?;
        let (session_id, entity_id) = Self::refresh_ids(&claims)?;

        let session = match self.repository.find_by_id(session_id).await? {
            Some(session) => session,
            None => return Err(self.revoke_all(entity_id, session_id).await),
        };

        if session.is_revoked {
            warn!(%entity_id, %session_id, "Revoked session presented for renewal");
            return Err(SessionError::InvalidRefreshToken.into());
        }

        let now = self.codec.now();
        if let Some(reason) = Self::binding_mismatch(&session, &claims, entity_id, device, now) {
            warn!(%entity_id, %session_id, reason, "Session binding mismatch, session deleted");
            self.repository.delete_by_id(session_id).await?;
            return Err(SessionError::InvalidRefreshToken.into());
        }

        let entity = session.entity();
        let rotated = self.codec.rotate(&entity)?;
        let replacement = Self::session_from(&rotated.refresh, &entity, device, now)?;
        let new_session_id = replacement.session_id;

        // Only one caller can consume the old record
        match self.repository.replace(session_id, replacement).await {
            Ok(true) => {}
            Ok(false) => return Err(self.revoke_all(entity_id, session_id).await),
            Err(DomainError::Conflict { message }) => {
                warn!(%entity_id, %session_id, %message, "Rotated session collided with an existing record");
                return Err(SessionError::InvalidRefreshToken.into());
            }
            Err(e) => return Err(e),
        }

        info!(entity_id = %entity.id, old_session_id = %session_id, %new_session_id, "Session rotated");
        Ok(TokenPair::new(rotated.access.details(), rotated.refresh.details()))
    }

    async fn logout_inner(&self, refresh_token: &str) -> DomainResult<()> {
        let claims = self.decode_refresh(refresh_token)?;
        let (session_id, entity_id) = Self::refresh_ids(&claims)?;

        if self.repository.find_by_id(session_id).await?.is_none() {
            return Err(self.revoke_all(entity_id, session_id).await);
        }

        if !self.repository.delete_by_id(session_id).await? {
            return Err(self.revoke_all(entity_id, session_id).await);
        }

        info!(%entity_id, %session_id, "Session terminated");
        Ok(())
    }
}

#[async_trait]
impl<R, V> SessionManager for SessionService<R, V>
where
    R: SessionRepository + 'static,
    V: CredentialVerifier + 'static,
{
    async fn login(&self, request: LoginRequest) -> DomainResult<TokenPair> {
        self.with_deadline("login", self.login_inner(request)).await
    }

    async fn renew(&self, refresh_token: &str, device: &DeviceContext) -> DomainResult<TokenPair> {
        self.with_deadline("renew", self.renew_inner(refresh_token, device))
            .await
    }

    async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        self.with_deadline("logout", self.logout_inner(refresh_token))
            .await
    }

    fn verify_access(&self, access_token: &str) -> DomainResult<EntityRef> {
        match self.codec.verify(access_token, TokenClass::Access) {
            Ok(Some(claims)) => claims
                .entity()
                .ok_or_else(|| SessionError::InvalidAccessToken.into()),
            Ok(None) | Err(TokenError::Malformed { .. }) => Err(SessionError::InvalidAccessToken.into()),
            Err(e) => Err(e.into()),
        }
    }
}

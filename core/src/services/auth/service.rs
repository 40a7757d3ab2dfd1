//! Main authentication service implementation

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::entities::{normalize_email, DeviceContext, EntityRef, EntityType, TokenPair};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::AccountRepository;
use crate::services::session::{LoginRequest, SessionManager};

/// Authentication service for the per-entity-type login flows
pub struct AuthService<A, S>
where
    A: AccountRepository,
    S: SessionManager,
{
    /// Account lookup by email
    account_repository: Arc<A>,
    /// Session lifecycle
    sessions: Arc<S>,
}

impl<A, S> AuthService<A, S>
where
    A: AccountRepository,
    S: SessionManager,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `account_repository` - Repository used to resolve login emails
    /// * `sessions` - Session manager that verifies secrets and issues tokens
    pub fn new(account_repository: Arc<A>, sessions: Arc<S>) -> Self {
        Self {
            account_repository,
            sessions,
        }
    }

    /// Session manager behind this service
    pub fn sessions(&self) -> &Arc<S> {
        &self.sessions
    }

    /// Log in with email and password
    ///
    /// Unknown emails and wrong passwords both surface as
    /// `AuthError::InvalidCredentials`.
    ///
    /// # Arguments
    ///
    /// * `entity_type` - Whether to look the email up among users or admins
    /// * `email` - Login email, matched case-insensitively
    /// * `password` - Secret submitted by the caller
    /// * `device` - User agent and client IP of the request
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Access token plus the device's refresh token
    /// * `Err(DomainError)` - Invalid credentials, storage failure or timeout
    pub async fn login_with_password(
        &self,
        entity_type: EntityType,
        email: &str,
        password: &str,
        device: DeviceContext,
    ) -> DomainResult<TokenPair> {
        let email = normalize_email(email);

        let account = match self
            .account_repository
            .find_by_email(entity_type, &email)
            .await?
        {
            Some(account) => account,
            None => {
                debug!(%entity_type, "Login attempt for unknown account");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let pair = self
            .sessions
            .login(LoginRequest {
                entity: account.entity(),
                stored_hash: account.password_hash,
                candidate_secret: password.to_string(),
                device,
            })
            .await?;

        info!(entity_id = %account.id, %entity_type, "Login succeeded");
        Ok(pair)
    }

    /// Exchange a refresh token for a new token pair
    pub async fn renew(&self, refresh_token: &str, device: &DeviceContext) -> DomainResult<TokenPair> {
        self.sessions.renew(refresh_token, device).await
    }

    /// Terminate the session behind a refresh token
    pub async fn logout(&self, refresh_token: &str) -> DomainResult<()> {
        self.sessions.logout(refresh_token).await
    }

    /// Entity identified by an access token
    pub fn current_entity(&self, access_token: &str) -> Result<EntityRef, DomainError> {
        self.sessions.verify_access(access_token)
    }
}

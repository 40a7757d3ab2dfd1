//! Session repository trait defining the interface for session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::DomainError;

/// Repository trait for Session entity persistence operations
///
/// Every operation is atomic on the store. The session protocol relies on
/// that: a renewal and a replay of the same refresh token race on `replace`,
/// and only one of them can observe `Ok(true)`.
///
/// Implementations must enforce two uniqueness rules and report violations
/// as `DomainError::Conflict`:
/// - `session_id` is unique
/// - at most one record exists per `(entity_id, user_agent)`
///
/// Storage faults are surfaced as `DomainError::Storage` and never retried
/// here.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session record
    ///
    /// # Arguments
    /// * `session` - The record to persist
    ///
    /// # Returns
    /// * `Ok(Session)` - The stored record
    /// * `Err(DomainError::Conflict)` - The id or the `(entity, user agent)` pair is taken
    /// * `Err(DomainError)` - Database error occurred
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use uuid::Uuid;
    /// # use ks_core::domain::entities::{DeviceContext, EntityRef, EntityType, Session};
    /// # use ks_core::repositories::SessionRepository;
    /// # async fn example(repo: &impl SessionRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let now = Utc::now();
    /// let entity = EntityRef::new(Uuid::new_v4(), EntityType::User);
    /// let device = DeviceContext::new("Mozilla/5.0", "203.0.113.7");
    /// let session = Session::new(Uuid::new_v4(), &entity, "signed.refresh.token", now + Duration::hours(1), &device, now);
    ///
    /// let saved = repo.create(session).await?;
    /// println!("Session stored with ID: {}", saved.session_id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create(&self, session: Session) -> Result<Session, DomainError>;

    /// Find a session by its ID
    ///
    /// # Returns
    /// * `Ok(Some(Session))` - Session found
    /// * `Ok(None)` - No session with that ID
    /// * `Err(DomainError)` - Database error occurred
    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError>;

    /// Find the session of an entity on one device
    ///
    /// # Arguments
    /// * `entity_id` - Owning entity
    /// * `user_agent` - Device user agent, compared exactly
    ///
    /// # Returns
    /// * `Ok(Some(Session))` - A record exists, live or not
    /// * `Ok(None)` - No record for that pair
    /// * `Err(DomainError)` - Database error occurred
    async fn find_by_entity_and_device(
        &self,
        entity_id: Uuid,
        user_agent: &str,
    ) -> Result<Option<Session>, DomainError>;

    /// Find every session of an entity
    async fn find_all_by_entity(&self, entity_id: Uuid) -> Result<Vec<Session>, DomainError>;

    /// Delete a session by its ID
    ///
    /// Idempotent: deleting a missing ID is not an error.
    ///
    /// # Returns
    /// * `Ok(true)` - This call removed the record
    /// * `Ok(false)` - No record with that ID existed
    /// * `Err(DomainError)` - Database error occurred
    async fn delete_by_id(&self, session_id: Uuid) -> Result<bool, DomainError>;

    /// Swap a session for its successor in one step
    ///
    /// Deletes `old_session_id` and inserts `replacement` atomically. No
    /// reader can observe the store with neither record present, so a purge
    /// of the entity that runs after the old record is gone also removes the
    /// replacement.
    ///
    /// # Returns
    /// * `Ok(true)` - The old record was removed and the replacement stored
    /// * `Ok(false)` - No record with that ID existed; nothing was written
    /// * `Err(DomainError::Conflict)` - The replacement violates a uniqueness rule; the old record is kept
    /// * `Err(DomainError)` - Database error occurred; the old record is kept
    async fn replace(&self, old_session_id: Uuid, replacement: Session) -> Result<bool, DomainError>;

    /// Delete every session of an entity
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of sessions deleted
    /// * `Err(DomainError)` - Deletion failed
    async fn delete_all_by_entity(&self, entity_id: Uuid) -> Result<usize, DomainError>;

    /// Delete sessions whose expiry is at or before `now`
    ///
    /// This method should be called periodically to clean up expired sessions.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of expired sessions deleted
    /// * `Err(DomainError)` - Deletion failed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Count live sessions of an entity at `now`
    async fn count_live_by_entity(
        &self,
        entity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let sessions = self.find_all_by_entity(entity_id).await?;
        Ok(sessions.iter().filter(|s| s.is_live(now)).count())
    }
}

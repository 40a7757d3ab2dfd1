//! Process-local implementation of SessionRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::DomainError;

use super::r#trait::SessionRepository;

/// In-memory session repository
///
/// Used by tests and by local runs without a database. Each operation holds
/// the write lock for its whole duration, which gives the same per-key
/// atomicity a database row lock would.
#[derive(Clone)]
pub struct InMemorySessionRepository {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored records, live or not
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Overwrite a record in place, bypassing uniqueness checks
    #[cfg(test)]
    pub async fn upsert(&self, session: Session) {
        self.sessions.write().await.insert(session.session_id, session);
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniqueness rules checked before an insert
fn check_unique(sessions: &HashMap<Uuid, Session>, session: &Session) -> Result<(), DomainError> {
    if sessions.contains_key(&session.session_id) {
        return Err(DomainError::Conflict {
            message: format!("Session {} already exists", session.session_id),
        });
    }

    let device_taken = sessions
        .values()
        .any(|s| s.entity_id == session.entity_id && s.user_agent == session.user_agent);
    if device_taken {
        return Err(DomainError::Conflict {
            message: format!("Entity {} already has a session for this device", session.entity_id),
        });
    }

    Ok(())
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        let mut sessions = self.sessions.write().await;

        check_unique(&sessions, &session)?;

        sessions.insert(session.session_id, session.clone());
        Ok(session)
    }

    async fn replace(&self, old_session_id: Uuid, replacement: Session) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;

        let Some(old) = sessions.remove(&old_session_id) else {
            return Ok(false);
        };

        if let Err(e) = check_unique(&sessions, &replacement) {
            sessions.insert(old_session_id, old);
            return Err(e);
        }

        sessions.insert(replacement.session_id, replacement);
        Ok(true)
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_id).cloned())
    }

    async fn find_by_entity_and_device(
        &self,
        entity_id: Uuid,
        user_agent: &str,
    ) -> Result<Option<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .find(|s| s.entity_id == entity_id && s.user_agent == user_agent)
            .cloned())
    }

    async fn find_all_by_entity(&self, entity_id: Uuid) -> Result<Vec<Session>, DomainError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, session_id: Uuid) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(&session_id).is_some())
    }

    async fn delete_all_by_entity(&self, entity_id: Uuid) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, s| s.entity_id != entity_id);

        Ok(initial_count - sessions.len())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();

        sessions.retain(|_, s| !s.is_expired(now));

        Ok(initial_count - sessions.len())
    }
}

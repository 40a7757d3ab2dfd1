//! MySQL implementation of the SessionRepository trait.
//!
//! Each trait method maps to a single statement, except `replace`, which
//! runs its delete and insert in one transaction. The `(entity_id,
//! user_agent)` unique key and the primary key surface as
//! `DomainError::Conflict` on insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    mysql::{MySqlArguments, MySqlRow},
    query::Query,
    MySql, MySqlPool, Row,
};
use uuid::Uuid;

use ks_core::domain::entities::{EntityType, Session};
use ks_core::errors::DomainError;
use ks_core::repositories::SessionRepository;

const SESSION_COLUMNS: &str = "session_id, entity_id, entity_type, refresh_token, expires_at, \
     is_revoked, user_agent, client_ip, last_used_at, created_at, updated_at";

/// MySQL implementation of SessionRepository
#[derive(Clone)]
pub struct MySqlSessionRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlSessionRepository {
    /// Create a new MySQL session repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to Session entity
    fn row_to_session(row: &MySqlRow) -> Result<Session, DomainError> {
        let session_id: String = row
            .try_get("session_id")
            .map_err(|e| DomainError::storage("Failed to get session_id", e))?;
        let entity_id: String = row
            .try_get("entity_id")
            .map_err(|e| DomainError::storage("Failed to get entity_id", e))?;
        let entity_type: String = row
            .try_get("entity_type")
            .map_err(|e| DomainError::storage("Failed to get entity_type", e))?;

        Ok(Session {
            session_id: parse_uuid("session_id", &session_id)?,
            entity_id: parse_uuid("entity_id", &entity_id)?,
            entity_type: entity_type
                .parse::<EntityType>()
                .map_err(|e| DomainError::storage("Invalid entity_type", e))?,
            refresh_token: row
                .try_get("refresh_token")
                .map_err(|e| DomainError::storage("Failed to get refresh_token", e))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::storage("Failed to get expires_at", e))?,
            is_revoked: row
                .try_get("is_revoked")
                .map_err(|e| DomainError::storage("Failed to get is_revoked", e))?,
            user_agent: row
                .try_get("user_agent")
                .map_err(|e| DomainError::storage("Failed to get user_agent", e))?,
            client_ip: row
                .try_get("client_ip")
                .map_err(|e| DomainError::storage("Failed to get client_ip", e))?,
            last_used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("last_used_at")
                .map_err(|e| DomainError::storage("Failed to get last_used_at", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| DomainError::storage("Failed to get created_at", e))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(|e| DomainError::storage("Failed to get updated_at", e))?,
        })
    }
}

fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DomainError> {
    Uuid::parse_str(value).map_err(|e| DomainError::storage(&format!("Invalid {} UUID", column), e))
}

const INSERT_SESSION: &str = r#"
    INSERT INTO sessions (
        session_id, entity_id, entity_type, refresh_token, expires_at,
        is_revoked, user_agent, client_ip, last_used_at, created_at, updated_at
    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

fn insert_session(session: &Session) -> Query<'_, MySql, MySqlArguments> {
    sqlx::query(INSERT_SESSION)
        .bind(session.session_id.to_string())
        .bind(session.entity_id.to_string())
        .bind(session.entity_type.as_str())
        .bind(&session.refresh_token)
        .bind(session.expires_at)
        .bind(session.is_revoked)
        .bind(&session.user_agent)
        .bind(&session.client_ip)
        .bind(session.last_used_at)
        .bind(session.created_at)
        .bind(session.updated_at)
}

/// Maps an insert failure, turning unique-key violations into conflicts
fn map_insert_error(error: sqlx::Error) -> DomainError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Conflict {
            message: format!("Session already exists: {}", db.message()),
        },
        _ => DomainError::storage("Failed to create session", error),
    }
}

#[async_trait]
impl SessionRepository for MySqlSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        insert_session(&session)
            .execute(&self.pool)
            .await
            .map_err(map_insert_error)?;

        Ok(session)
    }

    async fn replace(&self, old_session_id: Uuid, replacement: Session) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage("Failed to begin session rotation", e))?;

        // The row lock taken here makes a concurrent purge of the entity wait
        // for the commit, so it sees the replacement
        let deleted = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(old_session_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage("Failed to delete rotated session", e))?;

        if deleted.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| DomainError::storage("Failed to roll back session rotation", e))?;
            return Ok(false);
        }

        // Dropping the transaction on error rolls the delete back
        insert_session(&replacement)
            .execute(&mut *tx)
            .await
            .map_err(map_insert_error)?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage("Failed to commit session rotation", e))?;

        Ok(true)
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        let query = format!("SELECT {} FROM sessions WHERE session_id = ?", SESSION_COLUMNS);

        let row = sqlx::query(&query)
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find session", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_by_entity_and_device(
        &self,
        entity_id: Uuid,
        user_agent: &str,
    ) -> Result<Option<Session>, DomainError> {
        let query = format!(
            "SELECT {} FROM sessions WHERE entity_id = ? AND user_agent = ? LIMIT 1",
            SESSION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(entity_id.to_string())
            .bind(user_agent)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find session by device", e))?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn find_all_by_entity(&self, entity_id: Uuid) -> Result<Vec<Session>, DomainError> {
        let query = format!(
            "SELECT {} FROM sessions WHERE entity_id = ? ORDER BY created_at DESC",
            SESSION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(entity_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to list sessions", e))?;

        rows.iter().map(Self::row_to_session).collect()
    }

    async fn delete_by_id(&self, session_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to delete session", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_by_entity(&self, entity_id: Uuid) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE entity_id = ?")
            .bind(entity_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to delete sessions of entity", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to delete expired sessions", e))?;

        Ok(result.rows_affected() as usize)
    }

    async fn count_live_by_entity(
        &self,
        entity_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS live FROM sessions WHERE entity_id = ? AND is_revoked = FALSE AND expires_at > ?",
        )
        .bind(entity_id.to_string())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage("Failed to count sessions", e))?;

        let live: i64 = row
            .try_get("live")
            .map_err(|e| DomainError::storage("Failed to read session count", e))?;

        Ok(live.max(0) as usize)
    }
}

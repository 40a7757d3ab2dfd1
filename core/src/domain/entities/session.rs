//! Session record binding a refresh token to a device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{DeviceContext, EntityRef, EntityType};
use super::token::TokenDetails;

/// Persisted state of one refresh token
///
/// `session_id` is the `jti` of the refresh token that created the record.
/// A record is replaced, never updated, when its token is rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier, equal to the refresh token id
    pub session_id: Uuid,

    /// Owning entity
    pub entity_id: Uuid,

    /// Owning entity type
    pub entity_type: EntityType,

    /// Signed refresh token handed to the device
    #[serde(skip_serializing)]
    pub refresh_token: String,

    /// Expiry copied from the refresh token
    pub expires_at: DateTime<Utc>,

    /// Whether the session was revoked without being deleted
    pub is_revoked: bool,

    /// Device user agent at creation
    pub user_agent: String,

    /// Client IP at creation
    pub client_ip: String,

    /// Last time the session was exercised
    pub last_used_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Creates a live session for a just-issued refresh token
    pub fn new(
        session_id: Uuid,
        entity: &EntityRef,
        refresh_token: impl Into<String>,
        expires_at: DateTime<Utc>,
        device: &DeviceContext,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            entity_id: entity.id,
            entity_type: entity.entity_type,
            refresh_token: refresh_token.into(),
            expires_at,
            is_revoked: false,
            user_agent: device.user_agent.clone(),
            client_ip: device.client_ip.clone(),
            last_used_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.entity_id, self.entity_type)
    }

    /// Checks if the session has expired at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Unexpired and not revoked
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired(now)
    }

    /// Marks the session revoked
    #[cfg(test)]
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        self.is_revoked = true;
        self.updated_at = now;
    }

    /// Stored refresh token and its expiry
    pub fn refresh_details(&self) -> TokenDetails {
        TokenDetails {
            value: self.refresh_token.clone(),
            expires_at: self.expires_at,
        }
    }
}

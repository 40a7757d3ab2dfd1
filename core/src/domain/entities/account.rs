//! Account entity read during password login.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{EntityRef, EntityType};

/// Login credentials of a user or administrator
///
/// Accounts are only ever read by this service; creating and editing them
/// belongs to other parts of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: Uuid,

    /// Which table the account lives in
    pub entity_type: EntityType,

    /// Login email, stored lowercase
    pub email: String,

    /// One-way hash of the account secret
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl Account {
    pub fn new(
        id: Uuid,
        entity_type: EntityType,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id,
            entity_type,
            email: normalize_email(&email.into()),
            password_hash: password_hash.into(),
        }
    }

    /// Identity carried into tokens and sessions
    pub fn entity(&self) -> EntityRef {
        EntityRef::new(self.id, self.entity_type)
    }
}

/// Canonical form used for lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

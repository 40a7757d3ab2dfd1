//! Authenticated principals and the device they authenticate from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of principal a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// End user of the platform
    User,
    /// Back-office administrator
    Admin,
}

impl EntityType {
    /// Lowercase tag used in claims and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "user",
            EntityType::Admin => "admin",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(EntityType::User),
            "admin" => Ok(EntityType::Admin),
            other => Err(format!("Unknown entity type: {}", other)),
        }
    }
}

/// Stable identity of an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Uuid,
    pub entity_type: EntityType,
}

impl EntityRef {
    pub fn new(id: Uuid, entity_type: EntityType) -> Self {
        Self { id, entity_type }
    }

    /// Token subject in the form `<type>_<id>`
    pub fn subject(&self) -> String {
        format!("{}_{}", self.entity_type, self.id)
    }
}

/// Longest stored user agent, in characters
pub const MAX_USER_AGENT_LEN: usize = 512;

/// Longest stored client IP, in characters (IPv6 text form)
pub const MAX_CLIENT_IP_LEN: usize = 45;

/// Device fingerprint observed on an inbound request
///
/// Both fields are cut to the widths of the session columns, so every store
/// accepts and compares the same values.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceContext {
    pub user_agent: String,
    pub client_ip: String,
}

impl DeviceContext {
    pub fn new(user_agent: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            user_agent: truncate_chars(user_agent.into(), MAX_USER_AGENT_LEN),
            client_ip: truncate_chars(client_ip.into(), MAX_CLIENT_IP_LEN),
        }
    }
}

fn truncate_chars(mut value: String, max_chars: usize) -> String {
    if let Some((index, _)) = value.char_indices().nth(max_chars) {
        value.truncate(index);
    }
    value
}

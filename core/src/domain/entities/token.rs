//! Token entities for JWT-based authentication.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::{EntityRef, EntityType};

/// The two token classes, each signed with its own secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// Short-lived, never persisted
    Access,
    /// Long-lived, backed by a session record
    Refresh,
}

impl TokenClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenClass::Access => "access",
            TokenClass::Refresh => "refresh",
        }
    }
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Entity identifier as issued
    #[serde(rename = "entityId")]
    pub entity_id: String,

    /// Entity type tag
    #[serde(rename = "entityType")]
    pub entity_type: String,

    /// JWT ID, present on refresh tokens only; equals the session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issuer
    pub iss: String,

    /// Subject (`<type>_<id>`)
    pub sub: String,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,
}

impl Claims {
    /// Creates new claims valid from `now` for `lifetime_secs`
    pub fn new(
        entity: &EntityRef,
        token_id: Option<Uuid>,
        issuer: &str,
        now: DateTime<Utc>,
        lifetime_secs: i64,
    ) -> Self {
        let issued_at = now.timestamp();
        Self {
            entity_id: entity.id.to_string(),
            entity_type: entity.entity_type.to_string(),
            jti: token_id.map(|id| id.to_string()),
            iss: issuer.to_string(),
            sub: entity.subject(),
            exp: issued_at + lifetime_secs,
            iat: issued_at,
            nbf: issued_at,
        }
    }

    /// Session id embedded in a refresh token, if present and well formed
    pub fn token_id(&self) -> Option<Uuid> {
        self.jti.as_deref().and_then(|id| Uuid::parse_str(id).ok())
    }

    /// Entity id, if well formed
    pub fn entity_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.entity_id).ok()
    }

    /// Entity reference, if both id and type are well formed
    pub fn entity(&self) -> Option<EntityRef> {
        let id = self.entity_id()?;
        let entity_type = self.entity_type.parse::<EntityType>().ok()?;
        Some(EntityRef::new(id, entity_type))
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Whether the claims are usable at `now`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        now >= self.nbf && now < self.exp
    }
}

/// A freshly signed token and the claims it carries
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl IssuedToken {
    /// Value and expiry as handed to the caller
    pub fn details(&self) -> TokenDetails {
        TokenDetails {
            value: self.token.clone(),
            expires_at: self.claims.expires_at(),
        }
    }
}

/// Token value paired with its expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDetails {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// Access and refresh token returned by login and renew
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: TokenDetails,
    pub refresh_token: TokenDetails,
}

impl TokenPair {
    pub fn new(access_token: TokenDetails, refresh_token: TokenDetails) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use ks_core::domain::entities::EntityRef;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login email, matched case-insensitively
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Identity behind an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    pub entity_id: Uuid,
    pub entity_type: String,
}

impl From<EntityRef> for EntityResponse {
    fn from(entity: EntityRef) -> Self {
        Self {
            entity_id: entity.id,
            entity_type: entity.entity_type.to_string(),
        }
    }
}

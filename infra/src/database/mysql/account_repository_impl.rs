//! MySQL implementation of the AccountRepository trait.
//!
//! Users and administrators live in separate tables with different key
//! columns; both are read-only from this service.

use async_trait::async_trait;
use sqlx::{mysql::MySqlRow, MySqlPool, Row};
use uuid::Uuid;

use ks_core::domain::entities::{normalize_email, Account, EntityType};
use ks_core::errors::DomainError;
use ks_core::repositories::AccountRepository;

/// MySQL implementation of AccountRepository
#[derive(Clone)]
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn lookup_query(entity_type: EntityType) -> &'static str {
        match entity_type {
            EntityType::User => {
                "SELECT id AS account_id, email, hashed_password FROM users WHERE LOWER(email) = ? LIMIT 1"
            }
            EntityType::Admin => {
                "SELECT admin_id AS account_id, email, hashed_password FROM admins WHERE LOWER(email) = ? LIMIT 1"
            }
        }
    }

    fn row_to_account(row: &MySqlRow, entity_type: EntityType) -> Result<Account, DomainError> {
        let id: String = row
            .try_get("account_id")
            .map_err(|e| DomainError::storage("Failed to get account id", e))?;
        let email: String = row
            .try_get("email")
            .map_err(|e| DomainError::storage("Failed to get email", e))?;
        let password_hash: String = row
            .try_get("hashed_password")
            .map_err(|e| DomainError::storage("Failed to get hashed_password", e))?;

        let id = Uuid::parse_str(&id).map_err(|e| DomainError::storage("Invalid account UUID", e))?;

        Ok(Account::new(id, entity_type, email, password_hash))
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_email(
        &self,
        entity_type: EntityType,
        email: &str,
    ) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query(Self::lookup_query(entity_type))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("Failed to find account", e))?;

        row.as_ref()
            .map(|row| Self::row_to_account(row, entity_type))
            .transpose()
    }
}

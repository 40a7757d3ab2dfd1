//! Account repository trait used by password login.

use async_trait::async_trait;

use crate::domain::entities::{Account, EntityType};
use crate::errors::DomainError;

/// Read-only lookup of login accounts
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by email within one entity type
    ///
    /// # Arguments
    /// * `entity_type` - Users and admins are looked up separately
    /// * `email` - Login email, matched case-insensitively
    ///
    /// # Returns
    /// * `Ok(Some(Account))` - Account found
    /// * `Ok(None)` - No account with that email
    /// * `Err(DomainError)` - Database error occurred
    async fn find_by_email(
        &self,
        entity_type: EntityType,
        email: &str,
    ) -> Result<Option<Account>, DomainError>;
}

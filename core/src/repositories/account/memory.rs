//! Process-local implementation of AccountRepository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::account::normalize_email;
use crate::domain::entities::{Account, EntityType};
use crate::errors::DomainError;

use super::r#trait::AccountRepository;

/// In-memory account repository keyed by `(entity type, email)`
#[derive(Clone, Default)]
pub struct InMemoryAccountRepository {
    accounts: Arc<RwLock<HashMap<(EntityType, String), Account>>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account
    pub async fn insert(&self, account: Account) {
        let key = (account.entity_type, normalize_email(&account.email));
        self.accounts.write().await.insert(key, account);
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(
        &self,
        entity_type: EntityType,
        email: &str,
    ) -> Result<Option<Account>, DomainError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&(entity_type, normalize_email(email))).cloned())
    }
}

use uuid::Uuid;

use crate::domain::entities::{Account, EntityType};
use crate::repositories::account::{AccountRepository, InMemoryAccountRepository};

#[tokio::test]
async fn test_lookup_is_case_insensitive() {
    let repo = InMemoryAccountRepository::new();
    let account = Account::new(Uuid::new_v4(), EntityType::User, "Ada@Example.com", "hash");
    repo.insert(account.clone()).await;

    let found = repo.find_by_email(EntityType::User, "  ada@example.COM ").await.unwrap();
    assert_eq!(found, Some(account));
}

#[tokio::test]
async fn test_entity_types_are_separate() {
    let repo = InMemoryAccountRepository::new();
    repo.insert(Account::new(Uuid::new_v4(), EntityType::Admin, "root@example.com", "hash"))
        .await;

    assert!(repo.find_by_email(EntityType::User, "root@example.com").await.unwrap().is_none());
    assert!(repo.find_by_email(EntityType::Admin, "root@example.com").await.unwrap().is_some());
}

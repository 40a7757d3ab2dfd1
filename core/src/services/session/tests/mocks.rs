//! Test doubles and fixtures for session service tests

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::domain::entities::{DeviceContext, EntityRef, EntityType, Session};
use crate::errors::DomainError;
use crate::repositories::{InMemorySessionRepository, SessionRepository};
use crate::services::clock::ManualClock;
use crate::services::credential::CredentialVerifier;
use crate::services::id_generator::UuidV4Generator;
use crate::services::session::{LoginRequest, SessionService, SessionServiceConfig};
use crate::services::token::{TokenCodec, TokenCodecConfig};

pub const SECRET: &str = "hunter2";

/// Treats the stored hash as the plaintext secret
pub struct PlainVerifier;

impl CredentialVerifier for PlainVerifier {
    fn compare(&self, stored_hash: &str, candidate: &str) -> bool {
        stored_hash == candidate
    }
}

/// Session store wrapper that can fail, stall, or lose delete races
pub struct FaultySessionRepository {
    inner: InMemorySessionRepository,
    failing_operation: Mutex<Option<&'static str>>,
    conflicting_operation: Mutex<Option<&'static str>>,
    delay: Mutex<Option<Duration>>,
    stalled_operation: Mutex<Option<(&'static str, Duration)>>,
    lose_delete_race: AtomicBool,
}

impl FaultySessionRepository {
    pub fn new(inner: InMemorySessionRepository) -> Self {
        Self {
            inner,
            failing_operation: Mutex::new(None),
            conflicting_operation: Mutex::new(None),
            delay: Mutex::new(None),
            stalled_operation: Mutex::new(None),
            lose_delete_race: AtomicBool::new(false),
        }
    }

    /// Make `operation` return a storage error
    pub fn fail_on(&self, operation: &'static str) {
        *self.failing_operation.lock().unwrap() = Some(operation);
    }

    /// Make `operation` report a uniqueness conflict
    pub fn conflict_on(&self, operation: &'static str) {
        *self.conflicting_operation.lock().unwrap() = Some(operation);
    }

    /// Stall every operation by `delay`
    pub fn stall(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Stall only `operation` by `delay`, before it reaches the store
    pub fn stall_on(&self, operation: &'static str, delay: Duration) {
        *self.stalled_operation.lock().unwrap() = Some((operation, delay));
    }

    /// `delete_by_id` and `replace` remove the old record but report that
    /// someone else did
    pub fn lose_delete_race(&self) {
        self.lose_delete_race.store(true, Ordering::SeqCst);
    }

    async fn enter(&self, operation: &'static str) -> Result<(), DomainError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let stalled = *self.stalled_operation.lock().unwrap();
        if let Some((stalled, delay)) = stalled {
            if stalled == operation {
                tokio::time::sleep(delay).await;
            }
        }

        if *self.failing_operation.lock().unwrap() == Some(operation) {
            return Err(DomainError::storage(operation, "injected fault"));
        }
        if *self.conflicting_operation.lock().unwrap() == Some(operation) {
            return Err(DomainError::Conflict {
                message: format!("{}: injected conflict", operation),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for FaultySessionRepository {
    async fn create(&self, session: Session) -> Result<Session, DomainError> {
        self.enter("create").await?;
        self.inner.create(session).await
    }

    async fn find_by_id(&self, session_id: Uuid) -> Result<Option<Session>, DomainError> {
        self.enter("find_by_id").await?;
        self.inner.find_by_id(session_id).await
    }

    async fn find_by_entity_and_device(
        &self,
        entity_id: Uuid,
        user_agent: &str,
    ) -> Result<Option<Session>, DomainError> {
        self.enter("find_by_entity_and_device").await?;
        self.inner.find_by_entity_and_device(entity_id, user_agent).await
    }

    async fn find_all_by_entity(&self, entity_id: Uuid) -> Result<Vec<Session>, DomainError> {
        self.enter("find_all_by_entity").await?;
        self.inner.find_all_by_entity(entity_id).await
    }

    async fn delete_by_id(&self, session_id: Uuid) -> Result<bool, DomainError> {
        self.enter("delete_by_id").await?;
        let removed = self.inner.delete_by_id(session_id).await?;
        if self.lose_delete_race.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(removed)
    }

    async fn replace(&self, old_session_id: Uuid, replacement: Session) -> Result<bool, DomainError> {
        self.enter("replace").await?;
        if self.lose_delete_race.load(Ordering::SeqCst) {
            self.inner.delete_by_id(old_session_id).await?;
            return Ok(false);
        }
        self.inner.replace(old_session_id, replacement).await
    }

    async fn delete_all_by_entity(&self, entity_id: Uuid) -> Result<usize, DomainError> {
        self.enter("delete_all_by_entity").await?;
        self.inner.delete_all_by_entity(entity_id).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DomainError> {
        self.enter("delete_expired").await?;
        self.inner.delete_expired(now).await
    }
}

/// A session service wired to a manual clock and an inspectable store
pub struct Harness {
    pub service: SessionService<FaultySessionRepository, PlainVerifier>,
    pub store: InMemorySessionRepository,
    pub repository: Arc<FaultySessionRepository>,
    pub codec: Arc<TokenCodec>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SessionServiceConfig::default())
    }

    pub fn with_config(config: SessionServiceConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let codec = Arc::new(TokenCodec::new(
            TokenCodecConfig {
                access_secret: "access-test-secret".to_string(),
                refresh_secret: "refresh-test-secret".to_string(),
                access_token_expiry_secs: 2520,
                refresh_token_expiry_secs: 120960,
                issuer: "keystone-test".to_string(),
            },
            clock.clone(),
            Arc::new(UuidV4Generator),
        ));
        let store = InMemorySessionRepository::new();
        let repository = Arc::new(FaultySessionRepository::new(store.clone()));
        let service = SessionService::new(
            repository.clone(),
            Arc::new(PlainVerifier),
            codec.clone(),
            config,
        );

        Self {
            service,
            store,
            repository,
            codec,
            clock,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        use crate::services::clock::Clock;
        self.clock.now()
    }

    pub async fn live_sessions(&self, entity_id: Uuid) -> usize {
        self.store.count_live_by_entity(entity_id, self.now()).await.unwrap()
    }
}

pub fn user() -> EntityRef {
    EntityRef::new(Uuid::new_v4(), EntityType::User)
}

pub fn device(user_agent: &str, client_ip: &str) -> DeviceContext {
    DeviceContext::new(user_agent, client_ip)
}

pub fn login_request(entity: EntityRef, device: DeviceContext) -> LoginRequest {
    LoginRequest {
        entity,
        stored_hash: SECRET.to_string(),
        candidate_secret: SECRET.to_string(),
        device,
    }
}

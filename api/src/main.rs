use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ks_api::handlers::CookieSettings;
use ks_api::{create_app, AppState};
use ks_core::domain::entities::{Account, EntityType};
use ks_core::repositories::{
    AccountRepository, InMemoryAccountRepository, InMemorySessionRepository, SessionRepository,
};
use ks_core::services::{
    hash_secret, AuthService, BcryptVerifier, SessionCleanupConfig, SessionCleanupService,
    SessionService, SessionServiceConfig, TokenCodec, TokenCodecConfig,
};
use ks_infra::database::{DatabasePool, MySqlAccountRepository, MySqlSessionRepository};
use ks_shared::config::{AppConfig, LogFormat, LoggingConfig, SessionStoreKind};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting Keystone API server");

    if config.jwt.is_using_default_secret() {
        warn!("Token secrets are the built-in defaults; set ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET");
    }
    if config.jwt.shares_secret() {
        warn!("Access and refresh tokens share one signing secret");
    }

    let codec = Arc::new(TokenCodec::with_system_clock(TokenCodecConfig::from(&config.jwt)));

    match config.session.store {
        SessionStoreKind::Mysql => {
            let pool = DatabasePool::new(&config.database)
                .await
                .context("failed to connect to MySQL")?;
            pool.run_migrations()
                .await
                .context("failed to run database migrations")?;

            let sessions = Arc::new(MySqlSessionRepository::new(pool.get_pool().clone()));
            let accounts = Arc::new(MySqlAccountRepository::new(pool.get_pool().clone()));
            serve(config, accounts, sessions, codec).await?;
            pool.close().await;
        }
        SessionStoreKind::Memory => {
            warn!("Using the in-memory session store; sessions are lost on restart");
            let accounts = Arc::new(seeded_accounts().await?);
            let sessions = Arc::new(InMemorySessionRepository::new());
            serve(config, accounts, sessions, codec).await?;
        }
    }

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);

    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

/// Accounts for local runs without a database
///
/// `SEED_USER_EMAIL` / `SEED_USER_PASSWORD` and `SEED_ADMIN_EMAIL` /
/// `SEED_ADMIN_PASSWORD` each add one account when both are set.
async fn seeded_accounts() -> anyhow::Result<InMemoryAccountRepository> {
    let accounts = InMemoryAccountRepository::new();

    for (entity_type, email_key, password_key) in [
        (EntityType::User, "SEED_USER_EMAIL", "SEED_USER_PASSWORD"),
        (EntityType::Admin, "SEED_ADMIN_EMAIL", "SEED_ADMIN_PASSWORD"),
    ] {
        if let (Ok(email), Ok(password)) = (std::env::var(email_key), std::env::var(password_key)) {
            let hash = hash_secret(&password, bcrypt_cost())?;
            accounts
                .insert(Account::new(uuid::Uuid::new_v4(), entity_type, email, hash))
                .await;
            info!(%entity_type, "Seeded in-memory account");
        }
    }

    Ok(accounts)
}

fn bcrypt_cost() -> u32 {
    std::env::var("SEED_BCRYPT_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10)
}

async fn serve<A, R>(
    config: AppConfig,
    accounts: Arc<A>,
    repository: Arc<R>,
    codec: Arc<TokenCodec>,
) -> anyhow::Result<()>
where
    A: AccountRepository + 'static,
    R: SessionRepository + 'static,
{
    let cleanup = Arc::new(SessionCleanupService::new(
        repository.clone(),
        codec.clock(),
        SessionCleanupConfig::from(&config.session),
    ));
    cleanup.start_background_task();

    let sessions = Arc::new(SessionService::new(
        repository,
        Arc::new(BcryptVerifier),
        codec,
        SessionServiceConfig::from(&config.session),
    ));
    let auth_service = Arc::new(AuthService::new(accounts, sessions));
    let state = web::Data::new(AppState::new(
        auth_service,
        CookieSettings::from(&config.session),
    ));

    let environment = config.environment;
    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone(), environment));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await?;

    Ok(())
}

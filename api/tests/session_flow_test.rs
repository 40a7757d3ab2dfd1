//! End-to-end tests of the login, renew, logout and identity endpoints
//! against the in-memory stores

use std::sync::Arc;

use actix_web::{
    cookie::Cookie,
    dev::ServiceResponse,
    http::{header, StatusCode},
    test, web,
};
use serde_json::Value;
use uuid::Uuid;

use ks_api::handlers::{CookieSettings, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use ks_api::{create_app, AppState};
use ks_core::domain::entities::{Account, EntityType};
use ks_core::repositories::{InMemoryAccountRepository, InMemorySessionRepository};
use ks_core::services::{
    hash_secret, AuthService, BcryptVerifier, SessionService, SessionServiceConfig, TokenCodec,
    TokenCodecConfig,
};
use ks_shared::config::Environment;

const USER_EMAIL: &str = "ada@example.com";
const ADMIN_EMAIL: &str = "root@example.com";
const PASSWORD: &str = "s3cret-passphrase";
const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64)";

type TestState =
    AppState<InMemoryAccountRepository, SessionService<InMemorySessionRepository, BcryptVerifier>>;

async fn state() -> web::Data<TestState> {
    let accounts = InMemoryAccountRepository::new();
    let hash = hash_secret(PASSWORD, 4).unwrap();
    accounts
        .insert(Account::new(Uuid::new_v4(), EntityType::User, USER_EMAIL, hash.clone()))
        .await;
    accounts
        .insert(Account::new(Uuid::new_v4(), EntityType::Admin, ADMIN_EMAIL, hash))
        .await;

    let sessions = SessionService::new(
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(BcryptVerifier),
        Arc::new(TokenCodec::with_system_clock(TokenCodecConfig::default())),
        SessionServiceConfig::default(),
    );

    web::Data::new(AppState::new(
        Arc::new(AuthService::new(Arc::new(accounts), Arc::new(sessions))),
        CookieSettings::default(),
    ))
}

fn cookie<B>(resp: &ServiceResponse<B>, name: &str) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == name)
        .map(|c| c.into_owned())
}

macro_rules! login {
    ($app:expr, $path:expr, $email:expr, $password:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::post()
                .uri($path)
                .insert_header((header::USER_AGENT, BROWSER))
                .insert_header(("X-Forwarded-For", "203.0.113.7"))
                .set_json(serde_json::json!({ "email": $email, "password": $password }))
                .to_request(),
        )
        .await
    };
}

macro_rules! renew {
    ($app:expr, $refresh:expr, $user_agent:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::post()
                .uri("/api/v1/tokens/renew")
                .insert_header((header::USER_AGENT, $user_agent))
                .insert_header(("X-Forwarded-For", "203.0.113.7"))
                .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, $refresh.to_string()))
                .to_request(),
        )
        .await
    };
}

#[actix_web::test]
async fn test_health_check() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_user_login_sets_cookies_and_identifies_entity() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let resp = login!(app, "/api/v1/users/login", "ADA@example.com", PASSWORD);
    assert_eq!(resp.status(), StatusCode::CREATED);

    let access = cookie(&resp, ACCESS_TOKEN_COOKIE).expect("access cookie");
    let refresh = cookie(&resp, REFRESH_TOKEN_COOKIE).expect("refresh cookie");
    assert_eq!(access.http_only(), Some(true));
    assert_eq!(refresh.path(), Some("/"));
    assert!(refresh.expires_datetime().is_some());

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, access.value().to_string()))
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = test::read_body_json(me).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["entityType"], "user");
}

#[actix_web::test]
async fn test_me_accepts_bearer_header_and_rejects_refresh_token() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;
    let resp = login!(app, "/api/v1/admins/login", ADMIN_EMAIL, PASSWORD);
    assert_eq!(resp.status(), StatusCode::CREATED);
    let access = cookie(&resp, ACCESS_TOKEN_COOKIE).unwrap();
    let refresh = cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap();

    let me = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", access.value())))
            .to_request(),
    )
    .await;
    assert_eq!(me.status(), StatusCode::OK);
    let body: Value = test::read_body_json(me).await;
    assert_eq!(body["data"]["entityType"], "admin");

    let wrong_class = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", refresh.value())))
            .to_request(),
    )
    .await;
    assert_eq!(wrong_class.status(), StatusCode::UNAUTHORIZED);

    let anonymous =
        test::call_service(&app, test::TestRequest::get().uri("/api/v1/auth/me").to_request()).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_login_failures() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let wrong_password = login!(app, "/api/v1/users/login", USER_EMAIL, "nope");
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert!(cookie(&wrong_password, REFRESH_TOKEN_COOKIE).is_none());
    let body: Value = test::read_body_json(wrong_password).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    // Users cannot log in through the admin endpoint
    let wrong_table = login!(app, "/api/v1/admins/login", USER_EMAIL, PASSWORD);
    assert_eq!(wrong_table.status(), StatusCode::UNAUTHORIZED);

    let bad_email = login!(app, "/api/v1/users/login", "not-an-email", PASSWORD);
    assert_eq!(bad_email.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let garbage = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/login")
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request(),
    )
    .await;
    assert_eq!(garbage.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(garbage).await;
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[actix_web::test]
async fn test_renew_without_cookie_is_forbidden() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/v1/tokens/renew").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_renew_rotates_and_replay_revokes_everything() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;
    let resp = login!(app, "/api/v1/users/login", USER_EMAIL, PASSWORD);
    let r1 = cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().value().to_string();

    let renewed = renew!(app, r1, BROWSER);
    assert_eq!(renewed.status(), StatusCode::OK);
    let r2 = cookie(&renewed, REFRESH_TOKEN_COOKIE).unwrap().value().to_string();
    assert_ne!(r1, r2);

    let replay = renew!(app, r1, BROWSER);
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(replay).await;
    assert_eq!(body["code"], "SESSION_NOT_FOUND");

    // The purge took the legitimate successor with it
    let after_purge = renew!(app, r2, BROWSER);
    assert_eq!(after_purge.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_renew_from_another_device_is_rejected() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;
    let resp = login!(app, "/api/v1/users/login", USER_EMAIL, PASSWORD);
    let refresh = cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().value().to_string();

    let stolen = renew!(app, refresh, "curl/8.0");
    assert_eq!(stolen.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(stolen).await;
    assert_eq!(body["code"], "INVALID_REFRESH_TOKEN");

    // The mismatch deleted the session, so the real device is logged out too
    let original = renew!(app, refresh, BROWSER);
    assert_eq!(original.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_oversized_device_headers_still_log_in_and_renew() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;
    let long_agent = format!("Mozilla/5.0 {}", "x".repeat(600));

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/users/login")
            .insert_header((header::USER_AGENT, long_agent.as_str()))
            .insert_header(("X-Forwarded-For", "y".repeat(100)))
            .set_json(serde_json::json!({ "email": USER_EMAIL, "password": PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let refresh = cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().value().to_string();

    let renewed = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/tokens/renew")
            .insert_header((header::USER_AGENT, long_agent.as_str()))
            .insert_header(("X-Forwarded-For", "y".repeat(100)))
            .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, refresh))
            .to_request(),
    )
    .await;
    assert_eq!(renewed.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_logout_clears_cookies() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;
    let resp = login!(app, "/api/v1/users/login", USER_EMAIL, PASSWORD);
    let refresh = cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().value().to_string();

    let logout = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, refresh.clone()))
            .to_request(),
    )
    .await;
    assert_eq!(logout.status(), StatusCode::OK);
    assert_eq!(cookie(&logout, ACCESS_TOKEN_COOKIE).unwrap().value(), "");
    assert_eq!(cookie(&logout, REFRESH_TOKEN_COOKIE).unwrap().value(), "");

    let renew_after_logout = renew!(app, refresh, BROWSER);
    assert_eq!(renew_after_logout.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_without_cookie_still_clears() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/api/v1/auth/logout").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(cookie(&resp, REFRESH_TOKEN_COOKIE).unwrap().value(), "");
}

#[actix_web::test]
async fn test_unknown_route_is_json_404() {
    let app = test::init_service(create_app(state().await, Environment::Development)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "NOT_FOUND");
}

//! HTTP boundary for the Keystone session service
//!
//! Library exports for the binary and for the integration tests.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use app::{create_app, AppState};

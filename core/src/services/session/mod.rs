//! Session service module
//!
//! This module owns the refresh token lifecycle:
//! - Login with per-device session reuse
//! - Renewal with rotation, binding checks and reuse detection
//! - Logout
//! - Background removal of expired session records

mod cleanup;
mod config;
mod manager;
mod service;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, SessionCleanupConfig, SessionCleanupService};
pub use config::SessionServiceConfig;
pub use manager::{LoginRequest, SessionManager};
pub use service::SessionService;

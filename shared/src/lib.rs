//! Shared configuration and common types for the Keystone server
//!
//! This crate provides functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - The error response shape returned at the HTTP boundary

pub mod config;
pub mod errors;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, Environment,
    DatabaseConfig, JwtConfig, SessionConfig, SessionStoreKind,
    ServerConfig, LoggingConfig,
};
pub use errors::{ErrorResponse, error_codes};

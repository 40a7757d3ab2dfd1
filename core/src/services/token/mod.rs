//! Token codec module for JWT management
//!
//! This module handles all stateless token operations:
//! - Access and refresh token issuance, each class with its own secret
//! - Verification that fails closed on expiry, forgery and malformed input
//! - Rotation into a fresh access and refresh pair

mod codec;
mod config;


pub use codec::{RotatedTokens, TokenCodec};
pub use config::TokenCodecConfig;

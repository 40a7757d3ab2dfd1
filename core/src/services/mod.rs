//! Business services containing domain logic and use cases.

pub mod auth;
pub mod clock;
pub mod credential;
pub mod id_generator;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::AuthService;
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{hash_secret, BcryptVerifier, CredentialVerifier};
pub use id_generator::{IdGenerator, UuidV4Generator};
pub use session::{
    LoginRequest, SessionCleanupConfig, SessionCleanupService, SessionManager, SessionService,
    SessionServiceConfig,
};
pub use token::{TokenCodec, TokenCodecConfig};

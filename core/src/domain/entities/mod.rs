//! Domain entities representing core business objects.

pub mod account;
pub mod entity;
pub mod session;
pub mod token;


// Re-export commonly used types
pub use account::{normalize_email, Account};
pub use entity::{DeviceContext, EntityRef, EntityType};
pub use session::Session;
pub use token::{Claims, IssuedToken, TokenClass, TokenDetails, TokenPair};

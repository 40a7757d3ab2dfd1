pub mod auth;
pub mod response;

pub use auth::*;
pub use response::*;
pub use ks_shared::errors::ErrorResponse;

//! Authentication route handlers
//!
//! - Password login for users and administrators
//! - Token renewal
//! - Logout
//! - Current identity

pub mod login;
pub mod logout;
pub mod me;
pub mod renew;

pub use login::{login_admin, login_user};
pub use logout::logout;
pub use me::me;
pub use renew::renew;

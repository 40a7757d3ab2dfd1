//! Password login for users and administrators
//!
//! Resolves an account by email and hands the credential check and session
//! bookkeeping to a [`SessionManager`](crate::services::session::SessionManager).

mod service;

#[cfg(test)]
mod tests;

pub use service::AuthService;

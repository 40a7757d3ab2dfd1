//! MySQL repository implementations

mod account_repository_impl;
mod session_repository_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use session_repository_impl::MySqlSessionRepository;

pub mod cookies;
pub mod device;
pub mod error;

pub use cookies::{CookieSettings, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
pub use device::{bearer_token, device_context};
pub use error::{handle_domain_error, json_error_handler, missing_refresh_cookie, validation_failed};

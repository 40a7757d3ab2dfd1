//! Token delivery through cookies

use actix_web::cookie::{time::OffsetDateTime, Cookie, Expiration, SameSite};
use actix_web::{HttpResponse, HttpResponseBuilder};
use chrono::{DateTime, Utc};

use ks_core::domain::entities::{TokenDetails, TokenPair};
use ks_shared::config::SessionConfig;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Attributes applied to every token cookie
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: SameSite::Strict,
        }
    }
}

impl From<&SessionConfig> for CookieSettings {
    fn from(config: &SessionConfig) -> Self {
        let same_site = match config.cookie_same_site.to_ascii_lowercase().as_str() {
            "lax" => SameSite::Lax,
            "none" => SameSite::None,
            _ => SameSite::Strict,
        };

        Self {
            secure: config.cookie_secure,
            same_site,
        }
    }
}

fn expiration(at: DateTime<Utc>) -> Expiration {
    OffsetDateTime::from_unix_timestamp(at.timestamp())
        .map(Expiration::DateTime)
        .unwrap_or(Expiration::Session)
}

impl CookieSettings {
    /// HttpOnly cookie that expires with the token
    pub fn token_cookie(&self, name: &'static str, token: &TokenDetails) -> Cookie<'static> {
        Cookie::build(name, token.value.clone())
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .expires(expiration(token.expires_at))
            .finish()
    }

    /// Cookie that makes the browser drop `name`
    pub fn removal_cookie(&self, name: &'static str) -> Cookie<'static> {
        let mut cookie = Cookie::build(name, "")
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .finish();
        cookie.make_removal();
        cookie
    }

    /// Attach both tokens of a pair
    pub fn attach_pair(&self, builder: &mut HttpResponseBuilder, pair: &TokenPair) {
        builder
            .cookie(self.token_cookie(ACCESS_TOKEN_COOKIE, &pair.access_token))
            .cookie(self.token_cookie(REFRESH_TOKEN_COOKIE, &pair.refresh_token));
    }

    /// Clear both token cookies
    pub fn clear_pair(&self, builder: &mut HttpResponseBuilder) {
        builder
            .cookie(self.removal_cookie(ACCESS_TOKEN_COOKIE))
            .cookie(self.removal_cookie(REFRESH_TOKEN_COOKIE));
    }

    /// Clear both token cookies on an already built response
    pub fn clear_on(&self, response: &mut HttpResponse) {
        for name in [ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE] {
            if let Err(e) = response.add_cookie(&self.removal_cookie(name)) {
                tracing::warn!(cookie = name, error = %e, "Failed to clear cookie");
            }
        }
    }
}

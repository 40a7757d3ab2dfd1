//! Stateless signing and verification of access and refresh tokens

use std::sync::Arc;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

use crate::domain::entities::{Claims, EntityRef, IssuedToken, TokenClass};
use crate::errors::TokenError;
use crate::services::clock::{Clock, SystemClock};
use crate::services::id_generator::{IdGenerator, UuidV4Generator};

use super::config::TokenCodecConfig;

/// Encoding and decoding key for one token class
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl SigningKeys {
    fn new(secret: &str, lifetime_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }
}

/// A new access and refresh token for the same entity
#[derive(Debug, Clone)]
pub struct RotatedTokens {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Creates and verifies HS256 tokens carrying identity claims
///
/// The codec never touches storage. Time comes from the injected [`Clock`]
/// rather than the library's wall clock, and refresh token ids from the
/// injected [`IdGenerator`].
pub struct TokenCodec {
    access: SigningKeys,
    refresh: SigningKeys,
    issuer: String,
    validation: Validation,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl TokenCodec {
    /// Creates a new codec
    ///
    /// # Arguments
    ///
    /// * `config` - Secrets, lifetimes and issuer
    /// * `clock` - Time source for `iat`/`nbf`/`exp` and for expiry checks
    /// * `ids` - Source of refresh token ids
    pub fn new(
        config: TokenCodecConfig,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "sub"]);
        // Expiry and not-before are checked against the injected clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            access: SigningKeys::new(&config.access_secret, config.access_token_expiry_secs),
            refresh: SigningKeys::new(&config.refresh_secret, config.refresh_token_expiry_secs),
            issuer: config.issuer,
            validation,
            clock,
            ids,
        }
    }

    /// Creates a codec on the system clock with random ids
    pub fn with_system_clock(config: TokenCodecConfig) -> Self {
        Self::new(config, Arc::new(SystemClock), Arc::new(UuidV4Generator))
    }

    /// Current time as seen by this codec
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Shared handle to the codec's clock
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    fn keys(&self, class: TokenClass) -> &SigningKeys {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }

    /// Signs a new token of `class` for `entity`
    ///
    /// Only refresh tokens get a `jti`; it becomes the session id.
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - The signed token and its claims
    /// * `Err(TokenError::GenerationFailed)` - Signing or serialization failed
    pub fn issue(&self, class: TokenClass, entity: &EntityRef) -> Result<IssuedToken, TokenError> {
        let keys = self.keys(class);
        let token_id = match class {
            TokenClass::Refresh => Some(self.ids.next_id()),
            TokenClass::Access => None,
        };

        let claims = Claims::new(entity, token_id, &self.issuer, self.clock.now(), keys.lifetime_secs);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(|e| {
            TokenError::GenerationFailed {
                reason: format!("failed to sign {} token: {}", class.as_str(), e),
            }
        })?;

        Ok(IssuedToken { token, claims })
    }

    /// Verifies `token` as a token of `class`
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Claims))` - Signature, issuer, class and time window all check out
    /// * `Ok(None)` - Expired, not yet valid, forged, or structurally not a token
    /// * `Err(TokenError::Malformed)` - Correct shape but undecodable content
    pub fn verify(&self, token: &str, class: TokenClass) -> Result<Option<Claims>, TokenError> {
        let keys = self.keys(class);

        let claims = match decode::<Claims>(token, &keys.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::InvalidSignature
                    | ErrorKind::ExpiredSignature
                    | ErrorKind::ImmatureSignature
                    | ErrorKind::InvalidIssuer
                    | ErrorKind::InvalidAlgorithm => {
                        debug!(class = class.as_str(), reason = ?e.kind(), "Token rejected");
                        Ok(None)
                    }
                    _ => Err(TokenError::Malformed {
                        reason: e.to_string(),
                    }),
                };
            }
        };

        if !claims.is_active_at(self.clock.now()) {
            debug!(class = class.as_str(), "Token outside its validity window");
            return Ok(None);
        }

        let class_matches = match class {
            TokenClass::Access => claims.jti.is_none(),
            TokenClass::Refresh => claims.jti.is_some(),
        };
        if !class_matches {
            debug!(class = class.as_str(), "Token presented as the wrong class");
            return Ok(None);
        }

        Ok(Some(claims))
    }

    /// Issues a new access and refresh token for `entity`
    pub fn rotate(&self, entity: &EntityRef) -> Result<RotatedTokens, TokenError> {
        Ok(RotatedTokens {
            access: self.issue(TokenClass::Access, entity)?,
            refresh: self.issue(TokenClass::Refresh, entity)?,
        })
    }
}

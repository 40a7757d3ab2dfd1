//! Password hash comparison

use crate::errors::DomainError;

/// Compares a submitted secret against a stored one-way hash
pub trait CredentialVerifier: Send + Sync {
    /// `true` only when `candidate` hashes to `stored_hash`
    fn compare(&self, stored_hash: &str, candidate: &str) -> bool;
}

/// bcrypt-backed verifier
///
/// A malformed stored hash compares as a mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcryptVerifier;

impl CredentialVerifier for BcryptVerifier {
    fn compare(&self, stored_hash: &str, candidate: &str) -> bool {
        bcrypt::verify(candidate, stored_hash).unwrap_or(false)
    }
}

/// Hash a secret for seeding accounts
///
/// # Arguments
/// * `secret` - Plaintext secret
/// * `cost` - bcrypt cost factor, `bcrypt::DEFAULT_COST` outside tests
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, DomainError> {
    bcrypt::hash(secret, cost).map_err(|e| DomainError::Internal {
        message: format!("Failed to hash secret: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_round_trip() {
        let hash = hash_secret("correct horse", 4).unwrap();
        let verifier = BcryptVerifier;

        assert!(verifier.compare(&hash, "correct horse"));
        assert!(!verifier.compare(&hash, "battery staple"));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!BcryptVerifier.compare("not-a-bcrypt-hash", "anything"));
    }
}

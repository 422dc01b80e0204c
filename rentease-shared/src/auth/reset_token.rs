/// Password reset tokens
///
/// A reset token is 32 random bytes (256 bits), hex encoded. Only its SHA-256
/// digest is stored on the user; the plaintext goes back to the caller once.
///
/// # Example
///
/// ```
/// use rentease_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let token = generate_reset_token();
/// assert_eq!(token.len(), 64);
/// assert_eq!(hash_reset_token(&token).len(), 64);
/// ```

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Random bytes per token
pub const RESET_TOKEN_BYTES: usize = 32;

/// Default lifetime of a reset token
pub const DEFAULT_RESET_TOKEN_TTL_SECS: i64 = 3600;

/// A freshly issued reset token
#[derive(Debug, Clone, Serialize)]
pub struct ResetToken {
    /// Plaintext token, handed to the user
    pub token: String,

    /// Absolute expiry stored next to the digest
    pub expires_at: DateTime<Utc>,
}

/// Generates a new random token
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// SHA-256 hex digest of a token, as persisted
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_unique_hex() {
        let a = generate_reset_token();
        let b = generate_reset_token();

        assert_ne!(a, b);
        assert_eq!(a.len(), RESET_TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_is_deterministic() {
        let token = generate_reset_token();
        assert_eq!(hash_reset_token(&token), hash_reset_token(&token));
        assert_ne!(hash_reset_token(&token), token);
    }

    #[test]
    fn test_known_digest() {
        assert_eq!(
            hash_reset_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}

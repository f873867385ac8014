//! Credential primitives shared by the TVR services
//!
//! Pure functions only: password hashing, verification codes, and session
//! tokens. No HTTP framework dependencies (Axum, etc.) - those live in
//! module-specific code.

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated verification codes
pub const VERIFICATION_CODE_LEN: usize = 6;

/// Verification codes expire this many minutes after issue
pub const VERIFICATION_CODE_TTL_MINUTES: i64 = 30;

// ========================================
// Password Hashing
// ========================================

/// Generate a random hex salt (32 hex chars)
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Hash a password with the given salt
///
/// SHA-256 over `salt || password`, returned as 64 hex characters.
///
/// # Examples
///
/// ```
/// use tvr_common::auth::hash_password;
///
/// let hash = hash_password("hunter2", "00ff");
/// assert_eq!(hash.len(), 64);
/// assert_eq!(hash, hash_password("hunter2", "00ff"));
/// assert_ne!(hash, hash_password("hunter2", "ff00"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Verify a password against a stored hash/salt pair
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt) == expected_hash
}

// ========================================
// Verification Codes and Session Tokens
// ========================================

/// Generate a random verification code (6 digits)
///
/// Emailed to the user after registration; matched by exact lookup.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    (0..VERIFICATION_CODE_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Generate an opaque session token (48 alphanumeric chars)
pub fn generate_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salt_is_random_hex() {
        let a = generate_salt();
        let b = generate_salt();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_password_deterministic() {
        let hash = hash_password("secret", "abcd");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, hash_password("secret", "abcd"));
    }

    #[test]
    fn test_hash_password_salt_changes_hash() {
        assert_ne!(hash_password("secret", "aa"), hash_password("secret", "bb"));
    }

    #[test]
    fn test_verify_password_roundtrip() {
        let salt = generate_salt();
        let hash = hash_password("correct horse", &salt);

        assert!(verify_password("correct horse", &salt, &hash));
        assert!(!verify_password("wrong horse", &salt, &hash));
    }

    #[test]
    fn test_verification_code_shape() {
        let code = generate_verification_code();
        assert_eq!(code.len(), VERIFICATION_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_session_tokens_unique() {
        let a = generate_session_token();
        let b = generate_session_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, b);
    }
}

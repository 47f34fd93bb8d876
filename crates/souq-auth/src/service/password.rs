//! Password hashing and generation

use base64::Engine;
use rand::Rng;

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Verify a password against a stored bcrypt hash.
///
/// A malformed hash counts as a failed verification rather than an error.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Random URL-safe password for accounts created through Google sign-in.
pub fn random_password() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn test_verify_malformed_hash() {
        assert!(!verify_password("whatever", "not-a-bcrypt-hash"));
    }

    #[test]
    fn test_random_password_uniqueness() {
        let p1 = random_password();
        let p2 = random_password();
        assert_ne!(p1, p2);
        // 16 bytes base64url without padding
        assert_eq!(p1.len(), 22);
    }
}

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Valid,
    /// Matched an unsalted SHA-256 hash; the caller should re-hash
    ValidLegacy,
    Invalid,
}

/// Argon2id PHC string with a random salt
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| PasswordError::Hash(e.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

pub fn verify_password(password: &str, stored: &str) -> PasswordCheck {
    if is_legacy_hash(stored) {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        let computed = format!("{:x}", hasher.finalize());
        return if constant_time_eq(computed.as_bytes(), stored.to_ascii_lowercase().as_bytes()) {
            PasswordCheck::ValidLegacy
        } else {
            PasswordCheck::Invalid
        };
    }

    match PasswordHash::new(stored) {
        Ok(parsed) if Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok() => {
            PasswordCheck::Valid
        }
        _ => PasswordCheck::Invalid,
    }
}

fn is_legacy_hash(stored: &str) -> bool {
    stored.len() == 64 && stored.chars().all(|c| c.is_ascii_hexdigit())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(verify_password("hunter22", &hash), PasswordCheck::Valid);
        assert_eq!(verify_password("wrong", &hash), PasswordCheck::Invalid);
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_legacy_sha256_hash() {
        // sha256("password")
        let legacy = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
        assert_eq!(verify_password("password", legacy), PasswordCheck::ValidLegacy);
        assert_eq!(verify_password("password", &legacy.to_uppercase()), PasswordCheck::ValidLegacy);
        assert_eq!(verify_password("nope", legacy), PasswordCheck::Invalid);
    }

    #[test]
    fn test_garbage_hash_is_invalid() {
        assert_eq!(verify_password("x", ""), PasswordCheck::Invalid);
        assert_eq!(verify_password("x", "plaintext"), PasswordCheck::Invalid);
    }
}

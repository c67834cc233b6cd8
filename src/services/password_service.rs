//! Password hashing, verification and strength policy.
//!
//! Hashes are Argon2id PHC strings. Hashing is CPU bound, so both hashing
//! and verification run on tokio's blocking pool.

use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use regex::Regex;

use crate::error::AppError;

const SALT_LEN: usize = 16;

/// Special characters a password may (and must, at least once) contain.
pub const PASSWORD_SPECIALS: &str = "@$!%*?&#^";

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 12;

static ALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9@$!%*?&#^]+$").expect("password charset regex"));

/// Hash a plaintext password with a fresh random salt.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task failed: {e}")))?
}

/// Check a plaintext password against a stored hash.
///
/// A stored value that is not a valid PHC string never matches.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {e}")))?
}

fn hash_blocking(password: &str) -> Result<String, AppError> {
    let salt_bytes: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("salt encoding failed: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
            return Ok(false);
        }
    };

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!("password verification failed: {e}"))),
    }
}

/// Enforce the password policy.
///
/// At least 12 characters drawn from ASCII letters, digits and
/// `@$!%*?&#^`, with at least one of each class.
pub fn validate_password_strength(password: &str) -> Result<(), AppError> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if long_enough && has_letter && has_digit && has_special && ALLOWED_CHARS.is_match(password) {
        Ok(())
    } else {
        Err(AppError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long, include a letter, a number, and one of {PASSWORD_SPECIALS}."
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_and_verifies_passwords() {
        let hash = hash_password("Tr1p&Tracker!".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Tr1p&Tracker!".into(), hash.clone()).await.unwrap());
        assert!(!verify_password("wrong".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let first = hash_password("Tr1p&Tracker!".into()).await.unwrap();
        let second = hash_password("Tr1p&Tracker!".into()).await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn malformed_hash_never_matches() {
        assert!(!verify_password("anything".into(), "not-a-hash".into()).await.unwrap());
    }

    #[test]
    fn accepts_strong_password() {
        assert!(validate_password_strength("Voyage2024!abc").is_ok());
    }

    #[test]
    fn rejects_weak_passwords() {
        for weak in [
            "Sh0rt!",           // too short
            "NoDigitsHere!!",   // no digit
            "123456789012!",    // no letter
            "NoSpecials12345",  // no special
            "Spaces are 1ok!!", // space outside the charset
        ] {
            assert!(
                matches!(validate_password_strength(weak), Err(AppError::WeakPassword(_))),
                "{weak} should be rejected"
            );
        }
    }
}

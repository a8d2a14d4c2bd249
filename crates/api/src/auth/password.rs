//! Password hashing and account-password policy.
//!
//! Hashes are Argon2id in PHC string format, so parameters and salt travel
//! with the hash and can be tightened later without a migration.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum password length in characters, not bytes.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Check a plaintext password against a stored PHC hash.
///
/// `Ok(false)` means the password simply does not match; `Err` means the
/// stored hash itself could not be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Apply the password policy to a candidate password.
///
/// Length is measured in characters so multi-byte passwords are not
/// penalized. The error string is safe to return to the client.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        ));
    }
    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_the_original_password() {
        let hash = hash_password("vierzig-tausend-volt").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("vierzig-tausend-volt", &hash).expect("verify"));
    }

    #[test]
    fn test_verify_rejects_other_passwords() {
        let hash = hash_password("original-password").expect("hash");
        assert!(!verify_password("guessed-password", &hash).expect("verify"));
    }

    #[test]
    fn test_garbage_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_policy_counts_characters_not_bytes() {
        // Eight two-byte characters: passes even though it is 16 bytes.
        assert!(validate_password_strength("ĉĉĉĉĉĉĉĉ").is_ok());
        assert!(validate_password_strength("ĉĉĉĉĉĉĉ").is_err());
    }

    #[test]
    fn test_policy_rejects_short_and_blank() {
        let err = validate_password_strength("short").unwrap_err();
        assert!(err.contains("at least 8 characters"));

        assert!(validate_password_strength("        ").is_err());
    }
}

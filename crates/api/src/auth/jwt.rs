//! Access-token and refresh-token primitives.
//!
//! An access token is a short-lived HS256 JWT carrying [`Claims`]. A refresh
//! token is an opaque random string: the client holds the plaintext, the
//! sessions table holds only its SHA-256 digest, so a leaked database dump
//! cannot be replayed against the refresh endpoint.

use coursebase_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Default access token lifetime in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token lifetime in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Payload carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id the token was issued to.
    pub sub: DbId,
    /// Role name at issue time (`"admin"` or `"student"`). Role changes take
    /// effect once the current access token expires.
    pub role: String,
    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Token id. UUID v7, so ids sort by issue time in audit logs.
    pub jti: String,
}

/// Signing secret and token lifetimes, loaded once at startup.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 signing secret.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days.
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty), `JWT_ACCESS_EXPIRY_MINS`
    /// (default 15) and `JWT_REFRESH_EXPIRY_DAYS` (default 7) from the
    /// environment.
    ///
    /// # Panics
    ///
    /// Panics when the secret is missing or empty, or when a lifetime
    /// variable is set but not an integer.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: env_i64("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS),
            refresh_token_expiry_days: env_i64("JWT_REFRESH_EXPIRY_DAYS", DEFAULT_REFRESH_EXPIRY_DAYS),
        }
    }

    fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

fn env_i64(name: &str, default: i64) -> i64 {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be an integer, got {raw:?}")),
        Err(_) => default,
    }
}

/// Sign a new access token for `user_id` with the given role.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: issued_at + config.access_ttl_secs(),
        iat: issued_at,
        jti: Uuid::now_v7().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature and expiry, returning the token's [`Claims`].
///
/// Expiry is checked with the `jsonwebtoken` default leeway (60 seconds), so
/// a token is accepted for up to a minute past its nominal `exp`.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Mint a fresh refresh token.
///
/// Returns `(plaintext, digest)`: the plaintext goes to the client, the
/// digest into the sessions table. Two concatenated UUID v4s give 244 bits
/// of randomness in a 64-char hex string.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let digest = hash_refresh_token(&plaintext);
    (plaintext, digest)
}

/// SHA-256 hex digest of a refresh token, as stored in the sessions table.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-signing-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let config = test_config();
        let token = generate_access_token(7, "student", &config).expect("sign");

        let claims = validate_token(&token, &config).expect("verify");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "student");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_each_token_gets_a_unique_jti() {
        let config = test_config();
        let a = generate_access_token(1, "admin", &config).expect("sign");
        let b = generate_access_token(1, "admin", &config).expect("sign");

        let jti_a = validate_token(&a, &config).expect("verify").jti;
        let jti_b = validate_token(&b, &config).expect("verify").jti;
        assert_ne!(jti_a, jti_b);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let config = test_config();
        let token = generate_access_token(1, "student", &config).expect("sign");

        // Corrupt one character inside the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let mid = chars.len() / 2;
        chars[mid] = if chars[mid] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        assert!(validate_token(&tampered, &config).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let signer = test_config();
        let verifier = JwtConfig {
            secret: "a-different-secret".to_string(),
            ..test_config()
        };

        let token = generate_access_token(1, "student", &signer).expect("sign");
        assert!(validate_token(&token, &verifier).is_err());
    }

    #[test]
    fn test_stale_token_is_rejected() {
        // Negative lifetime puts exp well past the 60s verification leeway.
        let config = JwtConfig {
            access_token_expiry_mins: -5,
            ..test_config()
        };

        let token = generate_access_token(1, "student", &config).expect("sign");
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_refresh_digest_is_stable_hex() {
        let (plaintext, digest) = generate_refresh_token();

        assert_eq!(digest, hash_refresh_token(&plaintext));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

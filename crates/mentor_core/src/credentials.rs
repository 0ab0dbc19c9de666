//! crates/mentor_core/src/credentials.rs
//!
//! Password hashing (Argon2id) and HS256 JWT issuance/validation.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Caller, Role};
use crate::ports::{PortError, PortResult};

/// Issuer embedded in, and required of, every token.
pub const TOKEN_ISSUER: &str = "synapmentor";
/// Default token validity.
pub const TOKEN_TTL_HOURS: i64 = 24;
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("token has expired")]
    Expired,
}

//=========================================================================================
// Passwords
//=========================================================================================

/// Hashes a password into an Argon2id PHC string with a random salt.
pub fn hash_password(plaintext: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("failed to hash password: {e}")))
}

/// Checks a password against a stored hash. A malformed hash never matches.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
pub fn validate_password_strength(plaintext: &str) -> bool {
    plaintext.chars().count() >= MIN_PASSWORD_LENGTH
        && plaintext.chars().any(|c| c.is_ascii_uppercase())
        && plaintext.chars().any(|c| c.is_ascii_lowercase())
        && plaintext.chars().any(|c| c.is_ascii_digit())
}

//=========================================================================================
// Tokens
//=========================================================================================

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user ID (UUID string).
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|e| AuthError::Invalid(format!("bad subject: {e}")))
    }

    pub fn into_caller(self) -> Result<Caller, AuthError> {
        Ok(Caller {
            user_id: self.user_id()?,
            email: self.email,
            role: self.role,
        })
    }
}

/// Signs and verifies access tokens with a key injected at construction.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Fails when the secret is empty; there is no fallback key.
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Invalid("signing secret must not be empty".into()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, AuthError> {
        self.issue_token_at(user_id, email, role, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_token_at(
        &self,
        user_id: Uuid,
        email: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            iss: TOKEN_ISSUER.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Invalid(format!("JWT encode: {e}")))
    }

    /// Verifies signature, issuer and expiry.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            })
    }

    /// Re-issues a still-valid token with a fresh validity window.
    pub fn refresh_token(&self, token: &str) -> Result<String, AuthError> {
        let claims = self.validate_token(token)?;
        self.issue_token(claims.user_id()?, &claims.email, claims.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(TOKEN_TTL_HOURS)).unwrap()
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("Hunter22").unwrap();
        assert!(verify_password("Hunter22", &hash));
        assert!(!verify_password("hunter22", &hash));
    }

    #[test]
    fn malformed_hash_never_matches() {
        assert!(!verify_password("Hunter22", "not-a-hash"));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("Hunter22").unwrap(), hash_password("Hunter22").unwrap());
    }

    #[test]
    fn password_strength_rules() {
        assert!(validate_password_strength("Passw0rd"));
        assert!(!validate_password_strength("Pass0rd"));
        assert!(!validate_password_strength("password1"));
        assert!(!validate_password_strength("PASSWORD1"));
        assert!(!validate_password_strength("Password"));
    }

    #[test]
    fn jwt_roundtrip() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let token = tokens.issue_token(user_id, "a@example.com", Role::Solver).unwrap();
        let claims = tokens.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.email, "a@example.com");
        assert_eq!(claims.role, Role::Solver);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(5);
        let token = tokens
            .issue_token_at(Uuid::new_v4(), "a@example.com", Role::Seeker, issued_at)
            .unwrap();
        assert_eq!(tokens.validate_token(&token), Err(AuthError::Expired));
    }

    #[test]
    fn token_from_other_key_is_invalid() {
        let other = TokenService::new(b"another-secret-entirely-different", Duration::hours(1)).unwrap();
        let token = other.issue_token(Uuid::new_v4(), "a@example.com", Role::Seeker).unwrap();
        assert!(matches!(service().validate_token(&token), Err(AuthError::Invalid(_))));
        assert!(matches!(service().validate_token("garbage"), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn refresh_keeps_identity() {
        let tokens = service();
        let user_id = Uuid::new_v4();
        let issued_at = Utc::now() - Duration::hours(2);
        let old = tokens
            .issue_token_at(user_id, "b@example.com", Role::Admin, issued_at)
            .unwrap();
        let fresh = tokens.refresh_token(&old).unwrap();

        let old_claims = tokens.validate_token(&old).unwrap();
        let new_claims = tokens.validate_token(&fresh).unwrap();
        assert_eq!(new_claims.sub, old_claims.sub);
        assert_eq!(new_claims.role, Role::Admin);
        assert!(new_claims.exp > old_claims.exp);
    }

    #[test]
    fn refresh_of_expired_token_fails() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(30);
        let old = tokens
            .issue_token_at(Uuid::new_v4(), "c@example.com", Role::Seeker, issued_at)
            .unwrap();
        assert_eq!(tokens.refresh_token(&old), Err(AuthError::Expired));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(TokenService::new(b"", Duration::hours(1)).is_err());
    }
}

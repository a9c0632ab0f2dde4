use crate::error::AppError;
use crate::models::AppUser;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Tolerance for clock drift between the token issuer and a verifier when
/// checking expiry-adjacent claims.
const CLOCK_SKEW_LEEWAY_SECS: u64 = 300;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the username it was minted for.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Mints and verifies stateless bearer tokens.
///
/// Tokens are signed symmetrically (HS256) with a single configured secret:
/// this service is both the only issuer and the only verifier, so there is
/// no key-distribution problem to solve, and any instance can verify a token
/// without shared server-side session state.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    lifetime_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs,
        }
    }

    /// Mints a token for `subject`, issued now and expiring after the
    /// configured lifetime.
    pub fn mint(&self, subject: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::seconds(self.lifetime_secs)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::InternalServerError(format!("Failed to mint token: {}", e)))
    }

    /// Checks structure and signature and returns the decoded claims.
    ///
    /// Fails with `MalformedToken` when the token is not structurally a
    /// signed token, and `BadSignature` when the signature does not verify
    /// against the configured secret. Expiry is not checked here; callers
    /// combine `verify` with `is_expired` (or use `validate_token`).
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY_SECS;
        validation.validate_exp = false;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    /// True when the current time is at or after the token's expiration
    /// claim. A token whose claims cannot be read at all also counts as
    /// expired.
    pub fn is_expired(&self, token: &str) -> bool {
        match self.verify(token) {
            Ok(claims) => claims.exp as i64 <= Utc::now().timestamp(),
            Err(_) => true,
        }
    }

    /// The subject claim of a verified token.
    pub fn extract_subject(&self, token: &str) -> Result<String, AppError> {
        self.verify(token).map(|claims| claims.sub)
    }

    /// True iff the token's subject names this principal and the token has
    /// not expired.
    pub fn validate_token(&self, token: &str, principal: &AppUser) -> bool {
        match self.extract_subject(token) {
            Ok(subject) => subject == principal.username && !self.is_expired(token),
            Err(_) => false,
        }
    }
}

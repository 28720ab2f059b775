//! Signed, time-limited access tokens
//!
//! Tokens carry the principal's id in `sub` and an absolute expiry in `exp`.
//! Verification is exact: no clock-skew leeway. There is no revocation - a
//! token stays valid for its full lifetime regardless of logout or password
//! change.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::types::{ApiError, Result};

/// Claims carried by an access token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Principal (user) id
    pub sub: String,
    /// Absolute expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Issues and verifies access tokens with a symmetric secret.
///
/// Keys, algorithm and lifetime are fixed at construction from [`AuthConfig`].
pub struct TokenService {
    header: Header,
    validation: Validation,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        // Exact expiry comparison
        validation.leeway = 0;

        Self {
            header: Header::new(config.algorithm),
            validation,
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.token_ttl,
        }
    }

    /// Issue a token for the given principal, expiring after the configured
    /// lifetime.
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };

        encode(&self.header, &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a token and return the principal id it was issued for.
    ///
    /// A bad signature, malformed claims or an elapsed expiry all yield
    /// `None` - callers cannot distinguish why a token was rejected.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }

    /// Configured token lifetime in seconds
    pub fn expires_in_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

//! Signed, time-limited registration tokens.
//!
//! A token binds a researcher email to the outreach request that invited
//! them. It is not persisted; the HS256 signature and the `exp` claim are the
//! only guarantees. Possession of a valid token is the proof that the
//! registrant controls the invited address.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OutreachRequestId, Timestamp};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 14;

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("registration token has expired")]
    Expired,

    #[error("registration token is invalid: {0}")]
    Invalid(String),
}

/// Claims carried by a registration token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationClaims {
    pub email: String,
    pub outreach_id: OutreachRequestId,
    pub iat: u64,
    pub exp: u64,
}

/// Issues and verifies registration tokens with a process-wide secret.
#[derive(Clone)]
pub struct RegistrationTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl RegistrationTokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Codec with the default 14-day lifetime.
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::days(DEFAULT_TOKEN_TTL_DAYS))
    }

    /// Issues a token expiring `ttl` from now.
    pub fn issue(&self, email: &str, outreach_id: OutreachRequestId) -> Result<String, TokenError> {
        self.issue_with_expiry(email, outreach_id, Timestamp::now().add(self.ttl))
    }

    /// Issues a token with an explicit expiry.
    pub fn issue_with_expiry(
        &self,
        email: &str,
        outreach_id: OutreachRequestId,
        expires_at: Timestamp,
    ) -> Result<String, TokenError> {
        let claims = RegistrationClaims {
            email: email.to_string(),
            outreach_id,
            iat: Timestamp::now().as_unix_secs().max(0) as u64,
            exp: expires_at.as_unix_secs().max(0) as u64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<RegistrationClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<RegistrationClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for RegistrationTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationTokenCodec")
            .field("ttl_days", &self.ttl.num_days())
            .finish_non_exhaustive()
    }
}

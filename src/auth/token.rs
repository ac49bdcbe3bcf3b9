//! Signed bearer tokens: HS256 claims carrying a subject and an absolute expiry.
//!
//! Expiry is compared against a caller-supplied `now` rather than ambient
//! time, so verification stays deterministic in tests. Tokens are never
//! persisted; once issued they remain valid until their expiry passes.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Source of the current time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time; the production clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Why a presented token was rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token is expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Issues and verifies bearer tokens with one process-wide symmetric secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    /// # Errors
    ///
    /// Returns an error if `ttl_minutes` is not a positive duration.
    pub fn new(secret: &SecretString, ttl_minutes: i64) -> Result<Self> {
        anyhow::ensure!(ttl_minutes > 0, "token ttl must be positive");
        let secret = secret.expose_secret().as_bytes();
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: Duration::minutes(ttl_minutes),
        })
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Build and sign a token for `subject`, expiring `ttl` after `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: subject.to_string(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("failed to sign token")
    }

    /// Validate signature and expiry, returning the `sub` claim verbatim.
    ///
    /// Resolving the subject to a user record is the caller's job.
    ///
    /// # Errors
    ///
    /// `SignatureInvalid` for a wrong or rotated secret, `Expired` once `now`
    /// reaches the `exp` claim, `Malformed` for anything not parseable into
    /// the expected claim shape.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock, not the system one.
        validation.validate_exp = false;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(
                |err| match err.kind() {
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        VerifyError::SignatureInvalid
                    }
                    _ => VerifyError::Malformed,
                },
            )?;

        if now.timestamp() >= data.claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(data.claims.sub)
    }
}

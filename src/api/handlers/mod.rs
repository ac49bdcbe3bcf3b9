pub mod health;
pub use self::health::health;

pub mod root;
pub use self::root::root;

pub mod login;
pub mod principal;
pub mod types;
pub mod users;


// common functions for the handlers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regex::Regex;

use crate::auth::AuthError;
use crate::store::StoreError;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 40;

#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_password(password: &str) -> bool {
    let length = password.chars().count();
    (MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length)
}

/// Canonical form used for storage and lookup: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Handler-level failures: the auth taxonomy plus the generic HTTP cases.
#[derive(Debug)]
pub enum ApiError {
    Auth(AuthError),
    NotFound(&'static str),
    Forbidden(&'static str),
    BadRequest(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Auth(AuthError::Internal(err))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::Auth(AuthError::DuplicateEmail),
            StoreError::Backend(err) => Self::Auth(AuthError::Internal(err)),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Auth(err) => err.into_response(),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()).into_response(),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()).into_response(),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_accepts_plain_addresses() {
        assert!(valid_email("a@b.com"));
        assert!(valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn valid_email_rejects_malformed_addresses() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("a@b"));
        assert!(!valid_email("a b@c.com"));
        assert!(!valid_email("@b.com"));
        assert!(!valid_email(""));
    }

    #[test]
    fn valid_password_enforces_length_bounds() {
        assert!(!valid_password("short7!"));
        assert!(valid_password("exactly8"));
        assert!(valid_password(&"x".repeat(40)));
        assert!(!valid_password(&"x".repeat(41)));
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
    }

    #[test]
    fn store_errors_map_to_the_auth_taxonomy() {
        let err = ApiError::from(StoreError::DuplicateEmail);
        assert!(matches!(err, ApiError::Auth(AuthError::DuplicateEmail)));

        let err = ApiError::from(StoreError::Backend(anyhow::anyhow!("boom")));
        assert!(matches!(err, ApiError::Auth(AuthError::Internal(_))));
    }
}

//! Credential verification, token issuance and privilege gates.

pub mod gate;
pub mod password;
pub mod resolver;
pub mod state;
pub mod token;

pub use self::gate::{require_active, require_superuser};
pub use self::password::PasswordHasher;
pub use self::resolver::{authenticate_by_password, resolve_current_user};
pub use self::state::{AuthConfig, AuthState};
pub use self::token::{Clock, SystemClock, TokenKeys, VerifyError};

use axum::{http::StatusCode, response::IntoResponse, response::Response};
use tracing::error;

/// Terminal authentication/authorization failures.
///
/// `InvalidCredentials` and `Unauthorized` are deliberately low-information:
/// the caller must not be able to tell an unknown email from a wrong password,
/// or an invalid token from a deleted subject.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Could not validate credentials")]
    Unauthorized,
    #[error("Inactive user")]
    InactiveUser,
    #[error("The user doesn't have enough privileges")]
    InsufficientPrivilege,
    #[error("A user with this email already exists")]
    DuplicateEmail,
    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InactiveUser => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InsufficientPrivilege => StatusCode::FORBIDDEN,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal causes are logged, never surfaced to the client.
        if let Self::Internal(err) = &self {
            error!("Internal auth error: {err:#}");
        }
        (self.status_code(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthError;
    use anyhow::anyhow;
    use axum::http::StatusCode;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InactiveUser.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::InsufficientPrivilege.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::DuplicateEmail.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::Internal(anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_reveal_no_secret_material() {
        // The unified failures share no detail about which check failed.
        let login = AuthError::InvalidCredentials.to_string();
        let token = AuthError::Unauthorized.to_string();
        assert_eq!(login, "Incorrect email or password");
        assert_eq!(token, "Could not validate credentials");
        let internal = AuthError::Internal(anyhow!("secret-dsn-leak")).to_string();
        assert!(!internal.contains("secret-dsn-leak"));
    }
}

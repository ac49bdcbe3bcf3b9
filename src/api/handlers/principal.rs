//! Extracting and gating the caller behind the Authorization header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::{require_active, require_superuser, resolve_current_user, AuthError, AuthState};
use crate::store::UserRecord;

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the caller from the request headers.
///
/// # Errors
///
/// `Unauthorized` when the header is missing, malformed, or the token does
/// not resolve to an existing user.
pub async fn current_user(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<UserRecord, AuthError> {
    let token = extract_bearer_token(headers).ok_or(AuthError::Unauthorized)?;
    resolve_current_user(state, token).await
}

/// `current_user` plus the active gate.
///
/// # Errors
///
/// `Unauthorized` on resolution failure, `InactiveUser` if the record is
/// flagged inactive.
pub async fn current_active_user(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<UserRecord, AuthError> {
    current_user(state, headers).await.and_then(require_active)
}

/// `current_active_user` plus the superuser gate.
///
/// # Errors
///
/// As `current_active_user`, plus `InsufficientPrivilege` for regular users.
pub async fn current_active_superuser(
    state: &AuthState,
    headers: &HeaderMap,
) -> Result<UserRecord, AuthError> {
    current_active_user(state, headers)
        .await
        .and_then(require_superuser)
}

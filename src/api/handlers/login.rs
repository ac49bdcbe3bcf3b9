//! Login endpoints: password exchange for a bearer token.

use axum::{extract::Extension, http::HeaderMap, response::Json, Form};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::{normalize_email, principal, types::Token, types::UserPublic, ApiError};
use crate::auth::{authenticate_by_password, require_active, AuthError, AuthState};

/// OAuth2-style password grant form; `username` carries the email.
#[derive(ToSchema, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Exchange email and password for an access token.
#[utoipa::path(
    post,
    path = "/api/v1/login/access-token",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = Token),
        (status = 400, description = "Incorrect email or password, or inactive user"),
    ),
    tag = "login"
)]
#[instrument(skip_all)]
pub async fn access_token(
    Extension(state): Extension<Arc<AuthState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<Token>, ApiError> {
    let email = normalize_email(&form.username);
    let user = authenticate_by_password(&state, &email, &form.password)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;
    let user = require_active(user)?;

    let token = state
        .tokens()
        .issue(&user.id.to_string(), state.clock().now())
        .map_err(AuthError::from)?;

    Ok(Json(Token::bearer(token)))
}

/// Verify the presented token and return its user.
#[utoipa::path(
    post,
    path = "/api/v1/login/test-token",
    responses(
        (status = 200, description = "Token is valid", body = UserPublic),
        (status = 401, description = "Could not validate credentials"),
    ),
    security(("bearer" = [])),
    tag = "login"
)]
#[instrument(skip_all)]
pub async fn test_token(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<UserPublic>, ApiError> {
    let user = principal::current_active_user(&state, &headers).await?;
    Ok(Json(UserPublic::from(user)))
}

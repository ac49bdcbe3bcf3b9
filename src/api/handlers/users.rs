//! User endpoints: self-service profile routes and superuser administration.

use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::IntoParams;
use uuid::Uuid;

use super::types::{
    Message, UpdatePassword, UserCreate, UserPublic, UserRegister, UserUpdate, UserUpdateMe,
    UsersPublic,
};
use super::{normalize_email, principal, valid_email, valid_password, ApiError};
use crate::auth::{AuthError, AuthState};
use crate::store::{NewUser, UserChanges};

const USER_NOT_FOUND: &str = "The user with this id does not exist in the system";
const SUPERUSER_SELF_DELETE: &str = "Super users are not allowed to delete themselves";

fn validated_email(raw: &str) -> Result<String, ApiError> {
    let email = normalize_email(raw);
    if valid_email(&email) {
        Ok(email)
    } else {
        Err(ApiError::BadRequest("Invalid email address".to_string()))
    }
}

fn validated_password(raw: &str) -> Result<(), ApiError> {
    if valid_password(raw) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Password must be between 8 and 40 characters".to_string(),
        ))
    }
}

/// Open registration: always creates an active, non-privileged user.
#[utoipa::path(
    post,
    path = "/api/v1/users/signup",
    request_body = UserRegister,
    responses(
        (status = 201, description = "User created", body = UserPublic),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "A user with this email already exists"),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn signup(
    Extension(state): Extension<Arc<AuthState>>,
    Json(body): Json<UserRegister>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    let email = validated_email(&body.email)?;
    validated_password(&body.password)?;

    let hashed_password = state.hasher().hash(&body.password).map_err(AuthError::from)?;
    let record = state
        .store()
        .insert(NewUser {
            email,
            hashed_password,
            is_active: true,
            is_superuser: false,
            full_name: body.full_name,
        })
        .await?;

    info!("user signed up");

    Ok((StatusCode::CREATED, Json(UserPublic::from(record))))
}

/// The caller's own record.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserPublic),
        (status = 401, description = "Could not validate credentials"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn me(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<UserPublic>, ApiError> {
    let user = principal::current_active_user(&state, &headers).await?;
    Ok(Json(UserPublic::from(user)))
}

/// Update the caller's own email or name.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me",
    request_body = UserUpdateMe,
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 409, description = "A user with this email already exists"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_me(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Json(body): Json<UserUpdateMe>,
) -> Result<Json<UserPublic>, ApiError> {
    let user = principal::current_active_user(&state, &headers).await?;

    let email = body.email.as_deref().map(validated_email).transpose()?;
    let changes = UserChanges {
        email,
        full_name: body.full_name,
        ..UserChanges::default()
    };

    let updated = state
        .store()
        .update(user.id, changes)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    Ok(Json(UserPublic::from(updated)))
}

/// Change the caller's own password.
#[utoipa::path(
    patch,
    path = "/api/v1/users/me/password",
    request_body = UpdatePassword,
    responses(
        (status = 200, description = "Password updated", body = Message),
        (status = 400, description = "Incorrect password or invalid new password"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_password_me(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Json(body): Json<UpdatePassword>,
) -> Result<Json<Message>, ApiError> {
    let user = principal::current_active_user(&state, &headers).await?;

    let matches = state
        .hasher()
        .verify(&body.current_password, &user.hashed_password)
        .map_err(AuthError::from)?;
    if !matches {
        return Err(ApiError::BadRequest("Incorrect password".to_string()));
    }
    if body.current_password == body.new_password {
        return Err(ApiError::BadRequest(
            "New password cannot be the same as the current one".to_string(),
        ));
    }
    validated_password(&body.new_password)?;

    let hashed_password = state
        .hasher()
        .hash(&body.new_password)
        .map_err(AuthError::from)?;
    state
        .store()
        .update(
            user.id,
            UserChanges {
                hashed_password: Some(hashed_password),
                ..UserChanges::default()
            },
        )
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(Message {
        message: "Password updated successfully".to_string(),
    }))
}

/// Delete the caller's own account; superusers may not delete themselves.
#[utoipa::path(
    delete,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "User deleted", body = Message),
        (status = 403, description = "Super users are not allowed to delete themselves"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn delete_me(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<Message>, ApiError> {
    let user = principal::current_active_user(&state, &headers).await?;
    if user.is_superuser {
        return Err(ApiError::Forbidden(SUPERUSER_SELF_DELETE));
    }

    state.store().delete(user.id).await?;
    info!("user deleted own account");

    Ok(Json(Message {
        message: "User deleted successfully".to_string(),
    }))
}

#[derive(Deserialize, IntoParams)]
pub struct ListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_limit() -> i64 {
    100
}

/// Page through all users; superuser only.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListParams),
    responses(
        (status = 200, description = "A page of users", body = UsersPublic),
        (status = 403, description = "The user doesn't have enough privileges"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn list_users(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<UsersPublic>, ApiError> {
    principal::current_active_superuser(&state, &headers).await?;

    let count = state.store().count().await?;
    let data = state
        .store()
        .list(params.skip.max(0), params.limit.max(0))
        .await?
        .into_iter()
        .map(UserPublic::from)
        .collect();

    Ok(Json(UsersPublic { data, count }))
}

/// Create a user with explicit flags; superuser only.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserPublic),
        (status = 403, description = "The user doesn't have enough privileges"),
        (status = 409, description = "A user with this email already exists"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn create_user(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Json(body): Json<UserCreate>,
) -> Result<(StatusCode, Json<UserPublic>), ApiError> {
    principal::current_active_superuser(&state, &headers).await?;

    let email = validated_email(&body.email)?;
    validated_password(&body.password)?;

    let hashed_password = state.hasher().hash(&body.password).map_err(AuthError::from)?;
    let record = state
        .store()
        .insert(NewUser {
            email,
            hashed_password,
            is_active: body.is_active,
            is_superuser: body.is_superuser,
            full_name: body.full_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserPublic::from(record))))
}

/// Fetch a user by id: callers may read themselves, superusers anyone.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserPublic),
        (status = 403, description = "The user doesn't have enough privileges"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn get_user(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<UserPublic>, ApiError> {
    let current = principal::current_active_user(&state, &headers).await?;
    if current.id == id {
        return Ok(Json(UserPublic::from(current)));
    }
    if !current.is_superuser {
        return Err(AuthError::InsufficientPrivilege.into());
    }

    let user = state
        .store()
        .find_by_id(id)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    Ok(Json(UserPublic::from(user)))
}

/// Update any user; superuser only.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "Updated user", body = UserPublic),
        (status = 404, description = "User not found"),
        (status = 409, description = "A user with this email already exists"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_user(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<UserUpdate>,
) -> Result<Json<UserPublic>, ApiError> {
    principal::current_active_superuser(&state, &headers).await?;

    let email = body.email.as_deref().map(validated_email).transpose()?;
    let hashed_password = match body.password.as_deref() {
        Some(password) => {
            validated_password(password)?;
            Some(state.hasher().hash(password).map_err(AuthError::from)?)
        }
        None => None,
    };

    let changes = UserChanges {
        email,
        hashed_password,
        is_active: body.is_active,
        is_superuser: body.is_superuser,
        full_name: body.full_name,
    };
    let updated = state
        .store()
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;
    Ok(Json(UserPublic::from(updated)))
}

/// Delete any user; superuser only, and never themselves.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = Message),
        (status = 403, description = "Super users are not allowed to delete themselves"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn delete_user(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError> {
    let current = principal::current_active_superuser(&state, &headers).await?;
    if current.id == id {
        return Err(ApiError::Forbidden(SUPERUSER_SELF_DELETE));
    }

    let removed = state.store().delete(id).await?;
    if !removed {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }
    info!("user deleted by superuser");

    Ok(Json(Message {
        message: "User deleted successfully".to_string(),
    }))
}

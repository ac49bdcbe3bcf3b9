//! Request and response bodies for the user and login endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::store::UserRecord;

/// Issued access token, returned by the login endpoint.
#[derive(ToSchema, Serialize, Debug)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    #[must_use]
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Generic response message.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct Message {
    pub message: String,
}

/// Public view of a user record; never carries the password hash.
#[derive(ToSchema, Serialize, Debug)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

impl From<UserRecord> for UserPublic {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            is_active: record.is_active,
            is_superuser: record.is_superuser,
            full_name: record.full_name,
        }
    }
}

/// A page of users plus the total number of records.
#[derive(ToSchema, Serialize, Debug)]
pub struct UsersPublic {
    pub data: Vec<UserPublic>,
    pub count: i64,
}

/// Self-service registration payload.
#[derive(ToSchema, Deserialize)]
pub struct UserRegister {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Administrative creation payload; flags default to an active regular user.
#[derive(ToSchema, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    pub full_name: Option<String>,
}

/// Administrative partial update; absent fields are left untouched.
#[derive(ToSchema, Deserialize, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    pub full_name: Option<String>,
}

/// Self-service profile update; privilege flags are not accepted here.
#[derive(ToSchema, Deserialize, Default)]
pub struct UserUpdateMe {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Self-service password change.
#[derive(ToSchema, Deserialize)]
pub struct UpdatePassword {
    pub current_password: String,
    pub new_password: String,
}

const fn default_true() -> bool {
    true
}

//! OpenAPI document for the served routes.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::handlers;
use super::handlers::types;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::login::access_token,
        handlers::login::test_token,
        handlers::users::signup,
        handlers::users::me,
        handlers::users::update_me,
        handlers::users::update_password_me,
        handlers::users::delete_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,
    ),
    components(schemas(
        handlers::login::LoginForm,
        types::Token,
        types::Message,
        types::UserPublic,
        types::UsersPublic,
        types::UserRegister,
        types::UserCreate,
        types::UserUpdate,
        types::UserUpdateMe,
        types::UpdatePassword,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "login", description = "Exchange credentials for access tokens"),
        (name = "users", description = "User self-service and administration"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

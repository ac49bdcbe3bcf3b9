//! HTTP surface: router construction, middleware stack and server startup.

use crate::{
    api::handlers::{login, users},
    auth::{AuthConfig, AuthState},
    cli::globals::GlobalArgs,
    store::{NewUser, PgUserStore, StoreError},
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, patch, post},
    Extension, Router,
};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
mod openapi;

/// Build the application router around shared auth state.
///
/// Kept separate from `new` so tests can drive the same routes against an
/// in-memory store without binding a socket.
#[must_use]
pub fn router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/v1/login/access-token", post(login::access_token))
        .route("/api/v1/login/test-token", post(login::test_token))
        .route("/api/v1/users/signup", post(users::signup))
        .route(
            "/api/v1/users/me",
            get(users::me).patch(users::update_me).delete(users::delete_me),
        )
        .route("/api/v1/users/me/password", patch(users::update_password_me))
        .route("/api/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/v1/users/:id",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .merge(SwaggerUi::new("/docs").url("/api/v1/openapi.json", openapi::ApiDoc::openapi()))
        .layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(port: u16, dsn: String, globals: &GlobalArgs) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    let store = PgUserStore::new(pool);
    store
        .ensure_schema()
        .await
        .context("Failed to prepare database schema")?;

    let config = AuthConfig::new().with_token_ttl_minutes(globals.token_ttl_minutes);
    let state = Arc::new(AuthState::new(
        config,
        &globals.secret_key,
        Arc::new(store),
    )?);

    bootstrap_first_superuser(&state, globals).await?;

    let cors = cors_layer(&globals.cors_origins)?;

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Gracefully shutdown");
            }
        })
        .await?;

    Ok(())
}

/// Create the configured bootstrap superuser if no record holds its email.
///
/// Losing the insert race to a concurrently starting instance is not an
/// error; the record exists either way.
async fn bootstrap_first_superuser(state: &AuthState, globals: &GlobalArgs) -> Result<()> {
    let (Some(email), Some(password)) = (
        globals.first_superuser_email.as_deref(),
        globals.first_superuser_password.as_ref(),
    ) else {
        return Ok(());
    };

    let email = handlers::normalize_email(email);
    if !handlers::valid_email(&email) {
        return Err(anyhow!("Invalid first superuser email: {email}"));
    }

    let existing = state
        .store()
        .find_by_email(&email)
        .await
        .map_err(anyhow::Error::from)?;
    if existing.is_some() {
        return Ok(());
    }

    let hashed_password = state.hasher().hash(password.expose_secret())?;
    match state
        .store()
        .insert(NewUser {
            email,
            hashed_password,
            is_active: true,
            is_superuser: true,
            full_name: None,
        })
        .await
    {
        Ok(record) => {
            info!("Created first superuser {}", record.id);
            Ok(())
        }
        Err(StoreError::DuplicateEmail) => Ok(()),
        Err(err) => Err(anyhow::Error::from(err).context("Failed to create first superuser")),
    }
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let mut allowed = Vec::with_capacity(origins.len());
    for origin in origins {
        allowed.push(parse_origin(origin)?);
    }

    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true))
}

fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(origin).with_context(|| format!("Invalid CORS origin: {origin}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {origin}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let normalized = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&normalized).context("Failed to build CORS origin header")
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_origin_normalizes_to_scheme_host_port() -> Result<()> {
        assert_eq!(parse_origin("http://localhost:5173/")?, "http://localhost:5173");
        assert_eq!(
            parse_origin("https://app.example.com/some/path")?,
            "https://app.example.com"
        );
        Ok(())
    }

    #[test]
    fn parse_origin_rejects_garbage() {
        assert!(parse_origin("not a url").is_err());
        assert!(parse_origin("data:text/plain,hi").is_err());
    }

    #[test]
    fn cors_layer_accepts_multiple_origins() {
        let origins = vec![
            "http://localhost:5173".to_string(),
            "https://app.example.com".to_string(),
        ];
        assert!(cors_layer(&origins).is_ok());
    }
}

//! Resolving credentials or bearer tokens to user records.

use tracing::debug;
use uuid::Uuid;

use super::state::AuthState;
use super::AuthError;
use crate::store::UserRecord;

/// Look up a user by normalized email and verify the password.
///
/// Returns `Ok(None)` both when the email is unknown and when the password
/// does not match; the caller must not be able to tell the two apart.
///
/// # Errors
///
/// `Internal` when the store fails or a stored hash is malformed; the latter
/// is a configuration problem, never a credential mismatch.
pub async fn authenticate_by_password(
    state: &AuthState,
    email: &str,
    password: &str,
) -> Result<Option<UserRecord>, AuthError> {
    let Some(user) = state
        .store()
        .find_by_email(email)
        .await
        .map_err(anyhow::Error::from)?
    else {
        debug!("login attempt for unknown email");
        return Ok(None);
    };

    if state.hasher().verify(password, &user.hashed_password)? {
        Ok(Some(user))
    } else {
        debug!("login attempt with wrong password");
        Ok(None)
    }
}

/// Resolve a presented bearer token to the current user record.
///
/// Every failure mode collapses into `Unauthorized`: bad signature, expiry, a
/// malformed token, a subject that is not a valid id, and a subject whose
/// record no longer exists are indistinguishable to the caller.
///
/// # Errors
///
/// `Unauthorized` for any token or subject failure, `Internal` when the store
/// itself fails.
pub async fn resolve_current_user(
    state: &AuthState,
    token: &str,
) -> Result<UserRecord, AuthError> {
    let now = state.clock().now();
    let subject = state.tokens().verify(token, now).map_err(|err| {
        debug!("token rejected: {err}");
        AuthError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&subject).map_err(|_| AuthError::Unauthorized)?;

    state
        .store()
        .find_by_id(user_id)
        .await
        .map_err(anyhow::Error::from)?
        .ok_or(AuthError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::test_hasher;
    use crate::auth::state::AuthConfig;
    use crate::auth::token::Clock;
    use crate::auth::PasswordHasher;
    use crate::store::{MemoryUserStore, NewUser, UserStore};
    use anyhow::Result;
    use chrono::{DateTime, Duration, Utc};
    use secrecy::SecretString;
    use std::sync::{Arc, Mutex};

    struct TestClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl TestClock {
        fn new(now: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(now),
            }
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().expect("clock lock");
            *now += by;
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> DateTime<Utc> {
            *self.now.lock().expect("clock lock")
        }
    }

    fn low_cost_config() -> AuthConfig {
        let params = crate::auth::password::HashParams {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        };
        AuthConfig::new()
            .with_token_ttl_minutes(60)
            .with_hash_params(params)
    }

    async fn seeded_state(
        clock: Arc<TestClock>,
    ) -> Result<(AuthState, crate::store::UserRecord)> {
        let store = Arc::new(MemoryUserStore::new());
        let hasher: PasswordHasher = test_hasher();
        let record = store
            .insert(NewUser {
                email: "real@x.com".to_string(),
                hashed_password: hasher.hash("longenough1")?,
                is_active: true,
                is_superuser: false,
                full_name: None,
            })
            .await?;

        let state = AuthState::with_clock(
            low_cost_config(),
            &SecretString::from("resolver-secret".to_string()),
            store,
            clock,
        )?;
        Ok((state, record))
    }

    fn test_clock() -> Arc<TestClock> {
        Arc::new(TestClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp"),
        ))
    }

    #[tokio::test]
    async fn correct_password_resolves_user() -> Result<()> {
        let (state, record) = seeded_state(test_clock()).await?;
        let resolved = authenticate_by_password(&state, "real@x.com", "longenough1").await?;
        assert_eq!(resolved.map(|user| user.id), Some(record.id));
        Ok(())
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_are_indistinguishable() -> Result<()> {
        let (state, _) = seeded_state(test_clock()).await?;
        let missing = authenticate_by_password(&state, "missing@x.com", "anything").await?;
        let wrong = authenticate_by_password(&state, "real@x.com", "wrongpass").await?;
        assert!(missing.is_none());
        assert!(wrong.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn token_round_trip_resolves_same_user() -> Result<()> {
        let clock = test_clock();
        let (state, record) = seeded_state(clock.clone()).await?;
        let token = state.tokens().issue(&record.id.to_string(), clock.now())?;
        let resolved = resolve_current_user(&state, &token).await?;
        assert_eq!(resolved.id, record.id);
        Ok(())
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() -> Result<()> {
        let clock = test_clock();
        let (state, record) = seeded_state(clock.clone()).await?;
        let token = state.tokens().issue(&record.id.to_string(), clock.now())?;

        clock.advance(Duration::minutes(61));
        let result = resolve_current_user(&state, &token).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn deleted_subject_is_unauthorized() -> Result<()> {
        let clock = test_clock();
        let (state, record) = seeded_state(clock.clone()).await?;
        let token = state.tokens().issue(&record.id.to_string(), clock.now())?;

        state.store().delete(record.id).await?;
        let result = resolve_current_user(&state, &token).await;
        // "Token valid but user deleted" looks exactly like "invalid token".
        assert!(matches!(result, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn truncated_token_is_unauthorized() -> Result<()> {
        let clock = test_clock();
        let (state, record) = seeded_state(clock.clone()).await?;
        let token = state.tokens().issue(&record.id.to_string(), clock.now())?;
        let truncated = &token[..token.len() - 1];
        let result = resolve_current_user(&state, truncated).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
        Ok(())
    }

    #[tokio::test]
    async fn non_uuid_subject_is_unauthorized() -> Result<()> {
        let clock = test_clock();
        let (state, _) = seeded_state(clock.clone()).await?;
        let token = state.tokens().issue("not-a-uuid", clock.now())?;
        let result = resolve_current_user(&state, &token).await;
        assert!(matches!(result, Err(AuthError::Unauthorized)));
        Ok(())
    }
}

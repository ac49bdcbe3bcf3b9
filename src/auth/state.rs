//! Auth state and configuration shared by the handlers.

use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;

use super::password::{HashParams, PasswordHasher};
use super::token::{Clock, SystemClock, TokenKeys};
use crate::store::UserStore;

const DEFAULT_TOKEN_TTL_MINUTES: i64 = 8 * 24 * 60;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    token_ttl_minutes: i64,
    hash_params: HashParams,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            hash_params: HashParams::default(),
        }
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_token_ttl_minutes(mut self, minutes: i64) -> Self {
        self.token_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub const fn with_hash_params(mut self, params: HashParams) -> Self {
        self.hash_params = params;
        self
    }

    #[must_use]
    pub const fn token_ttl_minutes(&self) -> i64 {
        self.token_ttl_minutes
    }

    #[must_use]
    pub const fn hash_params(&self) -> HashParams {
        self.hash_params
    }
}

/// Everything a request needs to authenticate and authorize: the hasher, the
/// token keys, the clock, and the credential store.
pub struct AuthState {
    config: AuthConfig,
    hasher: PasswordHasher,
    tokens: TokenKeys,
    clock: Arc<dyn Clock>,
    store: Arc<dyn UserStore>,
}

impl AuthState {
    /// Build state with the system clock; the normal production path.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash parameters or token ttl are invalid.
    pub fn new(
        config: AuthConfig,
        secret_key: &SecretString,
        store: Arc<dyn UserStore>,
    ) -> Result<Self> {
        Self::with_clock(config, secret_key, store, Arc::new(SystemClock))
    }

    /// Build state with an injected clock, keeping expiry checks
    /// deterministic in tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash parameters or token ttl are invalid.
    pub fn with_clock(
        config: AuthConfig,
        secret_key: &SecretString,
        store: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let hasher = PasswordHasher::new(config.hash_params())?;
        let tokens = TokenKeys::new(secret_key, config.token_ttl_minutes())?;
        Ok(Self {
            config,
            hasher,
            tokens,
            clock,
            store,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub const fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    #[must_use]
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryUserStore;

    #[test]
    fn config_defaults_and_overrides() {
        let config = AuthConfig::new();
        assert_eq!(config.token_ttl_minutes(), super::DEFAULT_TOKEN_TTL_MINUTES);

        let config = config.with_token_ttl_minutes(60);
        assert_eq!(config.token_ttl_minutes(), 60);
    }

    #[test]
    fn state_rejects_invalid_ttl() {
        let config = AuthConfig::new().with_token_ttl_minutes(0);
        let result = AuthState::new(
            config,
            &SecretString::from("secret".to_string()),
            Arc::new(MemoryUserStore::new()),
        );
        assert!(result.is_err());
    }
}

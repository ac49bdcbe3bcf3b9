use secrecy::SecretString;

/// Process-wide configuration shared across actions.
///
/// The signing secret is established once at startup and never rotated while
/// the process runs; rotating it invalidates all previously issued tokens.
#[derive(Clone)]
pub struct GlobalArgs {
    pub secret_key: SecretString,
    pub token_ttl_minutes: i64,
    pub cors_origins: Vec<String>,
    pub first_superuser_email: Option<String>,
    pub first_superuser_password: Option<SecretString>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret_key: SecretString, token_ttl_minutes: i64) -> Self {
        Self {
            secret_key,
            token_ttl_minutes,
            cors_origins: Vec::new(),
            first_superuser_email: None,
            first_superuser_password: None,
        }
    }
}

impl std::fmt::Debug for GlobalArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalArgs")
            .field("secret_key", &"***")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("cors_origins", &self.cors_origins)
            .field("first_superuser_email", &self.first_superuser_email)
            .field(
                "first_superuser_password",
                &self.first_superuser_password.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from("test-secret".to_string()), 11520);
        assert_eq!(args.secret_key.expose_secret(), "test-secret");
        assert_eq!(args.token_ttl_minutes, 11520);
        assert!(args.cors_origins.is_empty());
        assert!(args.first_superuser_email.is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut args = GlobalArgs::new(SecretString::from("test-secret".to_string()), 60);
        args.first_superuser_password = Some(SecretString::from("changethis".to_string()));
        let rendered = format!("{args:?}");
        assert!(!rendered.contains("test-secret"));
        assert!(!rendered.contains("changethis"));
        assert!(rendered.contains("***"));
    }
}

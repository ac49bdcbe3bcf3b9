use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<(Action, GlobalArgs)> {
    let action = Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
    };

    let secret_key = matches
        .get_one("secret-key")
        .map(|s: &String| SecretString::from(s.to_string()))
        .ok_or_else(|| anyhow::anyhow!("missing required argument: --secret-key"))?;

    let token_ttl_minutes = matches
        .get_one::<i64>("token-ttl-minutes")
        .copied()
        .unwrap_or(11520);

    let mut globals = GlobalArgs::new(secret_key, token_ttl_minutes);

    globals.cors_origins = matches
        .get_many::<String>("cors-origin")
        .map(|values| values.map(ToString::to_string).collect())
        .unwrap_or_default();

    globals.first_superuser_email = matches
        .get_one::<String>("first-superuser-email")
        .map(ToString::to_string);

    globals.first_superuser_password = matches
        .get_one::<String>("first-superuser-password")
        .map(|s| SecretString::from(s.to_string()));

    Ok((action, globals))
}

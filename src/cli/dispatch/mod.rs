//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action executed by the binary.

use crate::cli::actions::Action;
use anyhow::{Context, Result};
use secrecy::SecretString;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let redis_url = matches
        .get_one::<String>("redis-url")
        .cloned()
        .context("missing required argument: --redis-url")?;

    let token_secret = matches
        .get_one::<String>("token-secret")
        .cloned()
        .map(SecretString::from)
        .context("missing required argument: --token-secret")?;

    let token_ttl_seconds = matches
        .get_one::<u64>("token-ttl-seconds")
        .copied()
        .unwrap_or(86400);

    let base_url = matches
        .get_one::<String>("base-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    Ok(Action::Server {
        port,
        dsn,
        redis_url,
        token_secret,
        token_ttl_seconds,
        base_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_args() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "taskaro",
            "--dsn",
            "postgres://user@localhost:5432/taskaro",
            "--redis-url",
            "redis://localhost:6379",
            "--token-secret",
            "s3cret",
            "--token-ttl-seconds",
            "600",
        ])?;

        let Action::Server {
            port,
            dsn,
            redis_url,
            token_secret,
            token_ttl_seconds,
            base_url,
        } = handler(&matches)?;

        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://user@localhost:5432/taskaro");
        assert_eq!(redis_url, "redis://localhost:6379");
        assert_eq!(token_secret.expose_secret(), "s3cret");
        assert_eq!(token_ttl_seconds, 600);
        assert_eq!(base_url, "http://localhost:8080");

        Ok(())
    }
}

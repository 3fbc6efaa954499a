use crate::api;
use crate::cli::actions::Action;
use anyhow::Result;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            redis_url,
            token_secret,
            token_ttl_seconds,
            base_url,
        } => {
            // Fail fast on malformed connection strings before binding the port
            Url::parse(&dsn)?;
            Url::parse(&redis_url)?;

            api::new(api::ServerArgs {
                port,
                dsn,
                redis_url,
                token_secret,
                token_ttl_seconds,
                base_url,
            })
            .await?;
        }
    }

    Ok(())
}

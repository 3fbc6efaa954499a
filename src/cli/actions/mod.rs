pub mod server;

use secrecy::SecretString;

/// Action to be executed by the binary after CLI parsing
#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        redis_url: String,
        token_secret: SecretString,
        token_ttl_seconds: u64,
        base_url: String,
    },
}

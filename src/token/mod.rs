//! Session token issuance, verification, and revocation.
//!
//! Tokens are `HS256`-signed claims with a fixed TTL, whitelisted
//! server-side: issuing a token writes one cache entry keyed by the token's
//! SHA-256 and expiring together with the signature. Verification checks
//! cache membership **first** (a miss means revoked, whatever the signature
//! says) and only then validates signature and expiry. Revocation is a
//! cache delete, so logout takes effect immediately instead of waiting out
//! the signature expiry, while the signature keeps a tampered cache from
//! minting sessions on its own.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::store::{Role, UserRecord};

/// Cache key namespace for session whitelist entries.
pub const SESSION_KEY_PREFIX: &str = "session:";

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Signed token payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Claims {
    /// Subject user id.
    pub sub: Uuid,
    /// Unique token id; two logins in the same second still yield
    /// distinct tokens and therefore distinct whitelist entries.
    pub jti: Uuid,
    pub email: String,
    pub role: Role,
    pub whitelisted: bool,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Minimal session summary stored as the cache entry value.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SessionSummary {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

/// Verification failure. Cache misses, bad signatures, expiry, and cache
/// read errors all collapse into `Invalid`: verification fails closed and
/// never reveals which check rejected the token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,
}

/// Stateless token service; all session state lives in the cache.
#[derive(Clone)]
pub struct TokenService {
    cache: Arc<dyn SessionCache>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Build a service around the signing secret, loaded once at startup.
    /// No runtime rotation.
    #[must_use]
    pub fn new(cache: Arc<dyn SessionCache>, secret: &SecretString, ttl: Duration) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();
        Self {
            cache,
            encoding_key: EncodingKey::from_secret(secret_bytes),
            decoding_key: DecodingKey::from_secret(secret_bytes),
            ttl,
        }
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<dyn SessionCache> {
        &self.cache
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a signed token for a user and whitelist it.
    ///
    /// Exactly one cache write; the entry's TTL equals the signature expiry,
    /// so an orphaned entry self-heals even if revocation is never called.
    ///
    /// # Errors
    /// Returns an error if signing or the cache write fails. A failed
    /// whitelist write is a hard error, never a silently unrevocable token.
    pub async fn issue(&self, user: &UserRecord) -> Result<String> {
        let now = Utc::now().timestamp();
        let ttl_seconds = i64::try_from(self.ttl.as_secs()).context("token ttl out of range")?;
        let claims = Claims {
            sub: user.id,
            jti: Uuid::new_v4(),
            email: user.email.clone(),
            role: user.role,
            whitelisted: user.whitelisted,
            iat: now,
            exp: now + ttl_seconds,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("failed to sign session token")?;

        let summary = SessionSummary {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        };
        let value =
            serde_json::to_string(&summary).context("failed to serialize session summary")?;

        self.cache
            .set_with_ttl(&session_key(&token), &value, self.ttl)
            .await
            .context("failed to whitelist session token")?;

        Ok(token)
    }

    /// Verify a token: cache membership first, then signature and expiry.
    ///
    /// # Errors
    /// `TokenError::Invalid` on any failed check, including cache read
    /// errors (fail closed).
    pub async fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = session_key(token);

        // Revocation check: a token missing from the whitelist is dead even
        // while its signature is still cryptographically valid.
        match self.cache.get(&key).await {
            Ok(Some(_)) => {}
            Ok(None) => return Err(TokenError::Invalid),
            Err(err) => {
                error!("Session cache read failed, rejecting token: {err:#}");
                return Err(TokenError::Invalid);
            }
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => {
                if matches!(
                    err.kind(),
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature
                ) {
                    // Stale whitelist entry; drop it so the keyspace stays clean
                    if let Err(err) = self.cache.delete(&key).await {
                        error!("Failed to drop stale session entry: {err:#}");
                    }
                } else {
                    debug!("Token signature rejected: {err}");
                }
                Err(TokenError::Invalid)
            }
        }
    }

    /// Revoke a token by deleting its whitelist entry. Idempotent; revoking
    /// an unknown or already-invalid token is not an error.
    ///
    /// # Errors
    /// Returns an error only if the cache delete itself fails.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        self.cache
            .delete(&session_key(token))
            .await
            .context("failed to revoke session token")
    }

    /// Revoke every live session belonging to a user. Returns the number of
    /// entries deleted.
    ///
    /// # Errors
    /// Returns an error if enumeration fails; individual entry failures are
    /// logged and skipped so one bad entry cannot shield the rest.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<usize> {
        let keys = self
            .cache
            .keys_with_prefix(SESSION_KEY_PREFIX)
            .await
            .context("failed to enumerate sessions")?;

        let mut revoked = 0;
        for key in keys {
            let value = match self.cache.get(&key).await {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(err) => {
                    error!("Failed to read session entry {key}: {err:#}");
                    continue;
                }
            };

            let Ok(summary) = serde_json::from_str::<SessionSummary>(&value) else {
                error!("Malformed session summary under {key}, skipping");
                continue;
            };

            if summary.user_id == user_id {
                match self.cache.delete(&key).await {
                    Ok(()) => revoked += 1,
                    Err(err) => error!("Failed to revoke session {key}: {err:#}"),
                }
            }
        }

        Ok(revoked)
    }
}

/// Derive the whitelist key for a token; only the hash touches the cache.
#[must_use]
pub fn session_key(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{SESSION_KEY_PREFIX}{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use chrono::Utc;

    fn secret() -> SecretString {
        SecretString::from("unit-test-secret".to_string())
    }

    fn user(role: Role) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            name: Some("A".to_string()),
            role,
            whitelisted: false,
            created_at: Utc::now(),
        }
    }

    fn service(cache: Arc<MemoryCache>) -> TokenService {
        TokenService::new(cache, &secret(), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn issue_then_verify_returns_claims() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache.clone());
        let user = user(Role::Admin);

        let token = service.issue(&user).await?;
        assert_eq!(cache.len(), 1);

        let claims = service.verify(&token).await.expect("token is valid");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
        Ok(())
    }

    #[tokio::test]
    async fn revoked_token_is_invalid_before_expiry() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache);
        let token = service.issue(&user(Role::User)).await?;

        service.revoke(&token).await?;
        assert_eq!(service.verify(&token).await, Err(TokenError::Invalid));

        // Revoking again is not an error
        service.revoke(&token).await?;
        Ok(())
    }

    #[tokio::test]
    async fn cache_miss_beats_valid_signature() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache.clone());
        let token = service.issue(&user(Role::User)).await?;

        // Simulate TTL elapse in the cache while the signature is still valid
        cache.expire_now(&session_key(&token));
        assert_eq!(service.verify(&token).await, Err(TokenError::Invalid));
        Ok(())
    }

    #[tokio::test]
    async fn expired_signature_is_invalid_and_entry_dropped() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache.clone());
        let record = user(Role::User);

        // Hand-craft a token whose signature expiry is already in the past,
        // with a live whitelist entry still present.
        let claims = Claims {
            sub: record.id,
            jti: Uuid::new_v4(),
            email: record.email.clone(),
            role: record.role,
            whitelisted: false,
            iat: Utc::now().timestamp() - 120,
            exp: Utc::now().timestamp() - 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )?;
        cache
            .set_with_ttl(&session_key(&token), "{}", Duration::from_secs(60))
            .await?;

        assert_eq!(service.verify(&token).await, Err(TokenError::Invalid));
        // Opportunistic cleanup removed the stale entry
        assert_eq!(cache.get(&session_key(&token)).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_even_when_whitelisted() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache.clone());
        let record = user(Role::User);

        let claims = Claims {
            sub: record.id,
            jti: Uuid::new_v4(),
            email: record.email.clone(),
            role: record.role,
            whitelisted: false,
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let forged = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"some-other-secret"),
        )?;
        cache
            .set_with_ttl(&session_key(&forged), "{}", Duration::from_secs(60))
            .await?;

        assert_eq!(service.verify(&forged).await, Err(TokenError::Invalid));
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_logins_are_independent_sessions() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache);
        let record = user(Role::User);

        let first = service.issue(&record).await?;
        let second = service.issue(&record).await?;
        assert_ne!(first, second);

        service.revoke(&first).await?;
        assert_eq!(service.verify(&first).await, Err(TokenError::Invalid));
        assert!(service.verify(&second).await.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn revoke_all_targets_a_single_user() -> Result<()> {
        let cache = Arc::new(MemoryCache::new());
        let service = service(cache);
        let target = user(Role::User);
        let bystander = user(Role::User);

        let t1 = service.issue(&target).await?;
        let t2 = service.issue(&target).await?;
        let other = service.issue(&bystander).await?;

        let revoked = service.revoke_all_for_user(target.id).await?;
        assert_eq!(revoked, 2);
        assert_eq!(service.verify(&t1).await, Err(TokenError::Invalid));
        assert_eq!(service.verify(&t2).await, Err(TokenError::Invalid));
        assert!(service.verify(&other).await.is_ok());
        Ok(())
    }

    #[test]
    fn session_key_is_a_hash_namespace() {
        let key = session_key("token");
        assert!(key.starts_with(SESSION_KEY_PREFIX));
        assert!(!key.contains("token"));
        assert_eq!(session_key("token"), key);
        assert_ne!(session_key("other"), key);
    }
}

//! Auth orchestrator: register, login, logout, password reset, and
//! permission changes.
//!
//! Flow Overview: a session moves `Anonymous -> Authenticated -> Anonymous`
//! through login and logout/expiry/revocation. Every flow here composes the
//! token service, the password hasher, the credential store, and the
//! notifier; none of them hold mutable in-process state, so the service is
//! shared across requests behind an `Arc`.
//!
//! ## Enumeration resistance
//!
//! Login returns one indistinguishable error for "no such user" and "wrong
//! password" (with a dummy hash verification to equalize timing), and reset
//! requests always answer with the same generic message whether or not the
//! email exists.
//!
//! ## Cascading revocation
//!
//! Consuming a password reset and changing a user's permissions both revoke
//! the affected user's live sessions, so old credentials and stale
//! privileges die with the change.

use anyhow::Context;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::SessionCache;
use crate::email::Notifier;
use crate::password;
use crate::store::{CredentialStore, InsertOutcome, NewUser, Role, UserRecord};
use crate::token::{Claims, TokenService};

/// Cache key namespace for password-reset tickets.
pub const RESET_KEY_PREFIX: &str = "reset:";

/// Reset tickets are short-lived: 5 minutes, independent of consumption.
pub const RESET_TICKET_TTL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Domain errors, mapped to the HTTP taxonomy in `api::error`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email already registered")]
    AlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Admin privileges required")]
    Forbidden,
    #[error("User not found")]
    NotFound,
    #[error("Invalid or expired reset token")]
    TicketInvalidOrExpired,
    #[error("Upstream dependency failed")]
    Dependency(#[source] anyhow::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Dependency(err)
    }
}

/// Orchestrator configuration; the token TTL lives on the token service.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    base_url: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
    notifier: Arc<dyn Notifier>,
    config: AuthConfig,
}

impl AuthService {
    #[must_use]
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: TokenService,
        notifier: Arc<dyn Notifier>,
        config: AuthConfig,
    ) -> Self {
        Self {
            store,
            tokens,
            notifier,
            config,
        }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Create a user with default role `user` and `whitelisted = false`.
    ///
    /// # Errors
    /// `AlreadyExists` when the store already holds that exact email,
    /// `Validation` on malformed input, `Dependency` on store failure.
    pub async fn register(
        &self,
        email: &str,
        plaintext: &str,
        name: Option<String>,
    ) -> Result<UserRecord, AuthError> {
        if !valid_email(email) {
            return Err(AuthError::Validation("Invalid email".to_string()));
        }
        if plaintext.is_empty() {
            return Err(AuthError::Validation("Password must not be empty".to_string()));
        }

        let password_hash = hash_password(plaintext).await?;
        let new_user = NewUser {
            email: email.to_string(),
            password_hash,
            name,
        };

        match self.store.insert(new_user).await? {
            InsertOutcome::Created(record) => {
                info!(user_id = %record.id, "user registered");
                Ok(record)
            }
            InsertOutcome::Conflict => Err(AuthError::AlreadyExists),
        }
    }

    /// Authenticate and issue a session token.
    ///
    /// # Errors
    /// `InvalidCredentials` for unknown email and wrong password alike;
    /// `Dependency` when the store lookup or token issuance fails.
    pub async fn login(
        &self,
        email: &str,
        plaintext: &str,
    ) -> Result<(String, UserRecord), AuthError> {
        let user = self.store.find_by_email(email).await?;

        // The dummy path for unknown emails burns comparable CPU so timing
        // does not reveal account existence
        let digest = user.as_ref().map(|user| user.password_hash.clone());
        let verified = verify_password(plaintext, digest).await?;

        let Some(user) = user else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user).await?;
        Ok((token, user))
    }

    /// Revoke a session token. Idempotent; never an error from the caller's
    /// perspective, though cache failures are logged.
    pub async fn logout(&self, token: &str) {
        if let Err(err) = self.tokens.revoke(token).await {
            error!("Logout revocation failed: {err:#}");
        }
    }

    /// Create a reset ticket and notify the user, if the email exists.
    ///
    /// Always succeeds with the same observable outcome regardless of
    /// account existence. Store and notifier failures are logged, never
    /// surfaced: the caller's response stays generic.
    pub async fn request_password_reset(&self, email: &str) {
        let user = match self.store.find_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(err) => {
                error!("Reset lookup failed: {err:#}");
                return;
            }
        };

        let ticket_id = Uuid::new_v4();
        let key = format!("{RESET_KEY_PREFIX}{ticket_id}");
        if let Err(err) = self
            .tokens
            .cache()
            .set_with_ttl(&key, &user.email, RESET_TICKET_TTL)
            .await
        {
            error!("Failed to store reset ticket: {err:#}");
            return;
        }

        let reset_url = format!("{}/reset-password/{ticket_id}", self.config.base_url());
        let body = format!(
            "To reset your password, visit the following link: {reset_url}\n\
             This link will expire in 5 minutes."
        );
        if let Err(err) = self
            .notifier
            .send(&user.email, "Password Reset Request", &body)
        {
            // Best effort by design; operators see it, the client never does
            error!("Reset notification failed for {}: {err:#}", user.email);
        }
    }

    /// Consume a reset ticket: store the new password, burn the ticket, and
    /// revoke the user's outstanding sessions.
    ///
    /// # Errors
    /// `TicketInvalidOrExpired` when the ticket is absent; the cache TTL
    /// makes "never existed" and "expired" indistinguishable on purpose.
    pub async fn consume_password_reset(
        &self,
        ticket_id: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.is_empty() {
            return Err(AuthError::Validation("Password must not be empty".to_string()));
        }

        let key = format!("{RESET_KEY_PREFIX}{ticket_id}");
        let email = match self.tokens.cache().get(&key).await {
            Ok(Some(email)) => email,
            Ok(None) => return Err(AuthError::TicketInvalidOrExpired),
            Err(err) => return Err(AuthError::Dependency(err)),
        };

        let password_hash = hash_password(new_password).await?;
        if !self.store.update_password(&email, &password_hash).await? {
            // Ticket outlived the account; treat it like any dead ticket
            let _ = self.tokens.cache().delete(&key).await;
            return Err(AuthError::TicketInvalidOrExpired);
        }

        // Single use: the ticket dies on first successful consumption
        if let Err(err) = self.tokens.cache().delete(&key).await {
            error!("Failed to delete consumed reset ticket: {err:#}");
        }

        // Old sessions were authenticated by the old password; kill them
        match self.store.find_by_email(&email).await {
            Ok(Some(user)) => match self.tokens.revoke_all_for_user(user.id).await {
                Ok(revoked) => {
                    info!(user_id = %user.id, revoked, "password reset, sessions revoked");
                }
                Err(err) => warn!("Session revocation after reset failed: {err:#}"),
            },
            Ok(None) => {}
            Err(err) => warn!("User lookup after reset failed: {err:#}"),
        }

        Ok(())
    }

    /// Change a user's role and whitelist flag. Admin only.
    ///
    /// Revokes the target's live sessions so stale privileges cannot outlive
    /// the change.
    ///
    /// # Errors
    /// `Forbidden` for non-admin actors, `NotFound` for unknown targets,
    /// `Dependency` on store failure.
    pub async fn update_permissions(
        &self,
        acting: &Claims,
        target_id: Uuid,
        role: Role,
        whitelisted: bool,
    ) -> Result<(), AuthError> {
        if acting.role != Role::Admin {
            return Err(AuthError::Forbidden);
        }

        if !self
            .store
            .update_permissions(target_id, role, whitelisted)
            .await?
        {
            return Err(AuthError::NotFound);
        }

        match self.tokens.revoke_all_for_user(target_id).await {
            Ok(revoked) => {
                info!(user_id = %target_id, revoked, %role, whitelisted, "permissions updated");
            }
            Err(err) => warn!("Session revocation after permission change failed: {err:#}"),
        }

        Ok(())
    }
}

/// Hash on the blocking pool; an Argon2 digest costs tens of milliseconds
/// and would otherwise hold up an async worker.
async fn hash_password(plaintext: &str) -> Result<String, AuthError> {
    let plaintext = plaintext.to_string();
    let digest = tokio::task::spawn_blocking(move || password::hash(&plaintext))
        .await
        .context("password hashing task failed")??;
    Ok(digest)
}

/// Verify on the blocking pool. `None` runs the dummy digest and always
/// reports a mismatch.
async fn verify_password(plaintext: &str, digest: Option<String>) -> Result<bool, AuthError> {
    let plaintext = plaintext.to_string();
    let verified = tokio::task::spawn_blocking(move || match digest {
        Some(digest) => password::verify(&plaintext, &digest),
        None => {
            password::verify_dummy(&plaintext);
            false
        }
    })
    .await
    .context("password verification task failed")?;
    Ok(verified)
}

/// Basic email shape check; the store's unique constraint does the rest.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let re = EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));
    re.is_match(email)
}

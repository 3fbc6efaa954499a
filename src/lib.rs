//! # Taskaro (Authentication & Session Authority)
//!
//! `taskaro` is the authentication and session-lifecycle service for the
//! Taskaro task-management API. It handles user registration, password
//! login, server-side session whitelisting, role/whitelist enforcement,
//! and the password-reset flow.
//!
//! ## Session Model (Dual-Store Validity)
//!
//! A session token is a signed, time-bound credential. A token is valid only
//! when **both** hold:
//!
//! - its `HS256` signature verifies and the embedded expiry is in the future,
//! - a matching entry still exists in the session cache under a token-derived key.
//!
//! The cache entry is the revocation mechanism: deleting it invalidates the
//! token immediately, even while the signature is still cryptographically
//! valid. The signature in turn protects against cache tampering and keeps
//! verification to a single cache round trip.
//!
//! ## Authorization
//!
//! Users carry a role (`user` or `admin`) and a whitelisted flag. Role and
//! whitelist changes are admin-only and revoke the target's live sessions so
//! stale privileges cannot outlive the change.
//!
//! ## Storage
//!
//! Credentials live in Postgres behind the [`store::CredentialStore`] trait;
//! session and reset-ticket state lives in Redis behind the
//! [`cache::SessionCache`] trait. In-memory implementations of both back the
//! test suite and local development.

pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod email;
pub mod password;
pub mod store;
pub mod token;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

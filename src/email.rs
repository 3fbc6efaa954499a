//! Outbound notification abstraction.
//!
//! Password-reset delivery goes through the [`Notifier`] trait so the auth
//! flows never depend on a concrete mail transport. The default
//! [`LogNotifier`] logs the message and reports success, which is what local
//! development and tests want; a real SMTP or API sender implements the same
//! trait. Delivery is best-effort: callers log failures and keep their
//! response generic.

use anyhow::Result;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Out-of-band message delivery.
pub trait Notifier: Send + Sync {
    /// Deliver a message or return an error for the caller to log.
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()>;
}

/// Local dev notifier that logs instead of sending real mail.
#[derive(Clone, Debug)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        info!(to_email = %to, subject = %subject, body = %body, "notifier send stub");
        Ok(())
    }
}

/// Test notifier that records every message.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, String, String)>>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> Vec<(String, String, String)> {
        self.sent.lock().expect("notifier lock poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .expect("notifier lock poisoned")
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

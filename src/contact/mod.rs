//! Contact-form submissions and the notification hook they trigger.
//!
//! A submission is validated, acknowledged with a deterministic message
//! id, and handed to a [`ContactNotifier`] on a detached task so the HTTP
//! response never waits on (or fails because of) the notification.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Reply text sent back for every accepted submission.
pub const RECEIVED_MESSAGE: &str = "Your message has been received! I'll get back to you soon.";

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// Body of `POST /api/contact`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Check the email address has a plausible `local@domain.tld` shape.
    pub fn validate(&self) -> Result<(), String> {
        validate_email(&self.email).map_err(|reason| format!("invalid email address: {reason}"))
    }

    /// Deterministic id derived from the sender address and message length
    /// (in characters).
    pub fn message_id(&self) -> String {
        format!("msg_{}_{}", self.email, self.message.chars().count())
    }
}

fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("address is empty");
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err("address is too long");
    }
    if email.chars().any(char::is_whitespace) {
        return Err("address contains whitespace");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("missing '@'");
    };
    if local.is_empty() {
        return Err("empty local part");
    }
    if domain.contains('@') {
        return Err("more than one '@'");
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err("domain must contain a dot-separated name");
    }
    Ok(())
}

/// An accepted submission, stamped with its arrival time.
#[derive(Debug, Clone, Serialize)]
pub struct ContactSubmission {
    #[serde(flatten)]
    pub form: ContactForm,
    pub message_id: String,
    pub received_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn new(form: ContactForm) -> Self {
        Self {
            message_id: form.message_id(),
            form,
            received_at: Utc::now(),
        }
    }
}

/// Receives accepted contact submissions (email, chat webhook, ...).
#[async_trait]
pub trait ContactNotifier: Send + Sync {
    fn name(&self) -> &str;

    async fn notify(&self, submission: &ContactSubmission) -> anyhow::Result<()>;
}

/// Notifier that only writes the submission to the log.
///
/// Stands in for a real email integration (SendGrid, SES, ...).
pub struct LogNotifier;

#[async_trait]
impl ContactNotifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, submission: &ContactSubmission) -> anyhow::Result<()> {
        info!(
            email = %submission.form.email,
            from = %submission.form.name,
            message_id = %submission.message_id,
            received_at = %submission.received_at.to_rfc3339(),
            "email notification"
        );
        info!(body = %submission.form.message, "email notification body");
        Ok(())
    }
}

/// Run `notifier` for `submission` on a detached task.
///
/// Failures are logged and otherwise dropped.
pub fn schedule_notification(notifier: Arc<dyn ContactNotifier>, submission: ContactSubmission) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&submission).await {
            warn!(
                notifier = notifier.name(),
                message_id = %submission.message_id,
                error = %format!("{e:#}"),
                "contact notification failed"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: "Ada".into(),
            email: email.into(),
            message: message.into(),
        }
    }

    #[test]
    fn message_id_uses_email_and_char_count() {
        assert_eq!(form("ada@example.com", "hello").message_id(), "msg_ada@example.com_5");
        // Counted in characters, not bytes.
        assert_eq!(form("a@b.io", "héllo").message_id(), "msg_a@b.io_5");
    }

    #[test]
    fn accepts_plausible_addresses() {
        for ok in ["ada@example.com", "first.last+tag@mail.example.co.uk", "x@y.z"] {
            assert!(form(ok, "m").validate().is_ok(), "{ok} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "ada@",
            "ada@example",
            "ada@@example.com",
            "ada@exa mple.com",
            "ada@example..com",
            "ada@.example.com",
        ] {
            assert!(form(bad, "m").validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn submission_flattens_form_when_serialised() {
        let sub = ContactSubmission::new(form("ada@example.com", "hi"));
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["message_id"], "msg_ada@example.com_2");
        assert!(json["received_at"].is_string());
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        let sub = ContactSubmission::new(form("ada@example.com", "hi"));
        assert!(LogNotifier.notify(&sub).await.is_ok());
    }
}

//! Outbound e-mail for submission alerts.
//!
//! Writers enqueue messages and return immediately; a background worker hands
//! them to a [`Mailer`]. Delivery failures are logged and never reach the
//! request that produced the message.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync {
    fn deliver(&self, message: &MailMessage) -> Result<()>;
}

/// Mailer that only records messages in the log. Used when no SMTP relay is
/// configured.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn deliver(&self, message: &MailMessage) -> Result<()> {
        tracing::info!(
            "Mail to {}: {}",
            message.to.join(", "),
            message.subject
        );
        Ok(())
    }
}

/// Sending half of the mail queue.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<MailMessage>,
}

impl MailQueue {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MailMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a message. Never fails the caller.
    pub fn enqueue(&self, message: MailMessage) {
        if message.to.is_empty() {
            tracing::debug!("Skipping mail '{}' with no recipients", message.subject);
            return;
        }
        if let Err(e) = self.tx.send(message) {
            tracing::warn!("Mail queue closed, dropping '{}'", e.0.subject);
        }
    }
}

/// Drains the queue until every sender is dropped.
pub async fn run_mail_worker(
    mut rx: mpsc::UnboundedReceiver<MailMessage>,
    mailer: Arc<dyn Mailer>,
) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = mailer.deliver(&message) {
            tracing::warn!("Failed to deliver mail '{}': {e}", message.subject);
        }
    }
    tracing::debug!("Mail worker stopped");
}

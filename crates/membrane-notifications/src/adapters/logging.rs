use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use super::EmailSender;
use crate::error::NotificationError;
use crate::types::{EmailMessage, SendReport};

/// Sender used when no mail server is configured.
///
/// Messages are not delivered. Each one is logged (recipient and subject
/// only, bodies carry verification links) and kept in an in-memory outbox.
pub struct LogEmailSender {
    outbox: Mutex<Vec<EmailMessage>>,
    capacity: usize,
}

impl LogEmailSender {
    /// Creates a sender keeping at most `capacity` recent messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Returns the retained messages, oldest first.
    pub async fn messages(&self) -> Vec<EmailMessage> {
        self.outbox.lock().await.clone()
    }

    /// Returns the most recent message.
    pub async fn last_message(&self) -> Option<EmailMessage> {
        self.outbox.lock().await.last().cloned()
    }
}

impl Default for LogEmailSender {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendReport, NotificationError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "No mail server configured, email kept in outbox"
        );

        let mut outbox = self.outbox.lock().await;
        if self.capacity == 0 {
            return Ok(SendReport {
                provider: self.name(),
                external_id: None,
            });
        }
        if outbox.len() >= self.capacity {
            outbox.remove(0);
        }
        outbox.push(message.clone());

        Ok(SendReport {
            provider: self.name(),
            external_id: Some(format!("outbox-{}", outbox.len())),
        })
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from: "no-reply@membrane.example".to_string(),
            to: to.to_string(),
            subject: "Sign in".to_string(),
            body: "link".to_string(),
            html_body: None,
        }
    }

    #[tokio::test]
    async fn test_messages_are_retained() {
        let sender = LogEmailSender::default();
        let report = sender.send(&message("a@example.com")).await.unwrap();

        assert_eq!(report.provider, "log");
        assert_eq!(sender.messages().await.len(), 1);
        assert_eq!(
            sender.last_message().await.unwrap().to,
            "a@example.com"
        );
    }

    #[tokio::test]
    async fn test_outbox_is_bounded() {
        let sender = LogEmailSender::new(2);
        for to in ["a@example.com", "b@example.com", "c@example.com"] {
            sender.send(&message(to)).await.unwrap();
        }

        let kept: Vec<_> = sender.messages().await.into_iter().map(|m| m.to).collect();
        assert_eq!(kept, vec!["b@example.com", "c@example.com"]);
    }
}

pub mod logging;
pub mod smtp;

use async_trait::async_trait;

use crate::error::NotificationError;
use crate::types::{EmailMessage, SendReport};

/// Delivers email messages.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a message
    async fn send(&self, message: &EmailMessage) -> Result<SendReport, NotificationError>;

    /// Adapter name, used in logs
    fn name(&self) -> &'static str;
}

pub use logging::LogEmailSender;
pub use smtp::SmtpEmailSender;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Rejected by server: {0}")]
    Rejected(String),
}

impl NotificationError {
    /// Returns `true` if the failure happened while talking to the mail
    /// server rather than while preparing the message.
    #[must_use]
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Self::SendFailed(_) | Self::Rejected(_))
    }
}

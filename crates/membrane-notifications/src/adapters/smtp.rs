use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart, header::ContentType},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, warn};

use super::EmailSender;
use crate::error::NotificationError;
use crate::types::{EmailMessage, SendReport, SmtpSettings};

/// Port on which the relay expects implicit TLS. Every other port uses
/// STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Delivers mail through an SMTP relay.
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpEmailSender {
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        if settings.host.trim().is_empty() {
            return Err(NotificationError::InvalidConfig("Missing smtp host".into()));
        }

        let builder = if settings.port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        };
        let mut builder = builder
            .map_err(|e| NotificationError::InvalidConfig(e.to_string()))?
            .port(settings.port);

        match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    host = %settings.host,
                    "SMTP username and password must be set together, connecting without credentials"
                );
            }
            (None, None) => {}
        }

        Ok(Self {
            mailer: builder.build(),
            host: settings.host.clone(),
        })
    }
}

/// Builds a lettre message, with an HTML alternative when one is present.
pub(crate) fn build_message(message: &EmailMessage) -> Result<Message, NotificationError> {
    let from: Mailbox = message
        .from
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("Invalid from: {}", e)))?;
    let to: Mailbox = message
        .to
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("Invalid to: {}", e)))?;

    let builder = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str());

    let built = match &message.html_body {
        Some(html) => builder.multipart(MultiPart::alternative_plain_html(
            message.body.clone(),
            html.clone(),
        )),
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone()),
    };

    built.map_err(|e| NotificationError::SendFailed(e.to_string()))
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<SendReport, NotificationError> {
        let email = build_message(message)?;

        let response = self
            .mailer
            .send(email)
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        if !response.is_positive() {
            let text: Vec<&str> = response.message().collect();
            return Err(NotificationError::Rejected(text.join(" ")));
        }

        debug!(host = %self.host, to = %message.to, "Email delivered via SMTP");

        Ok(SendReport {
            provider: self.name(),
            external_id: Some(response.message().collect::<Vec<_>>().join(" ")),
        })
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use membrane_auth::prelude::*;
use membrane_notifications::{EmailSender, LogEmailSender, SmtpEmailSender};
use url::Url;

use crate::config::{AppConfig, ConfigError};
use crate::validation::EmailValidator;

/// Settings for outgoing verification emails.
#[derive(Debug, Clone)]
pub struct EmailSettings {
    pub sender: String,
    pub subject: String,
    pub token_ttl: Duration,
}

#[derive(Clone)]
pub struct AppState {
    pub client_verifier: Arc<ClientTokenVerifier>,
    pub email_tokens: Arc<EmailTokenService>,
    pub email_sender: Arc<dyn EmailSender>,
    pub email_validator: Arc<EmailValidator>,
    pub email_settings: Arc<EmailSettings>,
    pub frontend_url: Arc<Url>,
}

impl AppState {
    /// Wires the services described by `cfg`: keys from disk, an in-memory
    /// blacklist and the system clock.
    pub fn from_config(cfg: &AppConfig) -> Result<Self, ConfigError> {
        let keys: Arc<dyn KeyProvider> = Arc::new(cfg.keys.store());
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let blacklist: Arc<dyn TokenBlacklist> = Arc::new(InMemoryBlacklist::new());

        let email_sender: Arc<dyn EmailSender> = match &cfg.email.smtp {
            Some(smtp) => Arc::new(
                SmtpEmailSender::new(smtp).map_err(|e| ConfigError::Invalid(e.to_string()))?,
            ),
            None => {
                tracing::warn!("No SMTP relay configured, verification emails will not be delivered");
                Arc::new(LogEmailSender::default())
            }
        };

        Self::new(cfg, keys, blacklist, clock, email_sender)
    }

    pub fn new(
        cfg: &AppConfig,
        keys: Arc<dyn KeyProvider>,
        blacklist: Arc<dyn TokenBlacklist>,
        clock: Arc<dyn Clock>,
        email_sender: Arc<dyn EmailSender>,
    ) -> Result<Self, ConfigError> {
        let client_verifier = ClientTokenVerifier::new(
            TokenCodec::new(cfg.token.clone()),
            keys.clone(),
            clock.clone(),
        );
        let email_tokens = EmailTokenService::new(
            TokenCodec::new(cfg.token.clone()),
            keys,
            blacklist,
            clock,
            cfg.sso.verification_endpoint()?,
        );
        let email_validator = EmailValidator::new(&cfg.email.allowed_pattern)
            .map_err(|e| ConfigError::Invalid(format!("email.allowed_pattern: {e}")))?;

        Ok(Self {
            client_verifier: Arc::new(client_verifier),
            email_tokens: Arc::new(email_tokens),
            email_sender,
            email_validator: Arc::new(email_validator),
            email_settings: Arc::new(EmailSettings {
                sender: cfg.email.sender.clone(),
                subject: cfg.email.subject.clone(),
                token_ttl: cfg.email.token_ttl,
            }),
            frontend_url: Arc::new(cfg.sso.frontend_url()?),
        })
    }
}

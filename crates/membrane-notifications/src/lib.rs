//! Email delivery for verification links.
//!
//! - [`EmailSender`] - delivery trait
//! - [`SmtpEmailSender`] - SMTP relay via lettre
//! - [`LogEmailSender`] - keeps messages in memory when no relay is configured
//! - [`verification_email`] - the sign-in link message

pub mod adapters;
pub mod error;
pub mod templates;
pub mod types;

pub use adapters::{EmailSender, LogEmailSender, SmtpEmailSender};
pub use error::NotificationError;
pub use templates::{Template, verification_email, verification_template};
pub use types::*;

//! HTTP error responses.
//!
//! Every failure renders as `{"error": code, "message": text}`. Token errors
//! are already collapsed to their boundary variant by the time they get here,
//! so the message never carries cryptographic detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use membrane_auth::SsoError;
use membrane_notifications::NotificationError;
use serde_json::json;

use crate::validation::EmailError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Sso(#[from] SsoError),

    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Invalid redirect URL.")]
    InvalidRedirectUrl,

    #[error("Failed to send verification email.")]
    Delivery(#[source] NotificationError),
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::InvalidAddress(_) => Self::Email(EmailError::Invalid),
            other => Self::Delivery(other),
        }
    }
}

impl ApiError {
    /// Returns (HTTP status, error code, client-facing message).
    fn details(&self) -> (StatusCode, &'static str, String) {
        match self {
            Self::Sso(SsoError::MissingToken) => (
                StatusCode::BAD_REQUEST,
                "missing_token",
                "Missing token.".into(),
            ),
            Self::Sso(err @ SsoError::InvalidClientToken { .. }) => (
                StatusCode::UNAUTHORIZED,
                "invalid_client_token",
                err.to_string(),
            ),
            Self::Sso(err @ SsoError::InvalidEmailToken { .. }) => (
                StatusCode::UNAUTHORIZED,
                "invalid_email_token",
                err.to_string(),
            ),
            Self::Sso(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error.".into(),
            ),
            Self::Email(err) => (StatusCode::BAD_REQUEST, "invalid_email", err.to_string()),
            Self::InvalidRedirectUrl => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                self.to_string(),
            ),
            Self::Delivery(NotificationError::InvalidConfig(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error.".into(),
            ),
            Self::Delivery(_) => (
                StatusCode::BAD_GATEWAY,
                "email_delivery_failed",
                self.to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.details();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                cause = ?std::error::Error::source(&self),
                "Request failed"
            );
        }

        let body = json!({
            "error": code,
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

//! SSO endpoints.
//!
//! - `GET /login?token=` - verify a client application token and hand the
//!   user to the frontend
//! - `POST /email-verification` - mail a single-use sign-in link
//! - `GET /authenticate?token=` - follow the emailed link back to the client
//!   application
//! - `GET /health`

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use membrane_auth::{EmailRedirect, SsoError, TokenBlacklist, token_fingerprint};
use membrane_notifications::verification_email;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use url::Url;

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::validate_redirect_url;

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl TokenQuery {
    fn require(self) -> Result<String, ApiError> {
        match self.token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(SsoError::MissingToken.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EmailVerificationRequest {
    pub email: Option<String>,
    pub redirect_url: Option<String>,
}

fn found(location: &Url) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.as_str())]).into_response()
}

/// GET /login
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, ApiError> {
    let token = query.require()?;
    let target = state
        .client_verifier
        .login_redirect(&token, &state.frontend_url)?;
    Ok(found(&target))
}

/// POST /email-verification
pub async fn email_verification(
    State(state): State<AppState>,
    Json(request): Json<EmailVerificationRequest>,
) -> Result<Response, ApiError> {
    let email = state
        .email_validator
        .validate(request.email.as_deref())
        .inspect_err(|e| warn!(error = %e, "Rejected email verification request"))?;
    let redirect_url =
        validate_redirect_url(request.redirect_url.as_deref()).ok_or(ApiError::InvalidRedirectUrl)?;

    let settings = &state.email_settings;
    let link = state
        .email_tokens
        .issue(email, redirect_url.as_str(), settings.token_ttl)?;

    let message = verification_email(email, &settings.sender, &settings.subject, link.as_str());
    let report = state.email_sender.send(&message).await?;

    info!(
        provider = report.provider,
        external_id = report.external_id.as_deref(),
        redirect_host = redirect_url.host_str(),
        "Verification email sent"
    );

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "sent" }))).into_response())
}

/// GET /authenticate
pub async fn authenticate(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Response, ApiError> {
    let token = query.require()?;
    let redirect = state.email_tokens.verify_with_fallback(&token).await?;

    if let EmailRedirect::Restart(_) = &redirect {
        info!(
            token = %token_fingerprint(&token),
            "Email token already used, sending user back to restart sign-in"
        );
    }
    Ok(found(redirect.url()))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Response, ApiError> {
    let consumed = state.email_tokens.blacklist().len().await?;
    Ok(Json(json!({
        "status": "ok",
        "consumed_tokens": consumed,
    }))
    .into_response())
}

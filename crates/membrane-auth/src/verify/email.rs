//! Email-verification tokens.
//!
//! The server issues short-lived tokens signed with its own private key,
//! mails a link carrying the token, and verifies the token when the link is
//! followed. Tokens are single-use: a successful verification records the
//! token in the [`TokenBlacklist`].
//!
//! # Token lifecycle
//!
//! ```text
//! Issued -> Pending -> Consumed | Expired
//! ```
//!
//! A consumed token is blacklisted; there is no way back to `Pending`.
//!
//! # Fallback
//!
//! [`EmailTokenService::verify_with_fallback`] retries a failed verification
//! with [`ReplayProtection::Bypass`] so that a user clicking a link twice is
//! sent back to the client application to restart sign-in instead of being
//! stranded on an error page. The retry does not consume the token and
//! returns the bare redirect URL without the token, so it never completes a
//! second sign-in.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use super::append_token;
use crate::SsoResult;
use crate::clock::Clock;
use crate::error::SsoError;
use crate::keys::KeyProvider;
use crate::storage::TokenBlacklist;
use crate::token::{TokenClaims, TokenCodec, token_fingerprint};

/// Whether a decode consults the replay blacklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayProtection {
    /// Reject tokens found in the blacklist.
    Enforce,
    /// Ignore the blacklist. Only used by the fallback path.
    Bypass,
}

/// Outcome of [`EmailTokenService::verify_with_fallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailRedirect {
    /// The token was verified and consumed. The URL carries the token.
    Verified(Url),
    /// The token could not be consumed but still names a redirect target.
    /// The URL is the bare target so the user can restart sign-in.
    Restart(Url),
}

impl EmailRedirect {
    /// Returns the redirect target.
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::Verified(url) | Self::Restart(url) => url,
        }
    }

    /// Returns the redirect target, consuming `self`.
    #[must_use]
    pub fn into_url(self) -> Url {
        match self {
            Self::Verified(url) | Self::Restart(url) => url,
        }
    }

    /// Returns `true` if the token was consumed.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Issues and verifies email-verification tokens.
pub struct EmailTokenService {
    codec: TokenCodec,
    keys: Arc<dyn KeyProvider>,
    blacklist: Arc<dyn TokenBlacklist>,
    clock: Arc<dyn Clock>,
    verification_endpoint: Url,
}

impl EmailTokenService {
    /// Creates a service.
    ///
    /// `verification_endpoint` is the absolute URL of the endpoint that
    /// accepts the `token` query parameter.
    pub fn new(
        codec: TokenCodec,
        keys: Arc<dyn KeyProvider>,
        blacklist: Arc<dyn TokenBlacklist>,
        clock: Arc<dyn Clock>,
        verification_endpoint: Url,
    ) -> Self {
        Self {
            codec,
            keys,
            blacklist,
            clock,
            verification_endpoint,
        }
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Returns the blacklist.
    #[must_use]
    pub fn blacklist(&self) -> &Arc<dyn TokenBlacklist> {
        &self.blacklist
    }

    /// Signs a token for `email` that redirects to `redirect_url` and expires
    /// `ttl` from now.
    ///
    /// # Errors
    /// Returns `PrivateKeyNotFound` before any signing is attempted if the
    /// server key is missing, or the codec's encoding errors.
    pub fn issue_token(&self, email: &str, redirect_url: &str, ttl: Duration) -> SsoResult<String> {
        let private_key = self.keys.server_private_key()?;

        let ttl = i64::try_from(ttl.as_secs())
            .map_err(|_| SsoError::configuration("token ttl is too large"))?;
        let expiration = self.clock.now().saturating_add(ttl);

        let config = self.codec.config();
        let claims = TokenClaims::new()
            .with(config.subject_field.as_str(), email)
            .with(config.redirect_url_field.as_str(), redirect_url)
            .with(config.expiration_field.as_str(), expiration);

        self.codec.encode(&claims, &private_key)
    }

    /// Issues a token and returns the verification URL embedding it.
    ///
    /// # Errors
    /// See [`issue_token`](Self::issue_token).
    pub fn issue(&self, email: &str, redirect_url: &str, ttl: Duration) -> SsoResult<Url> {
        let token = self.issue_token(email, redirect_url, ttl)?;
        info!(
            token = %token_fingerprint(&token),
            ttl_secs = ttl.as_secs(),
            "Email verification token issued"
        );
        Ok(append_token(&self.verification_endpoint, &token))
    }

    /// Verifies a token without consuming it.
    ///
    /// # Errors
    /// - `MissingToken` for empty input
    /// - `BlacklistedToken` if consumed and `protection` is `Enforce`
    /// - `PublicKeyNotFound` if the server public key is missing
    /// - `InvalidToken`, `MissingClaim` or `TokenExpired` from verification
    pub async fn decode(&self, token: &str, protection: ReplayProtection) -> SsoResult<TokenClaims> {
        if token.is_empty() {
            return Err(SsoError::MissingToken);
        }

        if protection == ReplayProtection::Enforce && self.blacklist.contains(token).await? {
            return Err(SsoError::BlacklistedToken);
        }

        let public_key = self.keys.server_public_key()?;
        let claims = self.codec.decode_verified(token, &public_key)?;

        self.codec.redirect_url(&claims)?;
        self.codec.check_expiration(&claims, self.clock.now())?;

        Ok(claims)
    }

    /// Verifies a token, records it as consumed and returns the redirect
    /// target with the token appended.
    ///
    /// Recording is atomic: of several concurrent calls with the same token
    /// exactly one succeeds and the others fail with `BlacklistedToken`.
    ///
    /// # Errors
    /// Any error of [`decode`](Self::decode), `BlacklistedToken` when another
    /// request consumed the token first, or `InvalidClaim` if the redirect
    /// claim is not an absolute URL.
    pub async fn verify_and_consume(&self, token: &str) -> SsoResult<Url> {
        let claims = self.decode(token, ReplayProtection::Enforce).await?;
        let target = self.redirect_target(&claims)?;

        if !self.blacklist.mark_used(token).await? {
            return Err(SsoError::BlacklistedToken);
        }

        debug!(token = %token_fingerprint(token), "Email verification token consumed");
        Ok(append_token(&target, token))
    }

    /// Like [`verify_and_consume`](Self::verify_and_consume), but falls back to
    /// a decode without replay protection when verification fails.
    ///
    /// The fallback deliberately weakens replay protection: a consumed token
    /// still yields its redirect target. It never consumes the token and
    /// returns [`EmailRedirect::Restart`] with the bare target.
    ///
    /// # Errors
    /// Returns `InvalidEmailToken` wrapping the cause if both attempts fail or
    /// the signature does not verify. Missing tokens and key store failures
    /// are returned unwrapped.
    pub async fn verify_with_fallback(&self, token: &str) -> SsoResult<EmailRedirect> {
        let first = match self.verify_and_consume(token).await {
            Ok(url) => return Ok(EmailRedirect::Verified(url)),
            Err(err) => err,
        };

        if !first.is_fallback_eligible() {
            error!(
                error.kind = first.kind(),
                token = %token_fingerprint(token),
                error = %first,
                "Failed to verify email token"
            );
            if first.is_validation_error() {
                return Err(first.into_email_boundary());
            }
            return Err(first);
        }

        warn!(
            error.kind = first.kind(),
            token = %token_fingerprint(token),
            "Email token rejected, retrying without replay protection"
        );

        let fallback = async {
            let claims = self.decode(token, ReplayProtection::Bypass).await?;
            self.redirect_target(&claims)
        };

        match fallback.await {
            Ok(target) => Ok(EmailRedirect::Restart(target)),
            Err(err) => {
                error!(
                    error.kind = err.kind(),
                    first_error.kind = first.kind(),
                    token = %token_fingerprint(token),
                    error = %err,
                    "Failed to decode email verification token"
                );
                Err(err.into_email_boundary())
            }
        }
    }

    fn redirect_target(&self, claims: &TokenClaims) -> SsoResult<Url> {
        let raw = self.codec.redirect_url(claims)?;
        Url::parse(raw).map_err(|e| {
            SsoError::invalid_claim(self.codec.config().redirect_url_field.as_str(), e.to_string())
        })
    }
}

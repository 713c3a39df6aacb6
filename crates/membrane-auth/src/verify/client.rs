//! Verification of tokens issued by client applications.
//!
//! A client application signs a token with its own private key and embeds
//! its application id. The verifier peeks at the unverified payload to learn
//! the app id, resolves that application's public key, and only then checks
//! the signature with the pinned algorithm.
//!
//! # Verification order
//!
//! 1. Empty token → `MissingToken`
//! 2. No app id claim → `AppIdMissing`
//! 3. No registered key → `PublicKeyNotFound` (signature never checked)
//! 4. Bad signature, structure or algorithm → `InvalidToken`
//! 5. No redirect claim → `MissingClaim`
//! 6. Past expiration → `TokenExpired`

use std::sync::Arc;

use tracing::{debug, error};
use url::Url;

use super::append_token;
use crate::SsoResult;
use crate::clock::Clock;
use crate::error::SsoError;
use crate::keys::KeyProvider;
use crate::token::{TokenClaims, TokenCodec, token_fingerprint};

/// Verifies client application tokens.
pub struct ClientTokenVerifier {
    codec: TokenCodec,
    keys: Arc<dyn KeyProvider>,
    clock: Arc<dyn Clock>,
}

impl ClientTokenVerifier {
    /// Creates a verifier.
    pub fn new(codec: TokenCodec, keys: Arc<dyn KeyProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { codec, keys, clock }
    }

    /// Returns the codec.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verifies a client token and returns its payload.
    ///
    /// # Errors
    /// Returns the specific error of the first failing step (see module docs).
    pub fn verify(&self, token: &str) -> SsoResult<TokenClaims> {
        self.verify_tracking_issuer(token, &mut None)
    }

    /// Verifies a client token, collapsing failures into `InvalidClientToken`.
    ///
    /// The specific error is logged with its kind and the claimed app id
    /// before being wrapped.
    ///
    /// # Errors
    /// Returns `InvalidClientToken` wrapping the specific cause.
    pub fn verify_for_login(&self, token: &str) -> SsoResult<TokenClaims> {
        let mut issuer = None;
        self.verify_tracking_issuer(token, &mut issuer)
            .map_err(|err| {
                error!(
                    error.kind = err.kind(),
                    app_id = issuer.as_deref().unwrap_or("<unknown>"),
                    token = %token_fingerprint(token),
                    error = %err,
                    "Failed to decode client application token"
                );
                err.into_client_boundary(issuer)
            })
    }

    /// Verifies a client token and builds the SSO frontend redirect.
    ///
    /// # Errors
    /// Returns `InvalidClientToken` if verification fails.
    pub fn login_redirect(&self, token: &str, frontend_url: &Url) -> SsoResult<Url> {
        let claims = self.verify_for_login(token)?;
        debug!(
            app_id = claims.get_str(&self.codec.config().app_id_field),
            "Client token verified, redirecting to frontend"
        );
        Ok(append_token(frontend_url, token))
    }

    fn verify_tracking_issuer(
        &self,
        token: &str,
        issuer: &mut Option<String>,
    ) -> SsoResult<TokenClaims> {
        if token.is_empty() {
            return Err(SsoError::MissingToken);
        }

        let unverified = self.codec.decode_unverified(token)?;
        let app_id = self.codec.app_id(&unverified)?;
        *issuer = Some(app_id.clone());

        let public_key = self.keys.public_key(&app_id)?;
        let claims = self.codec.decode_verified(token, &public_key)?;

        self.codec.redirect_url(&claims)?;
        self.codec.check_expiration(&claims, self.clock.now())?;

        Ok(claims)
    }
}

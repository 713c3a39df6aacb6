//! Token verification flows.
//!
//! - [`ClientTokenVerifier`] - tokens issued by client applications
//! - [`EmailTokenService`] - the server's own email-verification tokens

pub mod client;
pub mod email;

use url::Url;

use crate::TOKEN_QUERY_PARAM;

pub use client::ClientTokenVerifier;
pub use email::{EmailRedirect, EmailTokenService, ReplayProtection};

/// Returns `base` with the token appended as the `token` query parameter.
///
/// Existing query parameters are preserved.
#[must_use]
pub fn append_token(base: &Url, token: &str) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token);
    url
}

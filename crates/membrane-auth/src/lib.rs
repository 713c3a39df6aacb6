//! # membrane-auth
//!
//! Token issuance and verification for the Membrane single-sign-on handshake.
//!
//! This crate provides:
//! - Verification of client application tokens against per-application
//!   public keys
//! - Issuance and single-use verification of email-verification tokens
//!   signed with the server keypair
//! - Replay protection for consumed email tokens
//! - Key resolution from a key directory and key generation
//!
//! ## Modules
//!
//! - [`config`] - Claim field names and the pinned signing algorithm
//! - [`clock`] - UTC time source used for expiration checks
//! - [`keys`] - Key resolution and key generation
//! - [`token`] - Low-level sign/verify/decode primitives
//! - [`storage`] - Replay blacklist storage
//! - [`verify`] - Client token verifier and email token service
//! - [`error`] - Error taxonomy

pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod storage;
pub mod token;
pub mod verify;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{SigningAlgorithm, TokenConfig};
pub use error::SsoError;
pub use keys::{
    FileKeyStore, InMemoryKeyStore, KeyProvider, PrivateKeyPem, PublicKeyPem, SERVER_KEY_ID,
};
pub use storage::{InMemoryBlacklist, TokenBlacklist};
pub use token::{TokenClaims, TokenCodec, token_fingerprint};
pub use verify::{
    ClientTokenVerifier, EmailRedirect, EmailTokenService, ReplayProtection, append_token,
};

/// Type alias for token operation results.
pub type SsoResult<T> = Result<T, SsoError>;

/// Query parameter that carries tokens in redirect and verification URLs.
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Prelude module for convenient imports.
///
/// ```ignore
/// use membrane_auth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::SsoResult;
    pub use crate::clock::{Clock, FixedClock, SystemClock};
    pub use crate::config::{SigningAlgorithm, TokenConfig};
    pub use crate::error::SsoError;
    pub use crate::keys::{FileKeyStore, InMemoryKeyStore, KeyProvider};
    pub use crate::storage::{InMemoryBlacklist, TokenBlacklist};
    pub use crate::token::{TokenClaims, TokenCodec};
    pub use crate::verify::{
        ClientTokenVerifier, EmailRedirect, EmailTokenService, ReplayProtection,
    };
}

#[cfg(test)]
pub(crate) mod test_support;

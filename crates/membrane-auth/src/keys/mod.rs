//! Key resolution.
//!
//! A [`KeyProvider`] resolves the public key registered for a client
//! application and the server's own keypair. Key material is handled as PEM
//! text; the [`TokenCodec`](crate::token::TokenCodec) turns it into signing
//! or verification keys for the pinned algorithm.
//!
//! # Implementations
//!
//! - [`FileKeyStore`] - key directory with one `<app_id>_public_key.pem` per
//!   application plus a separately stored server keypair
//! - [`InMemoryKeyStore`] - map-backed store for embedding and tests

pub mod file;
pub mod generate;
pub mod memory;

use std::fmt;

use crate::SsoResult;

pub use file::FileKeyStore;
pub use generate::{GeneratedKeyPair, MIN_RSA_BITS, generate_rsa_keypair};
pub use memory::InMemoryKeyStore;

/// Identifier reported when the server's own public key is missing.
pub const SERVER_KEY_ID: &str = "server";

/// PEM-encoded public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyPem(String);

impl PublicKeyPem {
    /// Wraps PEM text.
    #[must_use]
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    /// Returns the PEM text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the PEM bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// PEM-encoded private key. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKeyPem(String);

impl PrivateKeyPem {
    /// Wraps PEM text.
    #[must_use]
    pub fn new(pem: impl Into<String>) -> Self {
        Self(pem.into())
    }

    /// Returns the PEM text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the PEM bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PrivateKeyPem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyPem(<redacted>)")
    }
}

/// Resolves key material for token signing and verification.
///
/// Reads are side-effect free. Key material is immutable for the process
/// lifetime, so implementations may cache.
pub trait KeyProvider: Send + Sync {
    /// Resolves the public key registered for a client application.
    ///
    /// # Errors
    /// Returns `PublicKeyNotFound` if no key is registered for `app_id`.
    fn public_key(&self, app_id: &str) -> SsoResult<PublicKeyPem>;

    /// Resolves the server's public key.
    ///
    /// # Errors
    /// Returns `PublicKeyNotFound` (with [`SERVER_KEY_ID`]) if it is missing.
    fn server_public_key(&self) -> SsoResult<PublicKeyPem>;

    /// Resolves the server's private key.
    ///
    /// # Errors
    /// Returns `PrivateKeyNotFound` if it is missing.
    fn server_private_key(&self) -> SsoResult<PrivateKeyPem>;
}

/// Returns `true` if `app_id` can safely be used to derive a key file name.
pub(crate) fn is_safe_app_id(app_id: &str) -> bool {
    !app_id.is_empty()
        && app_id != "."
        && app_id != ".."
        && app_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

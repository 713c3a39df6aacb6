//! In-memory key store.

use dashmap::DashMap;

use super::{GeneratedKeyPair, KeyProvider, PrivateKeyPem, PublicKeyPem, SERVER_KEY_ID};
use crate::SsoResult;
use crate::error::SsoError;

/// Map-backed [`KeyProvider`].
#[derive(Debug, Default)]
pub struct InMemoryKeyStore {
    client_keys: DashMap<String, PublicKeyPem>,
    server_public_key: Option<PublicKeyPem>,
    server_private_key: Option<PrivateKeyPem>,
}

impl InMemoryKeyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given server keypair.
    #[must_use]
    pub fn with_server_keypair(key_pair: GeneratedKeyPair) -> Self {
        Self {
            client_keys: DashMap::new(),
            server_public_key: Some(key_pair.public_key),
            server_private_key: Some(key_pair.private_key),
        }
    }

    /// Registers (or replaces) the public key of a client application.
    pub fn insert_client_key(&self, app_id: impl Into<String>, key: PublicKeyPem) {
        self.client_keys.insert(app_id.into(), key);
    }

    /// Returns the number of registered client applications.
    #[must_use]
    pub fn client_count(&self) -> usize {
        self.client_keys.len()
    }
}

impl KeyProvider for InMemoryKeyStore {
    fn public_key(&self, app_id: &str) -> SsoResult<PublicKeyPem> {
        self.client_keys
            .get(app_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SsoError::public_key_not_found(app_id))
    }

    fn server_public_key(&self) -> SsoResult<PublicKeyPem> {
        self.server_public_key
            .clone()
            .ok_or_else(|| SsoError::public_key_not_found(SERVER_KEY_ID))
    }

    fn server_private_key(&self) -> SsoResult<PrivateKeyPem> {
        self.server_private_key
            .clone()
            .ok_or_else(|| SsoError::private_key_not_found("<memory>"))
    }
}

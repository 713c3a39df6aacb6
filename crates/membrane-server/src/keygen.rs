//! Key generation in the directory layout of [`KeysConfig`].
//!
//! The client key directory is trusted by the server, so only public keys
//! are ever written there. A client's private half is handed back to the
//! caller for delivery to the client application.

use std::path::PathBuf;

use membrane_auth::SsoResult;
use membrane_auth::keys::{PrivateKeyPem, generate_rsa_keypair};
use tracing::info;

use crate::config::KeysConfig;

/// Paths of a freshly written server keypair.
#[derive(Debug, Clone)]
pub struct ServerKeyPaths {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// A client keypair whose public half has been registered.
#[derive(Debug, Clone)]
pub struct ClientKeys {
    pub public_key_path: PathBuf,
    pub private_key: PrivateKeyPem,
}

/// Generates the server keypair and writes both halves where `keys` points.
pub fn write_server_keypair(keys: &KeysConfig, bits: usize) -> SsoResult<ServerKeyPaths> {
    let key_pair = generate_rsa_keypair(bits)?;
    let store = keys.store();
    store.write_server_keypair(&key_pair)?;

    info!(public_key = %keys.server_public_key.display(), "Server keypair generated");
    Ok(ServerKeyPaths {
        private_key: keys.server_private_key.clone(),
        public_key: keys.server_public_key.clone(),
    })
}

/// Generates a client keypair and registers its public half in the client
/// key directory.
pub fn register_client(keys: &KeysConfig, app_id: &str, bits: usize) -> SsoResult<ClientKeys> {
    let key_pair = generate_rsa_keypair(bits)?;
    let public_key_path = keys
        .store()
        .write_client_public_key(app_id, &key_pair.public_key)?;

    info!(app_id, public_key = %public_key_path.display(), "Client registered");
    Ok(ClientKeys {
        public_key_path,
        private_key: key_pair.private_key,
    })
}

//! Filesystem-backed key store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{
    GeneratedKeyPair, KeyProvider, PrivateKeyPem, PublicKeyPem, SERVER_KEY_ID, is_safe_app_id,
};
use crate::SsoResult;
use crate::error::SsoError;

/// Key store reading PEM files from disk.
///
/// Layout:
///
/// ```text
/// <keys_dir>/<app_id>_public_key.pem     one per client application
/// <server_public_key_path>               server public key
/// <server_private_key_path>              server private key
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    keys_dir: PathBuf,
    server_public_key_path: PathBuf,
    server_private_key_path: PathBuf,
}

impl FileKeyStore {
    /// Creates a key store.
    #[must_use]
    pub fn new(
        keys_dir: impl Into<PathBuf>,
        server_public_key_path: impl Into<PathBuf>,
        server_private_key_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            keys_dir: keys_dir.into(),
            server_public_key_path: server_public_key_path.into(),
            server_private_key_path: server_private_key_path.into(),
        }
    }

    /// Returns the file name holding the public key of `app_id`.
    #[must_use]
    pub fn public_key_file_name(app_id: &str) -> String {
        format!("{app_id}_public_key.pem")
    }

    /// Returns the client key directory.
    #[must_use]
    pub fn keys_dir(&self) -> &Path {
        &self.keys_dir
    }

    /// Returns the path of the server public key.
    #[must_use]
    pub fn server_public_key_path(&self) -> &Path {
        &self.server_public_key_path
    }

    /// Returns the path of the server private key.
    #[must_use]
    pub fn server_private_key_path(&self) -> &Path {
        &self.server_private_key_path
    }

    /// Writes the server keypair, creating parent directories as needed.
    ///
    /// # Errors
    /// Returns `KeyStore` if a file cannot be written.
    pub fn write_server_keypair(&self, key_pair: &GeneratedKeyPair) -> SsoResult<()> {
        write_pem(&self.server_private_key_path, key_pair.private_key.as_str())?;
        write_pem(&self.server_public_key_path, key_pair.public_key.as_str())?;
        debug!(
            public_key = %self.server_public_key_path.display(),
            "Server keypair written"
        );
        Ok(())
    }

    /// Registers the public key of a client application.
    ///
    /// # Errors
    /// Returns `Configuration` for an unusable app id and `KeyStore` if the
    /// file cannot be written.
    pub fn write_client_public_key(
        &self,
        app_id: &str,
        public_key: &PublicKeyPem,
    ) -> SsoResult<PathBuf> {
        if !is_safe_app_id(app_id) {
            return Err(SsoError::configuration(format!(
                "app_id '{app_id}' cannot be used as a key file name"
            )));
        }
        let path = self.keys_dir.join(Self::public_key_file_name(app_id));
        write_pem(&path, public_key.as_str())?;
        Ok(path)
    }
}

impl KeyProvider for FileKeyStore {
    fn public_key(&self, app_id: &str) -> SsoResult<PublicKeyPem> {
        if !is_safe_app_id(app_id) {
            warn!(app_id, "Rejected app_id that cannot name a key file");
            return Err(SsoError::public_key_not_found(app_id));
        }

        let path = self.keys_dir.join(Self::public_key_file_name(app_id));
        match read_pem(&path)? {
            Some(pem) => Ok(PublicKeyPem::new(pem)),
            None => Err(SsoError::public_key_not_found(app_id)),
        }
    }

    fn server_public_key(&self) -> SsoResult<PublicKeyPem> {
        match read_pem(&self.server_public_key_path)? {
            Some(pem) => Ok(PublicKeyPem::new(pem)),
            None => Err(SsoError::public_key_not_found(SERVER_KEY_ID)),
        }
    }

    fn server_private_key(&self) -> SsoResult<PrivateKeyPem> {
        match read_pem(&self.server_private_key_path)? {
            Some(pem) => Ok(PrivateKeyPem::new(pem)),
            None => Err(SsoError::private_key_not_found(
                self.server_private_key_path.display().to_string(),
            )),
        }
    }
}

/// Reads a PEM file, mapping absence to `None`.
fn read_pem(path: &Path) -> SsoResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(pem) => Ok(Some(pem)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SsoError::key_store(format!(
            "failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn write_pem(path: &Path, pem: &str) -> SsoResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| {
            SsoError::key_store(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    fs::write(path, pem)
        .map_err(|e| SsoError::key_store(format!("failed to write {}: {e}", path.display())))
}

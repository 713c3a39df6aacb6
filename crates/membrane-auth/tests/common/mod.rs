//! Shared fixtures for membrane-auth integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use membrane_auth::keys::{GeneratedKeyPair, generate_rsa_keypair};
use membrane_auth::prelude::*;
use tempfile::TempDir;
use url::Url;

pub const NOW: i64 = 1_700_000_000;

pub fn server_keys() -> &'static GeneratedKeyPair {
    static KEYS: OnceLock<GeneratedKeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_rsa_keypair(2048).expect("server keypair"))
}

pub fn client_keys() -> &'static GeneratedKeyPair {
    static KEYS: OnceLock<GeneratedKeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_rsa_keypair(2048).expect("client keypair"))
}

pub fn token_config() -> TokenConfig {
    TokenConfig::new("app_id", "redirect_url", "exp", SigningAlgorithm::RS256)
}

/// A key directory on disk with the server keypair and one registered
/// client application (`crm`).
pub struct KeyDir {
    pub dir: TempDir,
    pub store: FileKeyStore,
}

impl KeyDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tmp dir");
        let store = FileKeyStore::new(
            dir.path().join("clients"),
            dir.path().join("server").join("public_key.pem"),
            dir.path().join("server").join("private_key.pem"),
        );
        store
            .write_server_keypair(server_keys())
            .expect("write server keypair");
        store
            .write_client_public_key("crm", &client_keys().public_key)
            .expect("write client key");
        Self { dir, store }
    }
}

pub struct Harness {
    pub keys: KeyDir,
    pub clock: Arc<FixedClock>,
    pub blacklist: Arc<InMemoryBlacklist>,
    pub verifier: ClientTokenVerifier,
    pub email: EmailTokenService,
}

impl Harness {
    pub fn new() -> Self {
        let keys = KeyDir::new();
        let provider: Arc<dyn KeyProvider> = Arc::new(keys.store.clone());
        let clock = Arc::new(FixedClock::new(NOW));
        let blacklist = Arc::new(InMemoryBlacklist::new());

        let verifier = ClientTokenVerifier::new(
            TokenCodec::new(token_config()),
            provider.clone(),
            clock.clone(),
        );
        let email = EmailTokenService::new(
            TokenCodec::new(token_config()),
            provider,
            blacklist.clone(),
            clock.clone(),
            Url::parse("https://sso.example/authenticate").expect("endpoint"),
        );

        Self {
            keys,
            clock,
            blacklist,
            verifier,
            email,
        }
    }

    /// Signs a client token as the `crm` application would.
    pub fn client_token(&self, claims: &TokenClaims) -> String {
        TokenCodec::new(token_config())
            .encode(claims, &client_keys().private_key)
            .expect("sign client token")
    }
}

pub fn token_param(url: &Url) -> String {
    url.query_pairs()
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .expect("token query parameter")
}

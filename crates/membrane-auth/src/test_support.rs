//! Shared fixtures for unit tests. RSA generation is slow, so keys are
//! generated once per test binary.

use std::sync::OnceLock;

use crate::config::{SigningAlgorithm, TokenConfig};
use crate::keys::{GeneratedKeyPair, generate_rsa_keypair};

pub(crate) fn token_config() -> TokenConfig {
    TokenConfig::new("app_id", "redirect_url", "exp", SigningAlgorithm::RS256)
}

pub(crate) fn rsa_keypair() -> &'static GeneratedKeyPair {
    static KEYS: OnceLock<GeneratedKeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_rsa_keypair(2048).expect("generate RSA keypair"))
}

pub(crate) fn other_rsa_keypair() -> &'static GeneratedKeyPair {
    static KEYS: OnceLock<GeneratedKeyPair> = OnceLock::new();
    KEYS.get_or_init(|| generate_rsa_keypair(2048).expect("generate RSA keypair"))
}

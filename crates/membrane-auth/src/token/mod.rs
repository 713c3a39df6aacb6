//! Token primitives.
//!
//! - [`TokenClaims`] - schemaless JWT payload
//! - [`TokenCodec`] - sign, verify and decode with a pinned algorithm

pub mod codec;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

pub use codec::TokenCodec;

/// JWT payload as a JSON object.
///
/// Claim names are configuration, so the payload is kept schemaless and read
/// through the accessors on [`TokenCodec`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenClaims(Map<String, Value>);

impl TokenClaims {
    /// Creates an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a claim, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a claim value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns a claim value if it is a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Returns `true` if the claim is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no claims.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for TokenClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Short, non-reversible token identifier for logs.
///
/// Raw tokens are bearer credentials and never appear in log output.
#[must_use]
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_accessors() {
        let claims = TokenClaims::new()
            .with("sub", "user@example.com")
            .with("exp", 1_700_000_000_i64);

        assert_eq!(claims.len(), 2);
        assert_eq!(claims.get_str("sub"), Some("user@example.com"));
        assert_eq!(claims.get_str("exp"), None);
        assert!(claims.contains("exp"));
        assert!(!claims.contains("aud"));
    }

    #[test]
    fn test_claims_serialize_as_plain_object() {
        let claims = TokenClaims::new().with("app_id", "crm");
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"app_id":"crm"}"#);
    }

    #[test]
    fn test_fingerprint_is_short_and_stable() {
        let a = token_fingerprint("abc.def.ghi");
        assert_eq!(a.len(), 12);
        assert_eq!(a, token_fingerprint("abc.def.ghi"));
        assert_ne!(a, token_fingerprint("abc.def.ghj"));
    }
}

//! Token configuration.
//!
//! Claim field names and the signing algorithm are configuration rather than
//! literals, so the same codec can serve both client tokens and email tokens.
//! A [`TokenConfig`] value is passed explicitly to every codec and verifier.

use std::fmt;
use std::str::FromStr;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::SsoResult;
use crate::error::SsoError;

/// Claim names and the pinned signing algorithm.
///
/// # Example (TOML)
///
/// ```toml
/// [token]
/// app_id_field = "app_id"
/// redirect_url_field = "redirect_url"
/// expiration_field = "exp"
/// algorithm = "RS256"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Claim carrying the client application identifier.
    pub app_id_field: String,

    /// Claim carrying the post-verification redirect target.
    pub redirect_url_field: String,

    /// Claim carrying the expiration timestamp (Unix seconds).
    pub expiration_field: String,

    /// Claim carrying the verified email address in email tokens.
    #[serde(default = "default_subject_field")]
    pub subject_field: String,

    /// Asymmetric signature algorithm used to sign and verify tokens.
    pub algorithm: SigningAlgorithm,
}

fn default_subject_field() -> String {
    "sub".to_string()
}

impl TokenConfig {
    /// Creates a configuration with the default subject claim (`sub`).
    #[must_use]
    pub fn new(
        app_id_field: impl Into<String>,
        redirect_url_field: impl Into<String>,
        expiration_field: impl Into<String>,
        algorithm: SigningAlgorithm,
    ) -> Self {
        Self {
            app_id_field: app_id_field.into(),
            redirect_url_field: redirect_url_field.into(),
            expiration_field: expiration_field.into(),
            subject_field: default_subject_field(),
            algorithm,
        }
    }

    /// Overrides the subject claim name.
    #[must_use]
    pub fn with_subject_field(mut self, subject_field: impl Into<String>) -> Self {
        self.subject_field = subject_field.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if a claim name is empty or two claims share a name.
    pub fn validate(&self) -> SsoResult<()> {
        let fields = [
            ("app_id_field", &self.app_id_field),
            ("redirect_url_field", &self.redirect_url_field),
            ("expiration_field", &self.expiration_field),
            ("subject_field", &self.subject_field),
        ];

        for (name, value) in &fields {
            if value.trim().is_empty() {
                return Err(SsoError::configuration(format!("{name} must not be empty")));
            }
        }

        for (i, (name_a, value_a)) in fields.iter().enumerate() {
            for (name_b, value_b) in &fields[i + 1..] {
                if value_a == value_b {
                    return Err(SsoError::configuration(format!(
                        "{name_a} and {name_b} both use claim '{value_a}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Supported asymmetric signing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SigningAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    RS256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    RS384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RS512,
    /// ECDSA with P-256 and SHA-256.
    ES256,
    /// ECDSA with P-384 and SHA-384.
    ES384,
}

impl SigningAlgorithm {
    /// Converts to the `jsonwebtoken` Algorithm type.
    #[must_use]
    pub fn to_jwt_algorithm(self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    /// Returns the algorithm name as used in JWT headers.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::RS384 => "RS384",
            Self::RS512 => "RS512",
            Self::ES256 => "ES256",
            Self::ES384 => "ES384",
        }
    }

    /// Returns `true` if this is an RSA-based algorithm.
    #[must_use]
    pub fn is_rsa(&self) -> bool {
        matches!(self, Self::RS256 | Self::RS384 | Self::RS512)
    }

    /// Returns `true` if this is an EC-based algorithm.
    #[must_use]
    pub fn is_ec(&self) -> bool {
        matches!(self, Self::ES256 | Self::ES384)
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SigningAlgorithm {
    type Err = SsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            other => Err(SsoError::configuration(format!(
                "unsupported signing algorithm '{other}' (expected an asymmetric algorithm)"
            ))),
        }
    }
}

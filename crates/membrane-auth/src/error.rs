//! Error types for token issuance and verification.
//!
//! Low-level variants are specific so callers can pattern-match on the exact
//! failure. The two boundary variants, [`SsoError::InvalidClientToken`] and
//! [`SsoError::InvalidEmailToken`], wrap a specific cause for callers that
//! only need pass/fail plus a log trail.

/// Errors that can occur while issuing, decoding or verifying tokens.
#[derive(Debug, thiserror::Error)]
pub enum SsoError {
    /// No token string was supplied.
    #[error("No token provided")]
    MissingToken,

    /// The client token payload does not carry the application identifier claim.
    #[error("Token has no application id claim '{claim}'")]
    AppIdMissing {
        /// Name of the configured app id claim.
        claim: String,
    },

    /// No public key is registered for the claimed issuer.
    #[error("Public key not found for app_id: {app_id}")]
    PublicKeyNotFound {
        /// The application identifier the lookup was made for.
        app_id: String,
    },

    /// The server private key does not exist.
    #[error("Private key not found at {path}")]
    PrivateKeyNotFound {
        /// Where the key was expected.
        path: String,
    },

    /// Signature, structure or algorithm verification failed.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The expiration claim is in the past.
    #[error("Token expired at {expired_at}")]
    TokenExpired {
        /// The expiration timestamp carried by the token.
        expired_at: i64,
    },

    /// The token has already been consumed.
    #[error("Token has already been used")]
    BlacklistedToken,

    /// A claim required by the protocol is absent or empty.
    #[error("Missing required claim: {claim}")]
    MissingClaim {
        /// Name of the missing claim.
        claim: String,
    },

    /// A claim is present but has an unusable value.
    #[error("Invalid claim '{claim}': {message}")]
    InvalidClaim {
        /// Name of the offending claim.
        claim: String,
        /// Description of the problem.
        message: String,
    },

    /// Key material exists but cannot be used with the configured algorithm.
    #[error("Invalid key: {message}")]
    InvalidKey {
        /// Description of why the key is invalid.
        message: String,
    },

    /// Reading key material failed for a reason other than absence.
    #[error("Key store error: {message}")]
    KeyStore {
        /// Description of the I/O failure.
        message: String,
    },

    /// Signing a payload failed.
    #[error("Failed to encode token: {message}")]
    Encoding {
        /// Description of the encoding error.
        message: String,
    },

    /// The token configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// Boundary error for the client login flow.
    #[error("Failed to decode client application token")]
    InvalidClientToken {
        /// The application id, when it could be read from the token.
        app_id: Option<String>,
        /// The specific failure.
        #[source]
        source: Box<SsoError>,
    },

    /// Boundary error for the email verification flow.
    #[error("Failed to decode email verification token")]
    InvalidEmailToken {
        /// The specific failure.
        #[source]
        source: Box<SsoError>,
    },
}

impl SsoError {
    /// Creates a new `AppIdMissing` error.
    #[must_use]
    pub fn app_id_missing(claim: impl Into<String>) -> Self {
        Self::AppIdMissing {
            claim: claim.into(),
        }
    }

    /// Creates a new `PublicKeyNotFound` error.
    #[must_use]
    pub fn public_key_not_found(app_id: impl Into<String>) -> Self {
        Self::PublicKeyNotFound {
            app_id: app_id.into(),
        }
    }

    /// Creates a new `PrivateKeyNotFound` error.
    #[must_use]
    pub fn private_key_not_found(path: impl Into<String>) -> Self {
        Self::PrivateKeyNotFound { path: path.into() }
    }

    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `MissingClaim` error.
    #[must_use]
    pub fn missing_claim(claim: impl Into<String>) -> Self {
        Self::MissingClaim {
            claim: claim.into(),
        }
    }

    /// Creates a new `InvalidClaim` error.
    #[must_use]
    pub fn invalid_claim(claim: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidClaim {
            claim: claim.into(),
            message: message.into(),
        }
    }

    /// Creates a new `InvalidKey` error.
    #[must_use]
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Self::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates a new `KeyStore` error.
    #[must_use]
    pub fn key_store(message: impl Into<String>) -> Self {
        Self::KeyStore {
            message: message.into(),
        }
    }

    /// Creates a new `Encoding` error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wraps a specific error into the coarse client-token boundary error.
    ///
    /// Wrapping an already coarse error returns it unchanged.
    #[must_use]
    pub fn into_client_boundary(self, app_id: Option<String>) -> Self {
        match self {
            err @ (Self::InvalidClientToken { .. } | Self::InvalidEmailToken { .. }) => err,
            err => Self::InvalidClientToken {
                app_id,
                source: Box::new(err),
            },
        }
    }

    /// Wraps a specific error into the coarse email-token boundary error.
    #[must_use]
    pub fn into_email_boundary(self) -> Self {
        match self {
            err @ (Self::InvalidClientToken { .. } | Self::InvalidEmailToken { .. }) => err,
            err => Self::InvalidEmailToken {
                source: Box::new(err),
            },
        }
    }

    /// Returns a stable, machine-readable tag for this error.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing_token",
            Self::AppIdMissing { .. } => "app_id_missing",
            Self::PublicKeyNotFound { .. } => "public_key_not_found",
            Self::PrivateKeyNotFound { .. } => "private_key_not_found",
            Self::InvalidToken { .. } => "invalid_token",
            Self::TokenExpired { .. } => "token_expired",
            Self::BlacklistedToken => "blacklisted_token",
            Self::MissingClaim { .. } => "missing_claim",
            Self::InvalidClaim { .. } => "invalid_claim",
            Self::InvalidKey { .. } => "invalid_key",
            Self::KeyStore { .. } => "key_store",
            Self::Encoding { .. } => "encoding",
            Self::Configuration { .. } => "configuration",
            Self::InvalidClientToken { .. } => "invalid_client_token",
            Self::InvalidEmailToken { .. } => "invalid_email_token",
        }
    }

    /// Returns the token issuer this error refers to, if known.
    #[must_use]
    pub fn issuer(&self) -> Option<&str> {
        match self {
            Self::PublicKeyNotFound { app_id } => Some(app_id),
            Self::InvalidClientToken { app_id, source } => {
                app_id.as_deref().or_else(|| source.issuer())
            }
            Self::InvalidEmailToken { source } => source.issuer(),
            _ => None,
        }
    }

    /// Returns the innermost specific error, unwrapping boundary variants.
    #[must_use]
    pub fn root_cause(&self) -> &SsoError {
        match self {
            Self::InvalidClientToken { source, .. } | Self::InvalidEmailToken { source } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns `true` if this is a token validation error.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken { .. }
                | Self::TokenExpired { .. }
                | Self::BlacklistedToken
                | Self::MissingClaim { .. }
                | Self::InvalidClaim { .. }
                | Self::AppIdMissing { .. }
        )
    }

    /// Returns `true` if this is a key-related error.
    #[must_use]
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            Self::PublicKeyNotFound { .. }
                | Self::PrivateKeyNotFound { .. }
                | Self::InvalidKey { .. }
                | Self::KeyStore { .. }
        )
    }

    /// Returns `true` if the email flow may retry without replay protection.
    ///
    /// Missing input, bad signatures and infrastructure failures are never
    /// retried.
    #[must_use]
    pub fn is_fallback_eligible(&self) -> bool {
        self.is_validation_error() && !matches!(self, Self::InvalidToken { .. })
    }
}

//! Replay blacklist for single-use email-verification tokens.
//!
//! # Security Considerations
//!
//! - Membership check and recording must not be split across an await point
//!   in a way that lets the same token be consumed twice. [`mark_used`]
//!   is the atomic insert-if-absent used to record consumption.
//! - Client application tokens are not single-use and never enter the
//!   blacklist.
//!
//! [`mark_used`]: TokenBlacklist::mark_used

use async_trait::async_trait;
use dashmap::DashSet;

use crate::SsoResult;

/// Storage trait for consumed tokens.
///
/// # Example Implementation
///
/// ```ignore
/// use membrane_auth::storage::TokenBlacklist;
/// use membrane_auth::SsoResult;
///
/// struct RedisBlacklist { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl TokenBlacklist for RedisBlacklist {
///     async fn mark_used(&self, token: &str) -> SsoResult<bool> {
///         // SET key 1 NX
///     }
///     // ... other methods
/// }
/// ```
#[async_trait]
pub trait TokenBlacklist: Send + Sync {
    /// Returns `true` if the token has been consumed.
    async fn contains(&self, token: &str) -> SsoResult<bool>;

    /// Records a token as consumed. Adding an existing token is a no-op.
    async fn add(&self, token: &str) -> SsoResult<()>;

    /// Atomically records a token as consumed if it is not already.
    ///
    /// Returns `true` on first use and `false` if the token was already
    /// consumed (replay detected).
    async fn mark_used(&self, token: &str) -> SsoResult<bool>;

    /// Returns the number of consumed tokens.
    async fn len(&self) -> SsoResult<usize>;
}

/// Process-local blacklist. Entries live for the process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryBlacklist {
    tokens: DashSet<String>,
}

impl InMemoryBlacklist {
    /// Creates an empty blacklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenBlacklist for InMemoryBlacklist {
    async fn contains(&self, token: &str) -> SsoResult<bool> {
        Ok(self.tokens.contains(token))
    }

    async fn add(&self, token: &str) -> SsoResult<()> {
        self.tokens.insert(token.to_string());
        Ok(())
    }

    async fn mark_used(&self, token: &str) -> SsoResult<bool> {
        Ok(self.tokens.insert(token.to_string()))
    }

    async fn len(&self) -> SsoResult<usize> {
        Ok(self.tokens.len())
    }
}

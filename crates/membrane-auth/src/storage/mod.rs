//! Storage traits for token state.
//!
//! The only state this system keeps is the replay blacklist of consumed
//! email-verification tokens.

pub mod blacklist;

pub use blacklist::{InMemoryBlacklist, TokenBlacklist};

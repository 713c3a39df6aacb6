//! HTTP server for the Membrane single-sign-on handshake.
//!
//! A client application sends the user to `/login` with a token signed by its
//! own key. The server hands the user to the frontend, which posts the user's
//! address to `/email-verification`. The emailed link leads to
//! `/authenticate`, which consumes the link token and redirects back to the
//! client application.

pub mod config;
pub mod error;
pub mod handlers;
pub mod keygen;
pub mod observability;
pub mod server;
pub mod state;
pub mod validation;

pub use config::{AppConfig, ConfigError};
pub use error::ApiError;
pub use server::{MembraneServer, ServerBuilder, build_app};
pub use state::{AppState, EmailSettings};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use membrane_auth::{FileKeyStore, TokenConfig};
use membrane_notifications::SmtpSettings;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(String),

    #[error("config deserialize error: {0}")]
    Deserialize(String),

    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Claim names and signing algorithm shared by client and email tokens
    pub token: TokenConfig,
    #[serde(default)]
    pub keys: KeysConfig,
    #[serde(default)]
    pub sso: SsoConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of {valid_levels:?}"
            )));
        }
        self.token
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("token config error: {e}")))?;

        self.sso.frontend_url()?;
        self.sso.verification_endpoint()?;
        self.cors_origins()?;
        if ["/login", "/email-verification", "/health"]
            .contains(&self.sso.verification_path.as_str())
        {
            return Err(ConfigError::Invalid(format!(
                "sso.verification_path '{}' collides with a built-in route",
                self.sso.verification_path
            )));
        }

        if self.email.token_ttl.is_zero() {
            return Err(ConfigError::Invalid("email.token_ttl must be > 0".into()));
        }
        if self.email.sender.trim().is_empty() {
            return Err(ConfigError::Invalid("email.sender must not be empty".into()));
        }
        crate::validation::EmailValidator::new(&self.email.allowed_pattern)
            .map_err(|e| ConfigError::Invalid(format!("email.allowed_pattern: {e}")))?;
        if let Some(smtp) = &self.email.smtp
            && smtp.host.trim().is_empty()
        {
            return Err(ConfigError::Invalid("email.smtp.host must not be empty".into()));
        }
        Ok(())
    }

    /// Resolves `server.cors_allowed_origins` against the frontend URL.
    pub fn cors_origins(&self) -> Result<CorsOrigins, ConfigError> {
        let configured = &self.server.cors_allowed_origins;
        if configured.iter().any(|o| o.trim() == "*") {
            return Ok(CorsOrigins::Any);
        }
        if configured.is_empty() {
            let frontend = self.sso.frontend_url()?;
            return Ok(CorsOrigins::List(vec![web_origin(
                &frontend,
                "sso.frontend_url",
            )?]));
        }

        configured
            .iter()
            .map(|raw| {
                let url = Url::parse(raw.trim()).map_err(|e| {
                    ConfigError::Invalid(format!("server.cors_allowed_origins '{raw}': {e}"))
                })?;
                web_origin(&url, "server.cors_allowed_origins")
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CorsOrigins::List)
    }

    pub fn addr(&self) -> SocketAddr {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Renders the configuration as TOML with secrets masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut redacted = self.clone();
        if let Some(smtp) = redacted.email.smtp.as_mut()
            && smtp.password.is_some()
        {
            smtp.password = Some("********".into());
        }
        toml::to_string_pretty(&redacted).map_err(|e| ConfigError::Build(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Browser origins allowed by CORS. Empty means the origin of
    /// `sso.frontend_url`; `"*"` allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Resolved CORS origin policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    /// ASCII-serialized origins such as `https://sso.example`
    List(Vec<String>),
}

fn web_origin(url: &Url, field: &str) -> Result<String, ConfigError> {
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(ConfigError::Invalid(format!(
            "{field}: '{url}' has no web origin"
        )));
    }
    Ok(origin.ascii_serialization())
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

/// Key locations.
///
/// Client public keys live in `directory` as `<app_id>_public_key.pem`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeysConfig {
    #[serde(default = "default_keys_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_server_public_key")]
    pub server_public_key: PathBuf,
    #[serde(default = "default_server_private_key")]
    pub server_private_key: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            directory: default_keys_dir(),
            server_public_key: default_server_public_key(),
            server_private_key: default_server_private_key(),
        }
    }
}

impl KeysConfig {
    /// Layout rooted at `root`: `root/clients/` for client public keys and
    /// `root/server_{public,private}_key.pem` for the server pair.
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            directory: root.join("clients"),
            server_public_key: root.join("server_public_key.pem"),
            server_private_key: root.join("server_private_key.pem"),
        }
    }

    pub fn store(&self) -> FileKeyStore {
        FileKeyStore::new(
            &self.directory,
            &self.server_public_key,
            &self.server_private_key,
        )
    }
}

fn default_keys_dir() -> PathBuf {
    PathBuf::from("keys/clients")
}
fn default_server_public_key() -> PathBuf {
    PathBuf::from("keys/server_public_key.pem")
}
fn default_server_private_key() -> PathBuf {
    PathBuf::from("keys/server_private_key.pem")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoConfig {
    /// Frontend that collects the user's email address after `/login`
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    /// Externally reachable base URL of this server, used in emailed links
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_verification_path")]
    pub verification_path: String,
}

impl Default for SsoConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            public_base_url: default_public_base_url(),
            verification_path: default_verification_path(),
        }
    }
}

impl SsoConfig {
    pub fn frontend_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.frontend_url)
            .map_err(|e| ConfigError::Invalid(format!("sso.frontend_url: {e}")))
    }

    /// Absolute URL of the email verification endpoint.
    pub fn verification_endpoint(&self) -> Result<Url, ConfigError> {
        if !self.verification_path.starts_with('/') {
            return Err(ConfigError::Invalid(
                "sso.verification_path must start with '/'".into(),
            ));
        }
        let mut base = Url::parse(&self.public_base_url)
            .map_err(|e| ConfigError::Invalid(format!("sso.public_base_url: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ConfigError::Invalid(
                "sso.public_base_url must be an http(s) URL".into(),
            ));
        }
        let prefix = base.path().trim_end_matches('/').to_string();
        base.set_path(&format!("{prefix}{}", self.verification_path));
        Ok(base)
    }
}

fn default_frontend_url() -> String {
    "http://localhost:3000/".into()
}
fn default_public_base_url() -> String {
    "http://localhost:8080".into()
}
fn default_verification_path() -> String {
    "/authenticate".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_token_ttl", with = "humantime_serde")]
    pub token_ttl: Duration,
    /// Regex matched against the start of submitted addresses
    #[serde(default = "default_allowed_pattern")]
    pub allowed_pattern: String,
    #[serde(default = "default_sender")]
    pub sender: String,
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Without SMTP settings messages are logged and kept in memory
    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            token_ttl: default_token_ttl(),
            allowed_pattern: default_allowed_pattern(),
            sender: default_sender(),
            subject: default_subject(),
            smtp: None,
        }
    }
}

fn default_token_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}
fn default_allowed_pattern() -> String {
    r"[^@\s]+@[^@\s]+\.[^@\s]+$".into()
}
fn default_sender() -> String {
    "no-reply@localhost".into()
}
fn default_subject() -> String {
    "Your sign-in link".into()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file, relative to the working directory.
    pub const DEFAULT_CONFIG_PATH: &str = "membrane.toml";

    /// Prefix of environment overrides, e.g. `MEMBRANE__SERVER__PORT=9090`.
    pub const ENV_PREFIX: &str = "MEMBRANE";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| ConfigError::Build(e.to_string()))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }
}

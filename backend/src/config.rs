use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::mail::{MailerConfig, TlsMode};

pub use config::ConfigError;

/// Deserialize a config struct from process environment variables.
///
/// Variable names are matched case-insensitively against field names, so
/// `GMAIL_USER` fills `gmail_user`. Empty variables count as unset.
pub trait EnvConfig: Sized {
    fn from_env() -> Result<Self, ConfigError>;
    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError>;
}

impl<D> EnvConfig for D
where
    D: DeserializeOwned,
{
    fn from_env() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix).ignore_empty(true))
            .build()?
            .try_deserialize()
    }
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Relay login, also the fallback sender and recipient.
    #[serde(default)]
    pub gmail_user: Option<String>,
    #[serde(default)]
    pub gmail_app_password: Option<String>,

    #[serde(default)]
    pub to_email: Option<String>,
    #[serde(default)]
    pub from_email: Option<String>,

    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_tls: TlsMode,
    #[serde(default)]
    pub smtp_accept_invalid_certs: bool,

    /// Timeouts in seconds.
    #[serde(default = "default_timeout")]
    pub smtp_connection_timeout: u64,
    #[serde(default = "default_timeout")]
    pub smtp_greeting_timeout: u64,
    #[serde(default = "default_timeout")]
    pub smtp_socket_timeout: u64,

    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_port() -> u16 {
    3000
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_timeout() -> u64 {
    30
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_service_name() -> String {
    "Golde Luxe".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            gmail_user: None,
            gmail_app_password: None,
            to_email: None,
            from_email: None,
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_tls: TlsMode::default(),
            smtp_accept_invalid_certs: false,
            smtp_connection_timeout: default_timeout(),
            smtp_greeting_timeout: default_timeout(),
            smtp_socket_timeout: default_timeout(),
            static_dir: default_static_dir(),
            service_name: default_service_name(),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Where orders are delivered: `TO_EMAIL`, else `GMAIL_USER`.
    pub fn recipient(&self) -> Option<&str> {
        non_empty(&self.to_email).or_else(|| non_empty(&self.gmail_user))
    }

    /// Who orders are sent as: `FROM_EMAIL`, else `GMAIL_USER`.
    pub fn sender(&self) -> Option<&str> {
        non_empty(&self.from_email).or_else(|| non_empty(&self.gmail_user))
    }

    pub fn has_credentials(&self) -> bool {
        non_empty(&self.gmail_user).is_some() && non_empty(&self.gmail_app_password).is_some()
    }

    /// The static bundle root, if it holds an entry document.
    pub fn static_root(&self) -> Option<&Path> {
        self.static_dir
            .join("index.html")
            .is_file()
            .then_some(self.static_dir.as_path())
    }
}

impl From<&AppConfig> for MailerConfig {
    fn from(config: &AppConfig) -> Self {
        let credential = |value: &Option<String>| non_empty(value).map(str::to_string);

        MailerConfig {
            host: config.smtp_host.clone(),
            port: config.smtp_port,
            username: credential(&config.gmail_user),
            password: credential(&config.gmail_app_password),
            from: config.sender().map(str::to_string),
            tls: config.smtp_tls,
            accept_invalid_certs: config.smtp_accept_invalid_certs,
            connection_timeout: Duration::from_secs(config.smtp_connection_timeout),
            greeting_timeout: Duration::from_secs(config.smtp_greeting_timeout),
            socket_timeout: Duration::from_secs(config.smtp_socket_timeout),
        }
    }
}

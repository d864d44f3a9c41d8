use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_IMEI24_BASE_URL: &str = "https://www.imei24.com";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHAT_IDLE_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("IMEI_SOURCE must be \"scrape\" or \"api\", got {0:?}")]
    UnknownSource(String),
}

/// Which upstream answers IMEI lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// imei24.com HTML page.
    Scrape,
    /// JSON REST API with a bearer token.
    Api,
}

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub base_url: String,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub poll_timeout_secs: u64,
    pub source: SourceConfig,
    pub request_timeout: Duration,
    pub chat_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Builds the config from any variable lookup, e.g. a map in tests.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // blank values count as unset
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));
        let secs = |name: &'static str, default: u64| match var(name) {
            None => Ok(default),
            Some(v) => v
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { name, value: v }),
        };

        let bot_token = required("TELEGRAM_BOT_TOKEN")?;

        let kind = match var("IMEI_SOURCE").as_deref() {
            None | Some("scrape") => SourceKind::Scrape,
            Some("api") => SourceKind::Api,
            Some(other) => return Err(ConfigError::UnknownSource(other.to_string())),
        };

        let source = match kind {
            SourceKind::Scrape => SourceConfig {
                kind,
                base_url: var("IMEI24_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_IMEI24_BASE_URL.to_string()),
                api_token: None,
            },
            SourceKind::Api => SourceConfig {
                kind,
                base_url: required("IMEI_API_BASE_URL")?,
                api_token: Some(required("IMEI_API_TOKEN")?),
            },
        };

        Ok(Self {
            bot_token,
            telegram_api_url: var("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            poll_timeout_secs: secs("TELEGRAM_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?,
            source,
            request_timeout: Duration::from_secs(secs(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            chat_idle: Duration::from_secs(secs("CHAT_IDLE_SECS", DEFAULT_CHAT_IDLE_SECS)?),
        })
    }
}

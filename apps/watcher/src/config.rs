//! Application configuration.

use listing_alerts::{DispatchConfig, NotifierConfig};
use listing_calendar::CalendarConfig;
use listing_core::{CheckDate, DateParseError, WatchList};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};
use thiserror::Error;

/// Environment variable carrying the webhook access token. Set via the
/// environment or a `.env` file so the token stays out of the config file.
pub const TOKEN_ENV: &str = "LISTING_WEBHOOK_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Date(#[from] DateParseError),
}

/// Application configuration.
///
/// Every field has a working default, so a config file only needs the
/// fields it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Exchange sites whose announcements trigger alerts.
    pub watch_sites: Vec<String>,
    /// Sends allowed per event code before permanent suppression.
    pub repeat_cap: u32,
    /// Webhook endpoint.
    pub webhook_url: String,
    /// Webhook access token; the environment variable wins over this.
    pub webhook_token: String,
    /// Name shown at the top of every message.
    pub display_name: String,
    /// Fixed scan date (YYYY-MM-DD); empty scans the current UTC day.
    pub check_date: String,
    /// Send-history CSV location.
    pub ledger_path: PathBuf,
    /// Calendar endpoint.
    pub calendar_url: String,
    /// Language tag for calendar queries.
    pub calendar_lang: String,
    /// Pause between calendar page requests, in milliseconds.
    pub page_delay_ms: u64,
    /// Calendar request timeout, in seconds.
    pub fetch_timeout_secs: u64,
    /// Webhook request timeout, in seconds.
    pub notify_timeout_secs: u64,
    /// Logging level.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let calendar = CalendarConfig::default();
        let notifier = NotifierConfig::default();
        Self {
            watch_sites: vec!["binance".to_string(), "okx".to_string()],
            repeat_cap: DispatchConfig::default().repeat_cap,
            webhook_url: notifier.url,
            webhook_token: String::new(),
            display_name: notifier.display_name,
            check_date: String::new(),
            ledger_path: PathBuf::from("data/announce_record.csv"),
            calendar_url: calendar.base_url,
            calendar_lang: calendar.lang,
            page_delay_ms: calendar.page_delay.as_millis() as u64,
            fetch_timeout_secs: calendar.timeout.as_secs(),
            notify_timeout_secs: notifier.timeout.as_secs(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, then apply the token from the
    /// environment. A missing file means defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            AppConfig::default()
        };

        if let Ok(token) = env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.webhook_token = token;
            }
        }

        Ok(config)
    }

    /// Parsed scan date.
    pub fn check_date(&self) -> Result<CheckDate, ConfigError> {
        Ok(CheckDate::parse(&self.check_date)?)
    }

    pub fn watch_list(&self) -> WatchList {
        WatchList::new(&self.watch_sites)
    }
}

impl From<&AppConfig> for CalendarConfig {
    fn from(config: &AppConfig) -> Self {
        CalendarConfig {
            base_url: config.calendar_url.clone(),
            lang: config.calendar_lang.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
            timeout: Duration::from_secs(config.fetch_timeout_secs),
            ..Default::default()
        }
    }
}

impl From<&AppConfig> for NotifierConfig {
    fn from(config: &AppConfig) -> Self {
        NotifierConfig {
            url: config.webhook_url.clone(),
            token: config.webhook_token.clone(),
            display_name: config.display_name.clone(),
            timeout: Duration::from_secs(config.notify_timeout_secs),
            ..Default::default()
        }
    }
}

impl From<&AppConfig> for DispatchConfig {
    fn from(config: &AppConfig) -> Self {
        DispatchConfig {
            repeat_cap: config.repeat_cap,
        }
    }
}

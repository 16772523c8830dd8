//! Application configuration: JSON file, `.env` and environment overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::cycle::Cycle;
use crate::services::binance::DEFAULT_BASE_URL;
use crate::services::notify::telegram::DEFAULT_TELEGRAM_API;
use crate::services::notify::{TopicMap, DEFAULT_QUEUE_CAPACITY};
use crate::signals::engine::EngineSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {name}: {value}")]
    Env { name: String, value: String },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Deployment environment from `APP_ENV`, defaulting to development.
pub fn get_environment() -> String {
    env::var("APP_ENV")
        .ok()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "development".to_string())
}

pub fn get_config_path() -> String {
    env::var("CONFIG_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// First evaluation pass runs immediately instead of at the next boundary.
    Dev,
    #[default]
    Production,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleConfig {
    pub cycle: Cycle,
    /// Wait before each pass of this cycle, in minutes.
    #[serde(default)]
    pub delay_minutes: u64,
}

impl CycleConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_minutes * 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
    pub token: String,
    /// Group chat id receiving per-cycle topic posts.
    pub group: String,
    pub topics: TopicMap,
    pub api_base: String,
    pub queue_capacity: usize,
    /// Also deliver to individually subscribed recipients when a database is configured.
    pub subscribers: bool,
    pub request_timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            token: String::new(),
            group: String::new(),
            topics: TopicMap::default(),
            api_base: DEFAULT_TELEGRAM_API.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            subscribers: true,
            request_timeout_secs: 10,
        }
    }
}

impl NotifyConfig {
    /// Delivery needs the switch on and a bot token.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.token.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinanceConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Postgres connection string; persistence is off when absent.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    pub cycles: Vec<CycleConfig>,
    pub benchmark: EngineSettings,
    pub notify: NotifyConfig,
    pub binance: BinanceConfig,
    pub database: DatabaseConfig,
    pub http: HttpConfig,
    /// Extra age, in seconds, a last candle may have beyond one cycle.
    pub stale_grace_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Production,
            cycles: Vec::new(),
            benchmark: EngineSettings::default(),
            notify: NotifyConfig::default(),
            binance: BinanceConfig::default(),
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            stale_grace_secs: 600,
        }
    }
}

impl AppConfig {
    /// Load from `CONFIG_PATH` and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(get_config_path())?;
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse a JSON document; a leading UTF-8 byte order mark is ignored.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        Ok(serde_json::from_str(content)?)
    }

    /// Override selected values from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get("TELEGRAM_TOKEN") {
            self.notify.token = token;
        }
        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(url) = get("BINANCE_BASE_URL") {
            self.binance.base_url = url;
        }
        if let Some(port) = get("HTTP_PORT") {
            self.http.port = port.parse().map_err(|_| ConfigError::Env {
                name: "HTTP_PORT".to_string(),
                value: port.clone(),
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for entry in &self.cycles {
            if !seen.insert(entry.cycle) {
                return Err(ConfigError::Validation(format!(
                    "cycle {} is configured more than once",
                    entry.cycle
                )));
            }
        }

        let macd = &self.benchmark.macd;
        if macd.fast_period == 0 || macd.slow_period == 0 || macd.signal_period == 0 {
            return Err(ConfigError::Validation(
                "macd periods must be positive".to_string(),
            ));
        }

        let rsi = &self.benchmark.rsi;
        if rsi.period == 0 {
            return Err(ConfigError::Validation("rsi period must be positive".to_string()));
        }
        if rsi.oversold >= rsi.overbought {
            return Err(ConfigError::Validation(format!(
                "rsi oversold ({}) must be below overbought ({})",
                rsi.oversold, rsi.overbought
            )));
        }

        if self.benchmark.klines < 2 {
            return Err(ConfigError::Validation(
                "benchmark.klines must be at least 2".to_string(),
            ));
        }

        if self.notify.queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "notify.queue_capacity must be positive".to_string(),
            ));
        }
        if self.notify.is_active() && self.notify.group.trim().is_empty() {
            return Err(ConfigError::Validation(
                "notify.group is required when notifications are enabled".to_string(),
            ));
        }

        if self.binance.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("binance.base_url is empty".to_string()));
        }

        Ok(())
    }

    pub fn stale_grace(&self) -> Duration {
        Duration::from_secs(self.stale_grace_secs)
    }
}

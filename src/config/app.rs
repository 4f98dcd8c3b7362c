use std::time::Duration;
use anyhow::anyhow;
use reqwest::Url;
use crate::config::env::*;
use crate::polling::RetryPolicy;

const DEFAULT_EPIC_API_URL: &str = "https://epic-games-store-free-games.p.rapidapi.com/free?country=PL";
const DEFAULT_DATABASE_URL: &str = "sqlite://free_games.db";
const SUPPORTED_LOCALES: [&str; 2] = ["en", "pl"];
const DEFAULT_POLL_INTERVAL_MINUTES: u64 = 720;
const DEFAULT_DRAIN_SECS: u64 = 30;

#[derive(Clone)]
pub struct AppConfig {
    pub owner_id: u64,
    pub locale: String,
    pub metrics_port: u16,
    pub polling: PollingConfig,
}

#[derive(Clone, Debug)]
pub struct PollingConfig {
    pub interval: Duration,
    pub retry: RetryPolicy,
    pub drain_timeout: Duration,
    pub announce_upcoming: bool,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32
}

#[derive(Clone, Debug)]
pub struct EpicApiConfig {
    pub url: Url,
    pub host: String,
    pub api_key: String,
    pub timeout: Duration,
    pub monthly_quota: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let locale: String = get_env_value_or_default("BOT_LOCALE", "en".to_owned());
        let locale = if SUPPORTED_LOCALES.contains(&locale.as_str()) {
            locale
        } else {
            log::warn!("unsupported BOT_LOCALE '{locale}', falling back to 'en'");
            "en".to_owned()
        };
        Ok(Self {
            owner_id: get_env_mandatory_value("OWNER_ID")?,
            locale,
            metrics_port: get_env_value_or_default("METRICS_PORT", 8080),
            polling: PollingConfig::from_env(),
        })
    }
}

impl PollingConfig {
    pub fn from_env() -> Self {
        let defaults = RetryPolicy::default();
        let interval_mins: u64 = get_env_value_or_default("POLL_INTERVAL_MINUTES", DEFAULT_POLL_INTERVAL_MINUTES);
        let max_attempts: u32 = get_env_value_or_default("DELIVERY_MAX_ATTEMPTS", defaults.max_attempts);
        let base_backoff_ms: u64 = get_env_value_or_default("DELIVERY_BACKOFF_MS", defaults.base_backoff.as_millis() as u64);
        let max_backoff_ms: u64 = get_env_value_or_default("DELIVERY_MAX_BACKOFF_MS", defaults.max_backoff.as_millis() as u64);
        let drain_secs = get_env_value_or_default("SHUTDOWN_DRAIN_SECS", DEFAULT_DRAIN_SECS);
        Self {
            interval: Duration::from_secs(interval_mins.max(1) * 60),
            retry: RetryPolicy {
                max_attempts: max_attempts.max(1),
                base_backoff: Duration::from_millis(base_backoff_ms),
                max_backoff: Duration::from_millis(max_backoff_ms),
            },
            drain_timeout: Duration::from_secs(drain_secs),
            announce_upcoming: get_optional_env_value("ANNOUNCE_UPCOMING"),
        }
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: get_env_value_or_default("DATABASE_URL", DEFAULT_DATABASE_URL.to_owned()),
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 5)
        }
    }
}

impl EpicApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let url: Url = get_env_value_or_default("EPIC_API_URL", Url::parse(DEFAULT_EPIC_API_URL)?);
        let default_host = url.host_str()
            .ok_or_else(|| anyhow!("EPIC_API_URL has no host: {url}"))?
            .to_owned();
        Ok(Self {
            host: get_env_value_or_default("EPIC_API_HOST", default_host),
            api_key: get_env_mandatory_value("EPIC_API_KEY")?,
            timeout: Duration::from_secs(get_env_value_or_default("EPIC_API_TIMEOUT_SECS", 10)),
            monthly_quota: get_optional_env_value("EPIC_API_MONTHLY_QUOTA"),
            url,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_polling_defaults() {
        let config = PollingConfig::from_env();
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.interval, Duration::from_secs(DEFAULT_POLL_INTERVAL_MINUTES * 60));
        assert_eq!(config.drain_timeout, Duration::from_secs(DEFAULT_DRAIN_SECS));
    }
}

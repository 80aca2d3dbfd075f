use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::FixedOffset;

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub delivery: DeliveryConfig,
    pub telegram: TelegramSettings,
    pub leads: LeadSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let delivery = DeliveryConfig {
            bot_token: non_blank_var("TELEGRAM_BOT_TOKEN"),
            chat_id: non_blank_var("TELEGRAM_CHAT_ID"),
        };

        let api_base = non_blank_var("TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string());
        let timeout_secs = parse_var("TELEGRAM_TIMEOUT_SECS", 15u64)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "TELEGRAM_TIMEOUT_SECS",
            });
        }
        let max_retries = parse_var("TELEGRAM_MAX_RETRIES", 0u32)?;

        let offset_hours = parse_var("LEADS_UTC_OFFSET_HOURS", 3i32)?;
        let utc_offset = offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ConfigError::InvalidUtcOffset(offset_hours))?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            delivery,
            telegram: TelegramSettings {
                api_base: api_base.trim_end_matches('/').to_string(),
                request_timeout: Duration::from_secs(timeout_secs),
                max_retries,
            },
            leads: LeadSettings { utc_offset },
        })
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match non_blank_var(name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name }),
        None => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Credentials for the lead notification channel.
///
/// Both values are optional at load time so the service can still start and
/// answer health probes; the dispatcher refuses to deliver until both exist.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DeliveryConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

impl DeliveryConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: Some(bot_token.into()),
            chat_id: Some(chat_id.into()),
        }
    }

    /// Resolve into usable credentials, or name the variables that are missing.
    pub fn credentials(&self) -> Result<DeliveryCredentials, Vec<&'static str>> {
        let token = self.bot_token.as_deref().map(str::trim).unwrap_or("");
        let chat = self.chat_id.as_deref().map(str::trim).unwrap_or("");

        let mut missing = Vec::new();
        if token.is_empty() {
            missing.push("TELEGRAM_BOT_TOKEN");
        }
        if chat.is_empty() {
            missing.push("TELEGRAM_CHAT_ID");
        }
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(DeliveryCredentials {
            bot_token: token.to_string(),
            chat_id: chat.to_string(),
        })
    }
}

impl fmt::Debug for DeliveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Complete credentials handed to a notifier for a single delivery.
#[derive(Clone, PartialEq, Eq)]
pub struct DeliveryCredentials {
    pub bot_token: String,
    pub chat_id: String,
}

impl fmt::Debug for DeliveryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryCredentials")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

/// Transport settings for the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramSettings {
    pub api_base: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_TELEGRAM_API_BASE.to_string(),
            request_timeout: Duration::from_secs(15),
            max_retries: 0,
        }
    }
}

/// Presentation settings for lead notifications.
#[derive(Debug, Clone, Copy)]
pub struct LeadSettings {
    pub utc_offset: FixedOffset,
}

impl Default for LeadSettings {
    fn default() -> Self {
        Self {
            utc_offset: FixedOffset::east_opt(3 * 3600).expect("+03:00 is a valid offset"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str },
    InvalidUtcOffset(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name } => {
                write!(f, "{name} must be a valid positive number")
            }
            ConfigError::InvalidUtcOffset(hours) => {
                write!(f, "LEADS_UTC_OFFSET_HOURS={hours} is outside -23..=23")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidUtcOffset(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "TELEGRAM_BOT_TOKEN",
            "TELEGRAM_CHAT_ID",
            "TELEGRAM_API_BASE",
            "TELEGRAM_TIMEOUT_SECS",
            "TELEGRAM_MAX_RETRIES",
            "LEADS_UTC_OFFSET_HOURS",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telegram.api_base, DEFAULT_TELEGRAM_API_BASE);
        assert_eq!(config.telegram.request_timeout, Duration::from_secs(15));
        assert_eq!(config.telegram.max_retries, 0);
        assert_eq!(config.leads.utc_offset.local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn missing_credentials_do_not_fail_startup() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("TELEGRAM_BOT_TOKEN", "123:abc");
        env::set_var("TELEGRAM_CHAT_ID", "   ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.delivery.bot_token.as_deref(), Some("123:abc"));
        assert!(config.delivery.chat_id.is_none());
        assert_eq!(
            config.delivery.credentials().unwrap_err(),
            vec!["TELEGRAM_CHAT_ID"]
        );
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("TELEGRAM_TIMEOUT_SECS", "soon");
        let err = AppConfig::load().expect_err("timeout must be numeric");
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                name: "TELEGRAM_TIMEOUT_SECS"
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_utc_offset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        for raw in ["1000000", "-1000000", "24"] {
            reset_env();
            env::set_var("LEADS_UTC_OFFSET_HOURS", raw);
            let err = AppConfig::load().expect_err("offset outside a day is invalid");
            assert!(matches!(err, ConfigError::InvalidUtcOffset(_)));
        }

        reset_env();
        env::set_var("LEADS_UTC_OFFSET_HOURS", "-5");
        let config = AppConfig::load().expect("negative offsets load");
        assert_eq!(config.leads.utc_offset.local_minus_utc(), -5 * 3600);
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn credentials_report_every_missing_variable() {
        let missing = DeliveryConfig::default()
            .credentials()
            .expect_err("empty config is incomplete");
        assert_eq!(missing, vec!["TELEGRAM_BOT_TOKEN", "TELEGRAM_CHAT_ID"]);

        let debug = format!("{:?}", DeliveryConfig::new("secret-token", "42"));
        assert!(!debug.contains("secret-token"));
    }
}

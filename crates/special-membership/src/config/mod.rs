use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::membership::PublishMode;

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
    pub credit_score: CreditScoreConfig,
    pub membership: MembershipConfig,
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

        let base_url = http_base_url(
            env::var("CREDIT_SCORE_SERVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8089".to_string()),
        )?;
        let timeout_ms = env::var("CREDIT_SCORE_TIMEOUT_MS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<u64>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let minimum_credit_score = env::var("MEMBERSHIP_MINIMUM_CREDIT_SCORE")
            .unwrap_or_else(|_| "700".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidThreshold)?;
        let publish_mode = PublishMode::parse(
            &env::var("MEMBERSHIP_PUBLISH_MODE").unwrap_or_else(|_| "detached".to_string()),
        )
        .ok_or(ConfigError::InvalidPublishMode)?;
        let event_bus_capacity = env::var("EVENT_BUS_CAPACITY")
            .unwrap_or_else(|_| "1024".to_string())
            .parse::<usize>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidBusCapacity)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            credit_score: CreditScoreConfig {
                base_url,
                timeout: Duration::from_millis(timeout_ms),
            },
            membership: MembershipConfig {
                minimum_credit_score,
                publish_mode,
                event_bus_capacity,
            },
        })
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

/// Location of the third-party credit-score provider.
#[derive(Debug, Clone)]
pub struct CreditScoreConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl CreditScoreConfig {
    /// Replace the provider base URL, applying the same check as [`AppConfig::load`].
    pub fn set_base_url(&mut self, value: impl Into<String>) -> Result<(), ConfigError> {
        self.base_url = http_base_url(value.into())?;
        Ok(())
    }
}

fn http_base_url(value: String) -> Result<String, ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(value)
    } else {
        Err(ConfigError::InvalidCreditScoreUrl(value))
    }
}

/// Eligibility threshold and outcome publication settings.
#[derive(Debug, Clone)]
pub struct MembershipConfig {
    pub minimum_credit_score: u16,
    pub publish_mode: PublishMode,
    pub event_bus_capacity: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCreditScoreUrl(String),
    InvalidTimeout,
    InvalidThreshold,
    InvalidPublishMode,
    InvalidBusCapacity,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCreditScoreUrl(value) => write!(
                f,
                "CREDIT_SCORE_SERVICE_URL must be an http(s) URL, got '{value}'"
            ),
            ConfigError::InvalidTimeout => {
                write!(f, "CREDIT_SCORE_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::InvalidThreshold => {
                write!(f, "MEMBERSHIP_MINIMUM_CREDIT_SCORE must be a valid u16")
            }
            ConfigError::InvalidPublishMode => write!(
                f,
                "MEMBERSHIP_PUBLISH_MODE must be either 'detached' or 'awaited'"
            ),
            ConfigError::InvalidBusCapacity => {
                write!(f, "EVENT_BUS_CAPACITY must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

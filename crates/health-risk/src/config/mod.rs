//! Environment-driven settings for the assessment service.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file. The deployment stage picks defaults: production has no placeholder
//! report sender and logs without colour, tests log quietly.

use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

/// Deployment stage, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    fn default_log_level(&self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Test => "warn",
            Self::Production => "info",
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Development),
            "test" | "ci" => Ok(Self::Test),
            "prod" | "production" => Ok(Self::Production),
            _ => Err(ConfigError::UnknownEnvironment(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub notifications: NotificationConfig,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match var("APP_ENV") {
            Some(raw) => raw.parse()?,
            None => AppEnvironment::Development,
        };

        let host = var("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match var("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidPort)?,
            None => 3000,
        };

        let telemetry = TelemetryConfig {
            log_level: var("APP_LOG_LEVEL")
                .unwrap_or_else(|| environment.default_log_level().to_string()),
            ansi: environment == AppEnvironment::Development,
        };

        let sender = match (var("APP_REPORT_SENDER"), environment) {
            (Some(sender), _) => sender,
            (None, AppEnvironment::Production) => return Err(ConfigError::MissingSender),
            (None, _) => DEFAULT_REPORT_SENDER.to_string(),
        };
        if !sender.contains('@') {
            return Err(ConfigError::InvalidSender(sender));
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry,
            notifications: NotificationConfig { sender },
        })
    }
}

/// Sender used outside production when `APP_REPORT_SENDER` is unset.
pub const DEFAULT_REPORT_SENDER: &str = "reports@health-risk.local";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` is accepted as a shorthand for the IPv4 loopback.
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

/// Log filter and output styling.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// From-address on report notification e-mails.
    pub sender: String,
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownEnvironment(String),
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    MissingSender,
    InvalidSender(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownEnvironment(value) => write!(
                f,
                "APP_ENV '{value}' is not one of development, test or production"
            ),
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::MissingSender => {
                write!(f, "APP_REPORT_SENDER is required in production")
            }
            ConfigError::InvalidSender(value) => {
                write!(f, "APP_REPORT_SENDER must be an e-mail address (got '{value}')")
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

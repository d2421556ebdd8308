//! Application configuration module
//! Loads settings from the environment (and `.env`) and validates them.

use crate::gateway::deposit::{DEFAULT_CHECKOUT_URL, DEFAULT_CURRENCY, DEFAULT_REDIRECT_URL};
use crate::gateway::{DepositSettings, ZotaConfig};
use crate::services::deposit_flow::DEFAULT_MAX_INSERT_ATTEMPTS;
use crate::workers::PollerConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub poller: PollerConfig,
    pub logging: LoggingConfig,
    pub flow: FlowConfig,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Zota merchant credentials and deposit defaults
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub secret_key: String,
    pub endpoint_id: String,
    pub merchant_id: String,
    pub base_url: String,
    pub currency: String,
    pub redirect_url: String,
    pub checkout_url: String,
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Plain,
}

#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub max_insert_attempts: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_insert_attempts: DEFAULT_MAX_INSERT_ATTEMPTS,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenv::dotenv().ok();

        Ok(AppConfig {
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig::from_env()?,
            poller: poller_from_env()?,
            logging: LoggingConfig::from_env()?,
            flow: FlowConfig::from_env()?,
        })
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.gateway.validate()?;
        self.logging.validate()?;
        validate_poller(&self.poller)?;
        self.flow.validate()?;

        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(ServerConfig {
            host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("SERVER_PORT", 8080)?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidValue(
                "SERVER_PORT cannot be 0".to_string(),
            ));
        }

        if self.host.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SERVER_HOST cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("SERVER_HOST/SERVER_PORT".to_string()))
    }

    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.is_empty() || self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(GatewayConfig {
            secret_key: required_var("ZOTA_SECRET_KEY")?,
            endpoint_id: required_var("ZOTA_ENDPOINT_ID")?,
            merchant_id: required_var("ZOTA_MERCHANT_ID")?,
            base_url: required_var("ZOTA_BASE_URL")?,
            currency: env::var("ZOTA_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.to_string()),
            redirect_url: env::var("ZOTA_REDIRECT_URL")
                .unwrap_or_else(|_| DEFAULT_REDIRECT_URL.to_string()),
            checkout_url: env::var("ZOTA_CHECKOUT_URL")
                .unwrap_or_else(|_| DEFAULT_CHECKOUT_URL.to_string()),
            timeout_secs: parse_var("ZOTA_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("ZOTA_SECRET_KEY", &self.secret_key),
            ("ZOTA_ENDPOINT_ID", &self.endpoint_id),
            ("ZOTA_MERCHANT_ID", &self.merchant_id),
            ("ZOTA_CURRENCY", &self.currency),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!("{} cannot be empty", name)));
            }
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue(
                "ZOTA_BASE_URL must be a valid URL".to_string(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("ZOTA_TIMEOUT_SECS".to_string()));
        }

        Ok(())
    }

    pub fn zota_config(&self) -> ZotaConfig {
        ZotaConfig {
            secret_key: self.secret_key.clone(),
            endpoint_id: self.endpoint_id.clone(),
            merchant_id: self.merchant_id.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn deposit_settings(&self) -> DepositSettings {
        DepositSettings {
            currency: self.currency.clone(),
            redirect_url: self.redirect_url.clone(),
            checkout_url: self.checkout_url.clone(),
            ..DepositSettings::new(self.endpoint_id.clone(), self.secret_key.clone())
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "plain".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Plain,
            },
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let valid_levels = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];
        if !valid_levels.contains(&self.level.to_uppercase().as_str()) {
            return Err(ConfigError::InvalidValue("LOG_LEVEL".to_string()));
        }

        Ok(())
    }
}

impl FlowConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(FlowConfig {
            max_insert_attempts: parse_var(
                "ORDER_INSERT_MAX_ATTEMPTS",
                DEFAULT_MAX_INSERT_ATTEMPTS,
            )?,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_insert_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "ORDER_INSERT_MAX_ATTEMPTS".to_string(),
            ));
        }
        Ok(())
    }
}

fn poller_from_env() -> Result<PollerConfig, ConfigError> {
    let defaults = PollerConfig::default();
    Ok(PollerConfig {
        poll_interval: Duration::from_secs(parse_var(
            "ORDER_POLL_INTERVAL_SECONDS",
            defaults.poll_interval.as_secs(),
        )?),
        max_attempts: parse_var("ORDER_POLL_MAX_ATTEMPTS", defaults.max_attempts)?,
        shutdown_timeout: Duration::from_secs(parse_var(
            "ORDER_POLL_SHUTDOWN_TIMEOUT_SECONDS",
            defaults.shutdown_timeout.as_secs(),
        )?),
    })
}

fn validate_poller(config: &PollerConfig) -> Result<(), ConfigError> {
    if config.poll_interval.is_zero() {
        return Err(ConfigError::InvalidValue(
            "ORDER_POLL_INTERVAL_SECONDS".to_string(),
        ));
    }
    if config.max_attempts == 0 {
        return Err(ConfigError::InvalidValue(
            "ORDER_POLL_MAX_ATTEMPTS".to_string(),
        ));
    }
    Ok(())
}

fn required_var(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVariable(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for configuration: {0}")]
    InvalidValue(String),
}

//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::query::PaginationConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Environment variable selecting the deployment environment
pub const ENV_VAR: &str = "RESTBASE_ENV";

/// Environment variable overriding the log filter
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

/// Deployment environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Develop,
    Test,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "develop" | "development" | "dev" => Ok(Environment::Develop),
            "test" | "testing" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(ConfigError::InvalidValue {
                field: "environment".to_string(),
                value: other.to_string(),
                message: "expected develop, test or production".to_string(),
            }),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `restbase=debug,tower_http=info`
    #[serde(default = "default_filter")]
    #[validate(length(min = 1))]
    pub filter: String,

    /// Emit one record per served request
    #[serde(default = "default_api_log")]
    pub api_log: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_api_log() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            api_log: default_api_log(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,

    #[serde(default = "default_bind_address")]
    #[validate(length(min = 1))]
    pub bind_address: String,

    #[serde(default)]
    #[validate(nested)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    #[validate(nested)]
    pub logging: LoggingConfig,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            bind_address: default_bind_address(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path.display(), e),
        })?;
        Ok(Self::parse(&content, Some(path.display().to_string()))?)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(Self::parse(yaml, None)?)
    }

    fn parse(yaml: &str, file: Option<String>) -> std::result::Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file,
            message: e.to_string(),
        })?;
        config.check()?;
        Ok(config)
    }

    /// Apply `RESTBASE_ENV` and `RUST_LOG` from the process environment
    pub fn apply_env_overrides(self) -> Result<Self> {
        let env = std::env::var(ENV_VAR).ok();
        let filter = std::env::var(LOG_FILTER_VAR).ok();
        self.apply_env_overrides_from(env.as_deref(), filter.as_deref())
    }

    /// Apply explicit override values; `None` leaves a setting unchanged
    pub fn apply_env_overrides_from(
        mut self,
        environment: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Self> {
        if let Some(environment) = environment {
            self.environment = environment.parse()?;
        }
        if let Some(filter) = filter.filter(|f| !f.trim().is_empty()) {
            self.logging.filter = filter.to_string();
        }
        self.check()?;
        Ok(self)
    }

    fn check(&self) -> std::result::Result<(), ConfigError> {
        self.validate().map_err(|errors| ConfigError::InvalidValue {
            field: "config".to_string(),
            value: String::new(),
            message: errors.to_string(),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Install the global `tracing` subscriber with the configured filter
///
/// Fails if the filter does not parse or a subscriber is already installed.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&logging.filter)
        .with_context(|| format!("invalid log filter {:?}", logging.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}

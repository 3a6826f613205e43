use anyhow::{Result, anyhow};
use std::env;
use tracing::{info, warn};

use crate::{log_system_event, log_validation};

/// Complete client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Where the quiz REST API lives and how to authenticate against it
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    /// Raw `Cookie` header value of an already logged-in session
    pub session_cookie: Option<String>,
}

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        log_system_event!(config, "Loading client configuration from environment variables");

        let config = Config {
            api: ApiConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            api_base_url = %self.api.base_url,
            session_cookie = ?self.api.session_cookie.as_deref().map(mask_sensitive_data),
            log_level = %self.logging.level,
            log_directory = %self.logging.log_directory,
            "Configuration summary"
        );
    }

    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow!(
                "QUIZ_API_BASE_URL must start with 'http://' or 'https://', got '{}'",
                self.api.base_url
            ));
        }

        if self.api.session_cookie.is_none() {
            warn!("QUIZ_SESSION_COOKIE is not set - the API will likely redirect to its login page");
        }

        let level = self.logging.level.to_lowercase();
        let base_level = level.split(',').next().unwrap_or_default();
        if !["trace", "debug", "info", "warn", "error"].contains(&base_level) {
            warn!("Unusual log level '{}', the env filter may fall back to defaults", self.logging.level);
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self> {
        let base_url = env::var("QUIZ_API_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if base_url.is_empty() {
            return Err(anyhow!("QUIZ_API_BASE_URL must not be empty"));
        }

        let session_cookie = env::var("QUIZ_SESSION_COOKIE")
            .ok()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(ApiConfig {
            base_url,
            session_cookie,
        })
    }
}

impl LoggingConfig {
    /// Read only the logging settings, so the subscriber can be installed before anything else logs
    pub fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,school_quiz=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY")
            .unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

/// Mask sensitive data in configuration for safe logging
pub fn mask_sensitive_data(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}

//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub generation: GenerationConfig,
    pub media: MediaConfig,
    #[serde(default)]
    pub repository: RepositoryConfig,
    #[serde(default)]
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Image generation backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_size")]
    pub size: String,
    #[serde(default = "default_generation_timeout")]
    pub timeout_ms: u64,
}

fn default_size() -> String {
    "1024x1024".to_string()
}

fn default_generation_timeout() -> u64 {
    60000
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    #[serde(default = "default_storage_path")]
    pub base_path: String,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_upload_timeout")]
    pub timeout_ms: u64,
}

fn default_storage_path() -> String {
    "./generated_images".to_string()
}

fn default_url_prefix() -> String {
    "http://localhost:8080/images".to_string()
}

fn default_upload_timeout() -> u64 {
    30000
}

impl MediaConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Post repository configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RepositoryConfig {
    /// Append-only journal file; posts are kept in memory only when unset
    #[serde(default)]
    pub journal_path: Option<String>,
}

/// Client-side search coordination
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_debounce() -> u64 {
    500
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("generation.size", default_size())?
            .set_default("generation.timeout_ms", default_generation_timeout() as i64)?
            .set_default("media.base_path", default_storage_path())?
            .set_default("media.url_prefix", default_url_prefix())?
            .set_default("media.timeout_ms", default_upload_timeout() as i64)?
            .set_default("search.debounce_ms", default_debounce() as i64)?
            .set_default("logging.level", default_log_level())?
            .set_default("logging.format", default_log_format())?
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with PROMPT_GALLERY_)
            .add_source(
                Environment::with_prefix("PROMPT_GALLERY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration.
    ///
    /// Missing credentials are a startup failure, never a per-request error.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(config_error("Server port cannot be 0"));
        }

        if self.generation.endpoint.trim().is_empty() {
            return Err(config_error("generation.endpoint must be set"));
        }
        if reqwest::Url::parse(&self.generation.endpoint).is_err() {
            return Err(config_error(format!(
                "generation.endpoint '{}' is not a valid URL",
                self.generation.endpoint
            )));
        }
        if self.generation.api_key.trim().is_empty() {
            return Err(config_error("generation.api_key must be set"));
        }
        if self.generation.timeout_ms == 0 {
            return Err(config_error("generation.timeout_ms must be positive"));
        }

        if self.media.base_path.trim().is_empty() {
            return Err(config_error("media.base_path must be set"));
        }
        if self.media.url_prefix.trim().is_empty() {
            return Err(config_error("media.url_prefix must be set"));
        }
        if self.media.timeout_ms == 0 {
            return Err(config_error("media.timeout_ms must be positive"));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err(config_error(format!(
                "logging.format '{}' must be 'json' or 'pretty'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> AppError {
    AppError::Config(config::ConfigError::Message(message.into()))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            generation: GenerationConfig {
                endpoint: String::new(),
                api_key: String::new(),
                model: None,
                size: default_size(),
                timeout_ms: default_generation_timeout(),
            },
            media: MediaConfig {
                base_path: default_storage_path(),
                url_prefix: default_url_prefix(),
                timeout_ms: default_upload_timeout(),
            },
            repository: RepositoryConfig::default(),
            search: SearchConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::lpn::DEFAULT_INITIAL_SEQUENCE;
use crate::services::expiration::DEFAULT_WARNING_DAYS;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_DATA_FILE: &str = "smartrack-data.json";
const DEFAULT_OPERATOR: &str = "Operador 01";
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Snapshot file holding zones, racks, inventory and the LPN counter
    #[serde(default = "default_data_file")]
    #[validate(length(min = 1))]
    pub data_file: String,

    /// Days before expiration at which stock is flagged
    #[serde(default = "default_expiry_warning_days")]
    #[validate(range(min = 0, max = 365))]
    pub expiry_warning_days: i64,

    /// Last issued LPN correlative for a fresh warehouse
    #[serde(default = "default_initial_sequence")]
    pub initial_sequence: u64,

    /// Name recorded as `received_by` when none is given
    #[serde(default = "default_operator")]
    #[validate(length(min = 1, max = 100))]
    pub operator: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            data_file: default_data_file(),
            expiry_warning_days: default_expiry_warning_days(),
            initial_sequence: default_initial_sequence(),
            operator: default_operator(),
        }
    }
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_file)
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_data_file() -> String {
    DEFAULT_DATA_FILE.to_string()
}

fn default_expiry_warning_days() -> i64 {
    DEFAULT_WARNING_DAYS
}

fn default_initial_sequence() -> u64 {
    DEFAULT_INITIAL_SEQUENCE
}

fn default_operator() -> String {
    DEFAULT_OPERATOR.to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("smartrack_wms={level},smartrack={level}");
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let builder = fmt()
        .with_env_filter(EnvFilter::new(filter_directive))
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().try_init();
    } else {
        let _ = builder.try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR))
}

/// Same as [`load_config`] with an explicit config directory.
pub fn load_config_from(config_dir: &Path) -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !config_dir.exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            config_dir.display()
        );
    }

    let config = Config::builder()
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("data_file", DEFAULT_DATA_FILE)?
        .set_default("expiry_warning_days", DEFAULT_WARNING_DAYS)?
        .set_default("initial_sequence", DEFAULT_INITIAL_SEQUENCE as i64)?
        .set_default("operator", DEFAULT_OPERATOR)?
        .add_source(
            File::with_name(&format!("{}/default", config_dir.display())).required(false),
        )
        .add_source(
            File::with_name(&format!("{}/{}", config_dir.display(), run_env)).required(false),
        )
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.validate()?;
    Ok(app_config)
}

//! Configuration Loader
//!
//! Environment-aware configuration loading. Layers, lowest precedence first: compiled
//! defaults, `account-lifecycle.toml`, `account-lifecycle.<env>.toml`, then
//! `ACCOUNT_LIFECYCLE__SECTION__FIELD` environment variables.

use super::error::{ConfigResult, ConfigurationError};
use super::EngineConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const BASE_FILE_NAME: &str = "account-lifecycle";
const ENV_PREFIX: &str = "ACCOUNT_LIFECYCLE";
const CONFIG_DIR_VAR: &str = "ACCOUNT_LIFECYCLE_CONFIG_DIR";

/// Loaded, validated engine configuration
#[derive(Debug)]
pub struct ConfigManager {
    config: EngineConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load from the default directory for the detected environment
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load from `config_dir` (or the default directory) for the detected environment
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load with an explicit environment name, leaving process variables alone
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading engine configuration"
        );

        let config = Self::load_layers(&config_directory, environment)?;
        config.validate()?;
        debug!(config = ?config, "Configuration layers merged");

        info!(
            environment = %environment,
            max_attempts = config.retry.max_attempts,
            threshold = config.provisioning.threshold,
            product_type = %config.provisioning.product_type,
            "⚙️ Engine configuration loaded"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn load_layers(config_directory: &Path, environment: &str) -> ConfigResult<EngineConfig> {
        let base = config_directory.join(format!("{BASE_FILE_NAME}.toml"));
        let overlay = config_directory.join(format!("{BASE_FILE_NAME}.{environment}.toml"));

        Config::builder()
            .add_source(File::from(base).format(FileFormat::Toml).required(false))
            .add_source(File::from(overlay).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|layered| layered.try_deserialize::<EngineConfig>())
            .map_err(|e| ConfigurationError::load_error(environment, e.to_string()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Directory the layer files were read from
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Configuration as JSON, for diagnostics output
    pub fn debug_config(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.environment,
            "config_directory": self.config_directory.display().to_string(),
            "config": self.config,
        })
    }

    /// Detect current environment: `ACCOUNT_LIFECYCLE_ENV` || `APP_ENV` || 'development'
    pub fn detect_environment() -> String {
        env::var("ACCOUNT_LIFECYCLE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var(CONFIG_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}

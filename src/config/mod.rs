//! # Configuration
//!
//! Two layers of configuration drive the engine:
//!
//! - [`EngineConfig`]: static tuning (retry policy, gate threshold, logging format) loaded
//!   by [`ConfigManager`] from compiled defaults, optional TOML files and
//!   `ACCOUNT_LIFECYCLE__`-prefixed environment variables.
//! - [`RuntimeParameters`]: deployment identities (queue, product, downstream functions,
//!   shared accounts) resolved once per invocation from the parameter store.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use account_lifecycle::config::ConfigManager;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! println!("gate threshold: {}", manager.config().provisioning.threshold);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod parameters;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;
pub use parameters::RuntimeParameters;

use crate::constants::provider::CONTROL_TOWER_ACCOUNT_PRODUCT_TYPE;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub retry: RetryConfig,
    pub provisioning: ProvisioningConfig,
    pub logging: LoggingConfig,
}

/// Throttle retry tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total calls, including the first
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_jitter_ms: u64,
    /// Fixed jitter seed for reproducible backoff
    pub jitter_seed: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 60_000,
            max_jitter_ms: 1_000,
            jitter_seed: None,
        }
    }
}

/// Concurrency gate and product catalog tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Maximum in-flight provisioning operations before dispatch pauses
    pub threshold: u32,
    pub product_type: String,
    pub search_page_size: u32,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            threshold: 1,
            product_type: CONTROL_TOWER_ACCOUNT_PRODUCT_TYPE.to_string(),
            search_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.max_attempts",
                "0",
                "at least one attempt is required",
            ));
        }

        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigurationError::invalid_value(
                "retry.base_delay_ms",
                self.retry.base_delay_ms.to_string(),
                format!(
                    "must not exceed retry.max_delay_ms ({})",
                    self.retry.max_delay_ms
                ),
            ));
        }

        if self.provisioning.threshold == 0 {
            return Err(ConfigurationError::invalid_value(
                "provisioning.threshold",
                "0",
                "a zero threshold would never dispatch",
            ));
        }

        if self.provisioning.product_type.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "provisioning.product_type",
                "",
                "product type must not be empty",
            ));
        }

        if self.provisioning.search_page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "provisioning.search_page_size",
                "0",
                "page size must be positive",
            ));
        }

        Ok(())
    }
}

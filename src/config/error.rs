//! Configuration Error Types
//!
//! Errors raised while loading the file/env engine configuration or resolving
//! runtime parameters from the parameter store.

use crate::providers::ProviderError;
use thiserror::Error;

/// Configuration-related errors with detailed context
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing required parameter in the parameter store
    #[error("Missing required parameter '{key}'")]
    MissingParameter { key: String },

    /// Invalid configuration value
    #[error("Invalid value '{value}' for field '{field}': {context}")]
    InvalidValue {
        field: String,
        value: String,
        context: String,
    },

    /// Layered file/env loading failed
    #[error("Failed to load configuration for environment '{environment}': {error}")]
    LoadError { environment: String, error: String },

    /// Parameter store lookup failed for a reason other than absence
    #[error("Parameter store lookup failed for '{key}': {source}")]
    ParameterLookup {
        key: String,
        #[source]
        source: ProviderError,
    },
}

impl ConfigurationError {
    pub fn missing_parameter(key: impl Into<String>) -> Self {
        Self::MissingParameter { key: key.into() }
    }

    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            context: context.into(),
        }
    }

    pub fn load_error(environment: impl Into<String>, error: impl Into<String>) -> Self {
        Self::LoadError {
            environment: environment.into(),
            error: error.into(),
        }
    }

    pub fn parameter_lookup(key: impl Into<String>, source: ProviderError) -> Self {
        Self::ParameterLookup {
            key: key.into(),
            source,
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigurationError>;

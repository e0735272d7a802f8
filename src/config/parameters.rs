//! Runtime parameters resolved from the parameter store once per invocation.

use super::error::{ConfigResult, ConfigurationError};
use crate::constants::parameters;
use crate::providers::ParameterStore;
use tracing::debug;

/// Deployment identities the engine needs at runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeParameters {
    pub request_queue_name: String,
    pub account_factory_product_name: String,
    pub request_table_name: String,
    pub cleanup_function_name: String,
    pub provisioning_framework_function_name: String,
    pub ct_management_account_id: String,
    pub audit_account_id: String,
    pub log_archive_account_id: String,
    /// Overrides the configured gate threshold when set
    pub provisioning_threshold: Option<u32>,
}

impl RuntimeParameters {
    pub async fn load(store: &dyn ParameterStore) -> ConfigResult<Self> {
        let parameters = Self {
            request_queue_name: required(store, parameters::ACCOUNT_REQUEST_QUEUE).await?,
            account_factory_product_name: required(store, parameters::ACCOUNT_FACTORY_PRODUCT_NAME)
                .await?,
            request_table_name: required(store, parameters::ACCOUNT_REQUEST_TABLE).await?,
            cleanup_function_name: required(store, parameters::CLEANUP_RESOURCES_FUNCTION).await?,
            provisioning_framework_function_name: required(
                store,
                parameters::PROVISIONING_FRAMEWORK_FUNCTION,
            )
            .await?,
            ct_management_account_id: required(store, parameters::CT_MANAGEMENT_ACCOUNT_ID).await?,
            audit_account_id: required(store, parameters::AUDIT_ACCOUNT_ID).await?,
            log_archive_account_id: required(store, parameters::LOG_ARCHIVE_ACCOUNT_ID).await?,
            provisioning_threshold: threshold_override(store).await?,
        };

        debug!(
            queue = %parameters.request_queue_name,
            product = %parameters.account_factory_product_name,
            threshold_override = ?parameters.provisioning_threshold,
            "Runtime parameters resolved"
        );
        Ok(parameters)
    }

    /// Ids of the shared infrastructure accounts
    pub fn shared_account_ids(&self) -> [&str; 3] {
        [
            &self.log_archive_account_id,
            &self.audit_account_id,
            &self.ct_management_account_id,
        ]
    }
}

async fn required(store: &dyn ParameterStore, key: &str) -> ConfigResult<String> {
    match store.get_parameter(key).await {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(ConfigurationError::missing_parameter(key)),
        Err(e) if e.is_not_found() => Err(ConfigurationError::missing_parameter(key)),
        Err(e) => Err(ConfigurationError::parameter_lookup(key, e)),
    }
}

async fn threshold_override(store: &dyn ParameterStore) -> ConfigResult<Option<u32>> {
    let key = parameters::PROVISIONING_THRESHOLD;
    let raw = match store.get_parameter(key).await {
        Ok(raw) => raw,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(ConfigurationError::parameter_lookup(key, e)),
    };

    match raw.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(ConfigurationError::invalid_value(
            key,
            raw,
            "threshold must be a positive integer",
        )),
        Ok(threshold) => Ok(Some(threshold)),
    }
}

//! Create and update calls against the account-vending product.
//!
//! Every call carries a freshly generated idempotency token. Writes go through
//! [`ThrottleRetry`] like reads do; each retry attempt mints its own token.

use crate::config::ProvisioningConfig;
use crate::constants::provider::ACCOUNT_EMAIL_OUTPUT_KEY;
use crate::error::ResolutionError;
use crate::models::{
    emails_are_equal, ControlTowerParameters, ProductDescription, ProvisionProductRequest,
    ProvisionedProductSummary, ProvisioningRecord, UpdateProvisionedProductRequest,
};
use crate::providers::{collect_pages, ServiceCatalogApi};
use crate::resilience::ThrottleRetry;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Product and artifact a provisioning call targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningTarget {
    pub product_id: String,
    pub provisioning_artifact_id: String,
}

#[derive(Debug, Clone)]
pub struct ProductProvisioner {
    catalog: Arc<dyn ServiceCatalogApi>,
    retry: Arc<ThrottleRetry>,
    product_name: String,
    product_type: String,
    page_size: u32,
}

impl ProductProvisioner {
    pub fn new(
        catalog: Arc<dyn ServiceCatalogApi>,
        retry: Arc<ThrottleRetry>,
        product_name: impl Into<String>,
        config: &ProvisioningConfig,
    ) -> Self {
        Self {
            catalog,
            retry,
            product_name: product_name.into(),
            product_type: config.product_type.clone(),
            page_size: config.search_page_size,
        }
    }

    /// Account-factory product and its first active provisioning artifact
    pub async fn resolve_target(&self) -> Result<ProvisioningTarget, ResolutionError> {
        let product = self.describe_product().await?;
        let artifact_id = self.first_active_artifact(&product).await?;
        Ok(ProvisioningTarget {
            product_id: product.product_id,
            provisioning_artifact_id: artifact_id,
        })
    }

    pub async fn create(
        &self,
        parameters: &ControlTowerParameters,
    ) -> Result<ProvisioningRecord, ResolutionError> {
        let target = self.resolve_target().await?;

        let record = self
            .retry
            .call("provision_product", || {
                let request = ProvisionProductRequest {
                    product_id: target.product_id.clone(),
                    provisioning_artifact_id: target.provisioning_artifact_id.clone(),
                    provisioned_product_name: parameters.account_name.clone(),
                    provisioning_parameters: parameters.provisioning_parameters(),
                    provision_token: Uuid::new_v4().to_string(),
                };
                self.catalog.provision_product(request)
            })
            .await?;

        info!(
            account_email = %parameters.account_email,
            record_id = %record.record_id,
            provisioned_product_id = %record.provisioned_product_id,
            "🚀 Account provisioning started"
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        parameters: &ControlTowerParameters,
    ) -> Result<ProvisioningRecord, ResolutionError> {
        let product = self.describe_product().await?;
        let existing = self
            .find_provisioned_product(&parameters.account_email)
            .await?
            .ok_or_else(|| ResolutionError::provisioned_product_not_found(&parameters.account_email))?;

        let artifact_id = if self
            .artifact_is_active(&product.product_id, &existing.provisioning_artifact_id)
            .await?
        {
            existing.provisioning_artifact_id.clone()
        } else {
            self.first_active_artifact(&product).await?
        };

        let record = self
            .retry
            .call("update_provisioned_product", || {
                let request = UpdateProvisionedProductRequest {
                    provisioned_product_id: existing.id.clone(),
                    product_id: product.product_id.clone(),
                    provisioning_artifact_id: artifact_id.clone(),
                    provisioning_parameters: parameters.provisioning_parameters(),
                    update_token: Uuid::new_v4().to_string(),
                };
                self.catalog.update_provisioned_product(request)
            })
            .await?;

        info!(
            account_email = %parameters.account_email,
            record_id = %record.record_id,
            provisioned_product_id = %record.provisioned_product_id,
            provisioning_artifact_id = %artifact_id,
            "🔄 Account update started"
        );
        Ok(record)
    }

    async fn describe_product(&self) -> Result<ProductDescription, ResolutionError> {
        Ok(self
            .retry
            .call("describe_product_by_name", || {
                self.catalog.describe_product_by_name(&self.product_name)
            })
            .await?)
    }

    async fn first_active_artifact(&self, product: &ProductDescription) -> Result<String, ResolutionError> {
        for artifact_id in &product.artifact_ids {
            if self.artifact_is_active(&product.product_id, artifact_id).await? {
                return Ok(artifact_id.clone());
            }
        }
        Err(ResolutionError::NoActiveArtifact {
            product_id: product.product_id.clone(),
        })
    }

    async fn artifact_is_active(&self, product_id: &str, artifact_id: &str) -> Result<bool, ResolutionError> {
        let artifact = self
            .retry
            .call("describe_provisioning_artifact", || {
                self.catalog.describe_provisioning_artifact(product_id, artifact_id)
            })
            .await?;
        Ok(artifact.active)
    }

    /// Provisioned product of the tracked type vended for `account_email`
    pub async fn find_provisioned_product(
        &self,
        account_email: &str,
    ) -> Result<Option<ProvisionedProductSummary>, ResolutionError> {
        let catalog = self.catalog.as_ref();
        let page_size = self.page_size;
        let products = collect_pages(&self.retry, "scan_provisioned_products", |token| {
            catalog.scan_provisioned_products(page_size, token)
        })
        .await?;

        for product in products
            .into_iter()
            .filter(|product| product.product_type == self.product_type)
        {
            let email = match &product.account_email {
                Some(email) => Some(email.clone()),
                None => self
                    .retry
                    .call("get_provisioned_product_outputs", || {
                        catalog.get_provisioned_product_outputs(&product.id)
                    })
                    .await?
                    .get(ACCOUNT_EMAIL_OUTPUT_KEY)
                    .cloned(),
            };

            if email.is_some_and(|email| emails_are_equal(&email, account_email)) {
                debug!(
                    account_email = %account_email,
                    provisioned_product_id = %product.id,
                    "Located provisioned product"
                );
                return Ok(Some(product));
            }
        }
        Ok(None)
    }
}

//! # Provisioning Status Oracle
//!
//! Answers "does a healthy vended account already exist for this email?" by paging
//! through the catalog's provisioned products of the tracked type.
//!
//! A product counts only when its status is `AVAILABLE` or `TAINTED` and it carries a
//! last-successful-provisioning record. An unhealthy product is treated as absent so
//! the request is re-provisioned rather than silently skipped.

use crate::config::ProvisioningConfig;
use crate::constants::provider::ACCOUNT_EMAIL_OUTPUT_KEY;
use crate::models::{emails_are_equal, ProvisionedProductSummary};
use crate::providers::{ProviderResult, ServiceCatalogApi};
use crate::resilience::ThrottleRetry;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ProvisioningStatusOracle {
    catalog: Arc<dyn ServiceCatalogApi>,
    retry: Arc<ThrottleRetry>,
    product_type: String,
    page_size: u32,
}

impl ProvisioningStatusOracle {
    pub fn new(
        catalog: Arc<dyn ServiceCatalogApi>,
        retry: Arc<ThrottleRetry>,
        config: &ProvisioningConfig,
    ) -> Self {
        Self {
            catalog,
            retry,
            product_type: config.product_type.clone(),
            page_size: config.search_page_size,
        }
    }

    /// Whether a healthy provisioned product exists for `account_email`
    ///
    /// Stops at the first match; otherwise reads every page.
    pub async fn exists(&self, account_email: &str) -> ProviderResult<bool> {
        let mut next_token: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let page = self
                .retry
                .call("search_provisioned_products", || {
                    self.catalog.search_provisioned_products(
                        &self.product_type,
                        self.page_size,
                        next_token.clone(),
                    )
                })
                .await?;
            pages += 1;

            for product in page.items.iter().filter(|product| product.is_healthy()) {
                if let Some(email) = self.product_email(product).await? {
                    if emails_are_equal(&email, account_email) {
                        info!(
                            account_email = %account_email,
                            provisioned_product_id = %product.id,
                            status = %product.status,
                            "Healthy provisioned product found"
                        );
                        return Ok(true);
                    }
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(account_email = %account_email, pages, "No healthy provisioned product");
        Ok(false)
    }

    async fn product_email(&self, product: &ProvisionedProductSummary) -> ProviderResult<Option<String>> {
        if let Some(email) = &product.account_email {
            return Ok(Some(email.clone()));
        }

        let outputs = self
            .retry
            .call("get_provisioned_product_outputs", || {
                self.catalog.get_provisioned_product_outputs(&product.id)
            })
            .await?;
        Ok(outputs.get(ACCOUNT_EMAIL_OUTPUT_KEY).cloned())
    }
}

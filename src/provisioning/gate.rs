//! Concurrency gate: counts in-flight provisioning operations before work is dequeued.
//!
//! The count is an optimistic read of the provider's state, not a lock. Two dispatchers
//! racing the gate can both pass; the provider's own admission control serializes them.

use crate::config::ProvisioningConfig;
use crate::providers::{collect_pages, ProviderResult, ServiceCatalogApi};
use crate::resilience::ThrottleRetry;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ConcurrencyGate {
    catalog: Arc<dyn ServiceCatalogApi>,
    retry: Arc<ThrottleRetry>,
    product_type: String,
    page_size: u32,
}

impl ConcurrencyGate {
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

    /// Provisioned products of the tracked type still being worked on by the provider
    pub async fn in_flight_count(&self) -> ProviderResult<usize> {
        let catalog = self.catalog.as_ref();
        let page_size = self.page_size;
        let products = collect_pages(&self.retry, "scan_provisioned_products", |token| {
            catalog.scan_provisioned_products(page_size, token)
        })
        .await?;

        Ok(products
            .iter()
            .filter(|product| product.product_type == self.product_type)
            .filter(|product| product.is_in_progress())
            .count())
    }

    /// Count in-flight operations and compare against `threshold`
    pub async fn check(&self, threshold: u32) -> ProviderResult<GateCheck> {
        let check = GateCheck {
            in_flight: self.in_flight_count().await?,
            threshold,
        };

        if check.is_closed() {
            warn!(
                in_flight = check.in_flight,
                threshold, "🛡️ Provisioning threshold reached, dispatch paused"
            );
        } else {
            debug!(in_flight = check.in_flight, threshold, "Provisioning gate open");
        }
        Ok(check)
    }

    /// True iff the in-flight count is at or above `threshold`
    pub async fn provisioning_threshold_reached(&self, threshold: u32) -> ProviderResult<bool> {
        Ok(self.check(threshold).await?.is_closed())
    }
}

/// One reading of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateCheck {
    pub in_flight: usize,
    pub threshold: u32,
}

impl GateCheck {
    pub fn is_closed(&self) -> bool {
        self.in_flight >= self.threshold as usize
    }
}

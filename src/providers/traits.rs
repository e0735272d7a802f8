//! # Provider Traits
//!
//! Narrow async interfaces to the external collaborators: the organization provider,
//! the account-vending product catalog, the parameter store and the downstream
//! function invoker. Implementations are expected to surface rate limiting as
//! [`ProviderError::Throttled`](super::ProviderError::Throttled) and to leave
//! resubmission to [`ThrottleRetry`](crate::resilience::ThrottleRetry).

use super::errors::ProviderResult;
use super::pagination::Page;
use crate::models::{
    OrgAccount, OrgRoot, OuNode, ParentRef, ProductDescription, ProvisionProductRequest,
    ProvisionedProductSummary, ProvisioningArtifact, ProvisioningRecord,
    UpdateProvisionedProductRequest,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;

/// Organization hierarchy provider
#[async_trait]
pub trait OrganizationsApi: Send + Sync + fmt::Debug {
    async fn list_roots(&self) -> ProviderResult<Vec<OrgRoot>>;

    async fn list_organizational_units_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<OuNode>>;

    async fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<OrgAccount>>;

    /// Every account in the organization
    async fn list_accounts(&self, next_token: Option<String>) -> ProviderResult<Page<OrgAccount>>;

    async fn describe_account(&self, account_id: &str) -> ProviderResult<OrgAccount>;

    async fn list_parents(&self, child_id: &str) -> ProviderResult<Vec<ParentRef>>;
}

/// Account-vending product catalog
#[async_trait]
pub trait ServiceCatalogApi: Send + Sync + fmt::Debug {
    /// Provisioned products of one product type
    async fn search_provisioned_products(
        &self,
        product_type: &str,
        page_size: u32,
        next_token: Option<String>,
    ) -> ProviderResult<Page<ProvisionedProductSummary>>;

    /// Every provisioned product regardless of type
    async fn scan_provisioned_products(
        &self,
        page_size: u32,
        next_token: Option<String>,
    ) -> ProviderResult<Page<ProvisionedProductSummary>>;

    /// Named outputs of a provisioned product (e.g. `AccountEmail`)
    async fn get_provisioned_product_outputs(
        &self,
        provisioned_product_id: &str,
    ) -> ProviderResult<BTreeMap<String, String>>;

    async fn describe_product_by_name(&self, name: &str) -> ProviderResult<ProductDescription>;

    async fn describe_provisioning_artifact(
        &self,
        product_id: &str,
        artifact_id: &str,
    ) -> ProviderResult<ProvisioningArtifact>;

    async fn provision_product(
        &self,
        request: ProvisionProductRequest,
    ) -> ProviderResult<ProvisioningRecord>;

    async fn update_provisioned_product(
        &self,
        request: UpdateProvisionedProductRequest,
    ) -> ProviderResult<ProvisioningRecord>;
}

/// Key-value configuration store
#[async_trait]
pub trait ParameterStore: Send + Sync + fmt::Debug {
    /// Fails with `NotFound` when the key is absent
    async fn get_parameter(&self, key: &str) -> ProviderResult<String>;
}

/// Downstream function invoker (cleanup, provisioning framework)
#[async_trait]
pub trait DownstreamInvoker: Send + Sync + fmt::Debug {
    async fn invoke(&self, function_name: &str, payload: serde_json::Value) -> ProviderResult<()>;
}

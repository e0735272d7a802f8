//! # In-Memory Providers
//!
//! Deterministic in-memory implementations of the provider traits for testing and
//! local development.
//!
//! ## Features
//!
//! - **Throttle injection**: `throttle_next(operation, times)` makes the next `times`
//!   calls of an operation fail with a rate-limit error
//! - **Call accounting**: `call_count(operation)` counts every attempt, throttled or not
//! - **Write recording**: every create/update/invoke is kept for assertions
//! - **Pagination**: listings are split into pages of a configurable size

use super::errors::{ProviderError, ProviderResult};
use super::pagination::Page;
use super::traits::{DownstreamInvoker, OrganizationsApi, ParameterStore, ServiceCatalogApi};
use crate::constants::{ct_parameters, provider};
use crate::models::{
    OrgAccount, OrgRoot, OuNode, ParentKind, ParentRef, ProductDescription, ProductStatus,
    ProvisionProductRequest, ProvisionedProductSummary, ProvisioningArtifact, ProvisioningRecord,
    UpdateProvisionedProductRequest,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

const DEFAULT_PAGE_SIZE: usize = 20;

/// Pending throttles and attempt counts per operation
#[derive(Debug, Default)]
struct CallLedger {
    pending_throttles: HashMap<String, u32>,
    calls: HashMap<String, u32>,
}

impl CallLedger {
    fn attempt(&mut self, operation: &str) -> ProviderResult<()> {
        *self.calls.entry(operation.to_string()).or_default() += 1;
        match self.pending_throttles.get_mut(operation) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(ProviderError::throttled(operation, "Rate exceeded"))
            }
            _ => Ok(()),
        }
    }

    fn throttle_next(&mut self, operation: &str, times: u32) {
        self.pending_throttles.insert(operation.to_string(), times);
    }

    fn count(&self, operation: &str) -> u32 {
        self.calls.get(operation).copied().unwrap_or(0)
    }
}

/// Split a listing into pages addressed by numeric offset tokens
fn paginate<T: Clone>(
    operation: &str,
    items: &[T],
    next_token: Option<String>,
    page_size: usize,
) -> ProviderResult<Page<T>> {
    let start = match next_token {
        Some(token) => token.parse::<usize>().map_err(|_| {
            ProviderError::rejected(operation, format!("invalid pagination token '{token}'"))
        })?,
        None => 0,
    };
    let end = (start + page_size.max(1)).min(items.len());
    let page = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    let next_token = (end < items.len()).then(|| end.to_string());
    Ok(Page::new(page, next_token))
}

#[derive(Debug, Default)]
struct OrganizationState {
    roots: Vec<OrgRoot>,
    ous: Vec<OuNode>,
    /// Accounts with the id of the root or OU that holds them
    accounts: Vec<(OrgAccount, String)>,
    ledger: CallLedger,
}

/// In-memory organization hierarchy
#[derive(Debug)]
pub struct InMemoryOrganizations {
    state: Mutex<OrganizationState>,
    page_size: usize,
}

impl Default for InMemoryOrganizations {
    fn default() -> Self {
        Self {
            state: Mutex::new(OrganizationState::default()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl InMemoryOrganizations {
    /// Organization with a single root
    pub fn with_root(root_id: impl Into<String>) -> Self {
        let provider = Self::default();
        provider.add_root(root_id, "Root");
        provider
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn add_root(&self, id: impl Into<String>, name: impl Into<String>) {
        self.state.lock().roots.push(OrgRoot::new(id, name));
    }

    pub fn add_ou(&self, id: impl Into<String>, name: impl Into<String>, parent_id: impl Into<String>) {
        self.state
            .lock()
            .ous
            .push(OuNode::new(id, name, Some(parent_id)));
    }

    pub fn add_account(
        &self,
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        parent_id: impl Into<String>,
    ) {
        self.state
            .lock()
            .accounts
            .push((OrgAccount::new(id, name, email), parent_id.into()));
    }

    pub fn throttle_next(&self, operation: &str, times: u32) {
        self.state.lock().ledger.throttle_next(operation, times);
    }

    pub fn call_count(&self, operation: &str) -> u32 {
        self.state.lock().ledger.count(operation)
    }
}

#[async_trait]
impl OrganizationsApi for InMemoryOrganizations {
    async fn list_roots(&self) -> ProviderResult<Vec<OrgRoot>> {
        let mut state = self.state.lock();
        state.ledger.attempt("list_roots")?;
        Ok(state.roots.clone())
    }

    async fn list_organizational_units_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<OuNode>> {
        let operation = "list_organizational_units_for_parent";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        let children: Vec<OuNode> = state
            .ous
            .iter()
            .filter(|ou| ou.parent_id.as_deref() == Some(parent_id))
            .cloned()
            .collect();
        paginate(operation, &children, next_token, self.page_size)
    }

    async fn list_accounts_for_parent(
        &self,
        parent_id: &str,
        next_token: Option<String>,
    ) -> ProviderResult<Page<OrgAccount>> {
        let operation = "list_accounts_for_parent";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        let children: Vec<OrgAccount> = state
            .accounts
            .iter()
            .filter(|(_, parent)| parent == parent_id)
            .map(|(account, _)| account.clone())
            .collect();
        paginate(operation, &children, next_token, self.page_size)
    }

    async fn list_accounts(&self, next_token: Option<String>) -> ProviderResult<Page<OrgAccount>> {
        let mut state = self.state.lock();
        state.ledger.attempt("list_accounts")?;
        let accounts: Vec<OrgAccount> = state.accounts.iter().map(|(a, _)| a.clone()).collect();
        paginate("list_accounts", &accounts, next_token, self.page_size)
    }

    async fn describe_account(&self, account_id: &str) -> ProviderResult<OrgAccount> {
        let mut state = self.state.lock();
        state.ledger.attempt("describe_account")?;
        state
            .accounts
            .iter()
            .find(|(account, _)| account.id == account_id)
            .map(|(account, _)| account.clone())
            .ok_or_else(|| ProviderError::not_found("describe_account", account_id))
    }

    async fn list_parents(&self, child_id: &str) -> ProviderResult<Vec<ParentRef>> {
        let mut state = self.state.lock();
        state.ledger.attempt("list_parents")?;

        let parent_id = state
            .accounts
            .iter()
            .find(|(account, _)| account.id == child_id)
            .map(|(_, parent)| parent.clone())
            .or_else(|| {
                state
                    .ous
                    .iter()
                    .find(|ou| ou.id == child_id)
                    .and_then(|ou| ou.parent_id.clone())
            })
            .ok_or_else(|| ProviderError::not_found("list_parents", child_id))?;

        let kind = if state.roots.iter().any(|root| root.id == parent_id) {
            ParentKind::Root
        } else {
            ParentKind::OrganizationalUnit
        };
        Ok(vec![ParentRef {
            id: parent_id,
            kind,
        }])
    }
}

#[derive(Debug, Default)]
struct CatalogState {
    provisioned: Vec<ProvisionedProductSummary>,
    outputs: HashMap<String, BTreeMap<String, String>>,
    products: Vec<ProductDescription>,
    artifacts: HashMap<(String, String), ProvisioningArtifact>,
    provision_requests: Vec<ProvisionProductRequest>,
    update_requests: Vec<UpdateProvisionedProductRequest>,
    reject_writes: Option<String>,
    ledger: CallLedger,
}

/// In-memory account-vending product catalog
///
/// Accepted creates and updates leave the affected product `UNDER_CHANGE`, so a
/// subsequent gate check sees the operation in flight.
#[derive(Debug)]
pub struct InMemoryServiceCatalog {
    state: Mutex<CatalogState>,
    product_type: String,
}

impl Default for InMemoryServiceCatalog {
    fn default() -> Self {
        Self {
            state: Mutex::new(CatalogState::default()),
            product_type: provider::CONTROL_TOWER_ACCOUNT_PRODUCT_TYPE.to_string(),
        }
    }
}

impl InMemoryServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog product and its artifacts
    pub fn add_product(
        &self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        artifacts: Vec<ProvisioningArtifact>,
    ) {
        let product_id = product_id.into();
        let mut state = self.state.lock();
        state.products.push(ProductDescription {
            product_id: product_id.clone(),
            name: name.into(),
            artifact_ids: artifacts.iter().map(|a| a.id.clone()).collect(),
        });
        for artifact in artifacts {
            state
                .artifacts
                .insert((product_id.clone(), artifact.id.clone()), artifact);
        }
    }

    pub fn add_provisioned_product(&self, product: ProvisionedProductSummary) {
        self.state.lock().provisioned.push(product);
    }

    pub fn set_outputs(&self, provisioned_product_id: &str, outputs: BTreeMap<String, String>) {
        self.state
            .lock()
            .outputs
            .insert(provisioned_product_id.to_string(), outputs);
    }

    /// Make every create/update fail with a provider rejection
    pub fn reject_writes(&self, message: impl Into<String>) {
        self.state.lock().reject_writes = Some(message.into());
    }

    pub fn provision_requests(&self) -> Vec<ProvisionProductRequest> {
        self.state.lock().provision_requests.clone()
    }

    pub fn update_requests(&self) -> Vec<UpdateProvisionedProductRequest> {
        self.state.lock().update_requests.clone()
    }

    /// Accepted creates plus accepted updates
    pub fn write_count(&self) -> usize {
        let state = self.state.lock();
        state.provision_requests.len() + state.update_requests.len()
    }

    pub fn provisioned_products(&self) -> Vec<ProvisionedProductSummary> {
        self.state.lock().provisioned.clone()
    }

    pub fn throttle_next(&self, operation: &str, times: u32) {
        self.state.lock().ledger.throttle_next(operation, times);
    }

    pub fn call_count(&self, operation: &str) -> u32 {
        self.state.lock().ledger.count(operation)
    }
}

#[async_trait]
impl ServiceCatalogApi for InMemoryServiceCatalog {
    async fn search_provisioned_products(
        &self,
        product_type: &str,
        page_size: u32,
        next_token: Option<String>,
    ) -> ProviderResult<Page<ProvisionedProductSummary>> {
        let operation = "search_provisioned_products";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        let matching: Vec<ProvisionedProductSummary> = state
            .provisioned
            .iter()
            .filter(|product| product.product_type == product_type)
            .cloned()
            .collect();
        paginate(operation, &matching, next_token, page_size as usize)
    }

    async fn scan_provisioned_products(
        &self,
        page_size: u32,
        next_token: Option<String>,
    ) -> ProviderResult<Page<ProvisionedProductSummary>> {
        let operation = "scan_provisioned_products";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        paginate(operation, &state.provisioned, next_token, page_size as usize)
    }

    async fn get_provisioned_product_outputs(
        &self,
        provisioned_product_id: &str,
    ) -> ProviderResult<BTreeMap<String, String>> {
        let mut state = self.state.lock();
        state.ledger.attempt("get_provisioned_product_outputs")?;
        Ok(state
            .outputs
            .get(provisioned_product_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn describe_product_by_name(&self, name: &str) -> ProviderResult<ProductDescription> {
        let mut state = self.state.lock();
        state.ledger.attempt("describe_product_by_name")?;
        state
            .products
            .iter()
            .find(|product| product.name == name)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("describe_product_by_name", name))
    }

    async fn describe_provisioning_artifact(
        &self,
        product_id: &str,
        artifact_id: &str,
    ) -> ProviderResult<ProvisioningArtifact> {
        let mut state = self.state.lock();
        state.ledger.attempt("describe_provisioning_artifact")?;
        state
            .artifacts
            .get(&(product_id.to_string(), artifact_id.to_string()))
            .cloned()
            .ok_or_else(|| ProviderError::not_found("describe_provisioning_artifact", artifact_id))
    }

    async fn provision_product(
        &self,
        request: ProvisionProductRequest,
    ) -> ProviderResult<ProvisioningRecord> {
        let operation = "provision_product";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        if let Some(message) = &state.reject_writes {
            return Err(ProviderError::rejected(operation, message.clone()));
        }

        let sequence = state.provision_requests.len() + 1;
        let provisioned_product_id = format!("pp-created-{sequence}");
        let account_email = request
            .provisioning_parameters
            .iter()
            .find(|p| p.key == ct_parameters::ACCOUNT_EMAIL)
            .map(|p| p.value.clone());

        state.provisioned.push(ProvisionedProductSummary {
            id: provisioned_product_id.clone(),
            name: request.provisioned_product_name.clone(),
            product_id: request.product_id.clone(),
            product_type: self.product_type.clone(),
            status: ProductStatus::UnderChange,
            provisioning_artifact_id: request.provisioning_artifact_id.clone(),
            last_successful_provisioning_record_id: None,
            account_email,
        });
        state.provision_requests.push(request);

        Ok(ProvisioningRecord {
            record_id: format!("rec-create-{sequence}"),
            provisioned_product_id,
        })
    }

    async fn update_provisioned_product(
        &self,
        request: UpdateProvisionedProductRequest,
    ) -> ProviderResult<ProvisioningRecord> {
        let operation = "update_provisioned_product";
        let mut state = self.state.lock();
        state.ledger.attempt(operation)?;
        if let Some(message) = &state.reject_writes {
            return Err(ProviderError::rejected(operation, message.clone()));
        }

        let product = state
            .provisioned
            .iter_mut()
            .find(|product| product.id == request.provisioned_product_id)
            .ok_or_else(|| ProviderError::not_found(operation, &request.provisioned_product_id))?;
        product.status = ProductStatus::UnderChange;
        product.provisioning_artifact_id = request.provisioning_artifact_id.clone();

        let sequence = state.update_requests.len() + 1;
        let provisioned_product_id = request.provisioned_product_id.clone();
        state.update_requests.push(request);

        Ok(ProvisioningRecord {
            record_id: format!("rec-update-{sequence}"),
            provisioned_product_id,
        })
    }
}

/// In-memory parameter store
#[derive(Debug, Default)]
pub struct InMemoryParameterStore {
    parameters: Mutex<HashMap<String, String>>,
}

impl InMemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parameter(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.lock().insert(key.into(), value.into());
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    async fn get_parameter(&self, key: &str) -> ProviderResult<String> {
        self.parameters
            .lock()
            .get(key)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("get_parameter", key))
    }
}

/// Invoker that records every payload it receives
#[derive(Debug, Default)]
pub struct RecordingInvoker {
    invocations: Mutex<Vec<(String, serde_json::Value)>>,
}

impl RecordingInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(&self) -> Vec<(String, serde_json::Value)> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl DownstreamInvoker for RecordingInvoker {
    async fn invoke(&self, function_name: &str, payload: serde_json::Value) -> ProviderResult<()> {
        self.invocations
            .lock()
            .push((function_name.to_string(), payload));
        Ok(())
    }
}

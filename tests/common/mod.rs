//! Shared fixtures for integration tests.

#![allow(dead_code)]

pub mod builders;
pub mod strategies;

pub use builders::*;

use account_lifecycle::config::EngineConfig;
use account_lifecycle::constants::parameters;
use account_lifecycle::context::{DispatchContext, InvocationContext, ProviderSet};
use account_lifecycle::messaging::InMemoryWorkQueue;
use account_lifecycle::models::ProvisioningArtifact;
use account_lifecycle::providers::{
    InMemoryOrganizations, InMemoryParameterStore, InMemoryServiceCatalog, RecordingInvoker,
};
use account_lifecycle::resilience::{RecordingSleeper, RetryPolicy, ThrottleRetry};
use std::sync::Arc;

pub const QUEUE: &str = "aft-account-request.fifo";
pub const PRODUCT_NAME: &str = "AWS Control Tower Account Factory";
pub const CLEANUP_FUNCTION: &str = "aft-cleanup-resources";
pub const FRAMEWORK_FUNCTION: &str = "aft-invoke-aft-account-provisioning-framework";

pub const ROOT_ID: &str = "r-ab12";
pub const SECURITY_OU: &str = "ou-ab12-securit1";
pub const SANDBOX_OU: &str = "ou-ab12-sandbox1";
pub const NESTED_SANDBOX_OU: &str = "ou-ab12-sandbox2";
pub const WORKLOADS_OU: &str = "ou-ab12-workload";

pub const LOG_ARCHIVE_ID: &str = "111111111111";
pub const AUDIT_ID: &str = "222222222222";
pub const CT_MANAGEMENT_ID: &str = "333333333333";

/// In-memory organization, catalog, queue and parameter store wired together
pub struct TestWorld {
    pub orgs: Arc<InMemoryOrganizations>,
    pub catalog: Arc<InMemoryServiceCatalog>,
    pub parameter_store: Arc<InMemoryParameterStore>,
    pub invoker: Arc<RecordingInvoker>,
    pub queue: Arc<InMemoryWorkQueue>,
    pub sleeper: Arc<RecordingSleeper>,
    pub config: EngineConfig,
}

impl TestWorld {
    /// Root with Security, Sandbox and Workloads OUs (a second Sandbox under
    /// Workloads), the three shared accounts and an account factory product
    pub fn new() -> Self {
        let orgs = Arc::new(InMemoryOrganizations::with_root(ROOT_ID));
        orgs.add_ou(SECURITY_OU, "Security", ROOT_ID);
        orgs.add_ou(SANDBOX_OU, "Sandbox", ROOT_ID);
        orgs.add_ou(WORKLOADS_OU, "Workloads", ROOT_ID);
        orgs.add_ou(NESTED_SANDBOX_OU, "Sandbox", WORKLOADS_OU);

        orgs.add_account(LOG_ARCHIVE_ID, "Log Archive", "logs@example.com", SECURITY_OU);
        orgs.add_account(AUDIT_ID, "Audit", "audit@example.com", SECURITY_OU);
        orgs.add_account(CT_MANAGEMENT_ID, "Management", "mgmt@example.com", ROOT_ID);

        let catalog = Arc::new(InMemoryServiceCatalog::new());
        catalog.add_product(
            "prod-acctfactory",
            PRODUCT_NAME,
            vec![ProvisioningArtifact {
                id: "pa-current".to_string(),
                name: "AWS Control Tower Account Factory".to_string(),
                active: true,
            }],
        );

        let parameter_store = Arc::new(
            InMemoryParameterStore::new()
                .with_parameter(parameters::ACCOUNT_REQUEST_QUEUE, QUEUE)
                .with_parameter(parameters::ACCOUNT_FACTORY_PRODUCT_NAME, PRODUCT_NAME)
                .with_parameter(parameters::ACCOUNT_REQUEST_TABLE, "aft-request")
                .with_parameter(parameters::CLEANUP_RESOURCES_FUNCTION, CLEANUP_FUNCTION)
                .with_parameter(parameters::PROVISIONING_FRAMEWORK_FUNCTION, FRAMEWORK_FUNCTION)
                .with_parameter(parameters::CT_MANAGEMENT_ACCOUNT_ID, CT_MANAGEMENT_ID)
                .with_parameter(parameters::AUDIT_ACCOUNT_ID, AUDIT_ID)
                .with_parameter(parameters::LOG_ARCHIVE_ACCOUNT_ID, LOG_ARCHIVE_ID),
        );

        let queue = Arc::new(InMemoryWorkQueue::new());
        queue.ensure_queue(QUEUE);

        Self {
            orgs,
            catalog,
            parameter_store,
            invoker: Arc::new(RecordingInvoker::new()),
            queue,
            sleeper: Arc::new(RecordingSleeper::new()),
            config: EngineConfig::default(),
        }
    }

    pub fn providers(&self) -> ProviderSet {
        ProviderSet {
            organizations: self.orgs.clone(),
            catalog: self.catalog.clone(),
            parameter_store: self.parameter_store.clone(),
            invoker: self.invoker.clone(),
            queue: self.queue.clone(),
        }
    }

    pub fn retry(&self) -> ThrottleRetry {
        ThrottleRetry::new(RetryPolicy::from(&self.config.retry))
            .with_sleeper(self.sleeper.clone())
            .with_jitter_seed(7)
    }

    pub async fn context(&self) -> InvocationContext {
        InvocationContext::initialize_with_retry(self.config.clone(), self.providers(), self.retry())
            .await
            .expect("invocation context should initialize")
    }

    pub async fn dispatch_context(&self) -> DispatchContext {
        DispatchContext::initialize_with_retry(self.config.clone(), self.providers(), self.retry())
            .await
            .expect("dispatch context should initialize")
    }
}

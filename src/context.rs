//! # Invocation Context
//!
//! Bootstrap for both entry points. One context is built per invocation and owns
//! everything that would otherwise be process-wide state: validated configuration,
//! runtime parameters and the shared [`ThrottleRetry`]. Components are wired from it
//! on demand.
//!
//! Queue dispatch never looks at OUs, so it bootstraps a [`DispatchContext`] and makes
//! no organizations traversal. Change-log classification bootstraps an
//! [`InvocationContext`], which is a dispatch context plus the OU cache.
//!
//! ## Bootstrap
//!
//! 1. validate [`EngineConfig`]
//! 2. resolve [`RuntimeParameters`] from the parameter store
//! 3. classification only: build the OU cache with one breadth-first traversal
//!
//! ```rust,no_run
//! use account_lifecycle::context::{InvocationContext, ProviderSet};
//! use account_lifecycle::config::EngineConfig;
//!
//! # async fn example(providers: ProviderSet, event: serde_json::Value) -> account_lifecycle::Result<()> {
//! let context = InvocationContext::initialize(EngineConfig::default(), providers).await?;
//! let processed = context.record_processor().process_event(&event).await?;
//! println!("{}", processed.action);
//! # Ok(())
//! # }
//! ```

use crate::classification::{EventClassifier, ProcessorTargets, RecordProcessor, SharedAccountGuard};
use crate::config::{EngineConfig, RuntimeParameters};
use crate::customizations::TargetSelector;
use crate::error::Result;
use crate::messaging::WorkQueue;
use crate::organizations::OuResolver;
use crate::providers::{DownstreamInvoker, OrganizationsApi, ParameterStore, ServiceCatalogApi};
use crate::provisioning::{
    ConcurrencyGate, ProductProvisioner, ProvisioningStatusOracle, RequestDispatcher, RequestValidator,
};
use crate::resilience::ThrottleRetry;
use std::ops::Deref;
use std::sync::Arc;
use tracing::info;

/// Collaborators the engine talks to
#[derive(Debug, Clone)]
pub struct ProviderSet {
    pub organizations: Arc<dyn OrganizationsApi>,
    pub catalog: Arc<dyn ServiceCatalogApi>,
    pub parameter_store: Arc<dyn ParameterStore>,
    pub invoker: Arc<dyn DownstreamInvoker>,
    pub queue: Arc<dyn WorkQueue>,
}

/// Configuration, parameters and retry; enough to drain the work queue
#[derive(Debug, Clone)]
pub struct DispatchContext {
    config: EngineConfig,
    parameters: RuntimeParameters,
    providers: ProviderSet,
    retry: Arc<ThrottleRetry>,
}

impl DispatchContext {
    pub async fn initialize(config: EngineConfig, providers: ProviderSet) -> Result<Self> {
        let retry = ThrottleRetry::from_config(&config.retry);
        Self::initialize_with_retry(config, providers, retry).await
    }

    /// Bootstrap with an explicit retry wrapper (custom sleeper or seed)
    pub async fn initialize_with_retry(
        config: EngineConfig,
        providers: ProviderSet,
        retry: ThrottleRetry,
    ) -> Result<Self> {
        config.validate()?;
        let parameters = RuntimeParameters::load(providers.parameter_store.as_ref()).await?;

        info!(
            queue = %parameters.request_queue_name,
            product = %parameters.account_factory_product_name,
            "✅ Dispatch context initialized"
        );

        Ok(Self {
            config,
            parameters,
            providers,
            retry: Arc::new(retry),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parameters(&self) -> &RuntimeParameters {
        &self.parameters
    }

    pub fn retry(&self) -> &Arc<ThrottleRetry> {
        &self.retry
    }

    /// Parameter-store override when present, else the configured threshold
    pub fn provisioning_threshold(&self) -> u32 {
        self.parameters
            .provisioning_threshold
            .unwrap_or(self.config.provisioning.threshold)
    }

    pub fn shared_account_ids(&self) -> Vec<String> {
        self.parameters
            .shared_account_ids()
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    pub fn status_oracle(&self) -> ProvisioningStatusOracle {
        ProvisioningStatusOracle::new(
            self.providers.catalog.clone(),
            self.retry.clone(),
            &self.config.provisioning,
        )
    }

    pub fn validator(&self) -> RequestValidator {
        RequestValidator::new(self.providers.organizations.clone(), self.retry.clone())
    }

    pub fn gate(&self) -> ConcurrencyGate {
        ConcurrencyGate::new(
            self.providers.catalog.clone(),
            self.retry.clone(),
            &self.config.provisioning,
        )
    }

    pub fn provisioner(&self) -> ProductProvisioner {
        ProductProvisioner::new(
            self.providers.catalog.clone(),
            self.retry.clone(),
            self.parameters.account_factory_product_name.clone(),
            &self.config.provisioning,
        )
    }

    pub fn dispatcher(&self) -> RequestDispatcher {
        RequestDispatcher::new(
            self.providers.queue.clone(),
            self.parameters.request_queue_name.clone(),
            self.gate(),
            self.validator(),
            self.provisioner(),
            self.provisioning_threshold(),
        )
    }
}

/// Dispatch context plus the invocation's OU cache
#[derive(Debug, Clone)]
pub struct InvocationContext {
    dispatch: DispatchContext,
    resolver: Arc<OuResolver>,
}

impl InvocationContext {
    /// Bootstrap with a retry wrapper built from `config.retry`
    pub async fn initialize(config: EngineConfig, providers: ProviderSet) -> Result<Self> {
        let retry = ThrottleRetry::from_config(&config.retry);
        Self::initialize_with_retry(config, providers, retry).await
    }

    pub async fn initialize_with_retry(
        config: EngineConfig,
        providers: ProviderSet,
        retry: ThrottleRetry,
    ) -> Result<Self> {
        let dispatch = DispatchContext::initialize_with_retry(config, providers, retry).await?;
        Self::build_ou_cache(dispatch).await
    }

    /// Traverse the organization once and attach the resulting cache
    pub async fn build_ou_cache(dispatch: DispatchContext) -> Result<Self> {
        let resolver = Arc::new(
            OuResolver::build(dispatch.providers.organizations.clone(), dispatch.retry.clone()).await?,
        );
        info!(ou_count = resolver.cache().len(), "✅ OU cache built");

        Ok(Self { dispatch, resolver })
    }

    pub fn resolver(&self) -> &Arc<OuResolver> {
        &self.resolver
    }

    pub fn shared_account_guard(&self) -> SharedAccountGuard {
        SharedAccountGuard::new(
            self.providers.organizations.clone(),
            self.retry.clone(),
            self.resolver.clone(),
            self.shared_account_ids(),
        )
    }

    pub fn classifier(&self) -> EventClassifier {
        EventClassifier::new(
            Arc::new(self.status_oracle()),
            Arc::new(self.shared_account_guard()),
        )
    }

    pub fn record_processor(&self) -> RecordProcessor {
        RecordProcessor::new(
            self.classifier(),
            self.providers.queue.clone(),
            self.providers.invoker.clone(),
            ProcessorTargets {
                request_queue_name: self.parameters.request_queue_name.clone(),
                cleanup_function_name: self.parameters.cleanup_function_name.clone(),
                provisioning_framework_function_name: self
                    .parameters
                    .provisioning_framework_function_name
                    .clone(),
            },
        )
    }

    pub fn target_selector(&self) -> TargetSelector {
        TargetSelector::new(self.resolver.clone(), self.shared_account_ids())
    }
}

impl Deref for InvocationContext {
    type Target = DispatchContext;

    fn deref(&self) -> &Self::Target {
        &self.dispatch
    }
}

#![allow(clippy::doc_markdown)] // Allow technical terms like ManagedOrganizationalUnit in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Account Lifecycle Core
//!
//! Account request lifecycle engine for a multi-account organization.
//!
//! ## Overview
//!
//! Account requests live in a change-logged table. Every change to a request arrives
//! here as a change-log record and is classified into exactly one lifecycle action:
//! clean up a removed request, queue a create or update of the vended account, or run
//! customizations only. Queued work is drained one item at a time by a dispatcher that
//! respects a global cap on in-flight provisioning operations and the provider's rate
//! limits.
//!
//! ## Architecture
//!
//! ```text
//! change-log record ─► EventClassifier ─► Remove            ─► cleanup function
//!                        │   ▲            EnqueueCreate/Update ─► work queue
//!                        │   └ oracle     CustomizationOnly  ─► provisioning framework
//!                        ▼
//! work queue ─► ConcurrencyGate ─► RequestDispatcher ─► RequestValidator ─► provider
//! ```
//!
//! Every provider call goes through [`resilience::ThrottleRetry`]. OU names are
//! resolved by [`organizations::OuResolver`] over a cache built once per invocation.
//!
//! ## Module Organization
//!
//! - [`classification`] - Event classifier, shared-account guard and record processor
//! - [`provisioning`] - Status oracle, validator, concurrency gate and dispatcher
//! - [`organizations`] - Nested OU naming, OU cache and resolver
//! - [`resilience`] - Throttle-safe retry
//! - [`providers`] - Collaborator traits and in-memory implementations
//! - [`messaging`] - Work queue
//! - [`models`] - Typed records
//! - [`customizations`] - Customization target selection
//! - [`context`] - Per-invocation wiring
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use account_lifecycle::config::ConfigManager;
//! use account_lifecycle::context::{DispatchContext, ProviderSet};
//! use account_lifecycle::provisioning::DispatchOutcome;
//!
//! # async fn example(providers: ProviderSet) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! account_lifecycle::logging::init_structured_logging_with(&manager.config().logging);
//!
//! let context = DispatchContext::initialize(manager.config().clone(), providers).await?;
//! match context.dispatcher().dispatch_one().await? {
//!     DispatchOutcome::Rejected { reason, .. } => println!("rejected: {reason}"),
//!     outcome => println!("{outcome:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod classification;
pub mod config;
pub mod constants;
pub mod context;
pub mod customizations;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod organizations;
pub mod providers;
pub mod provisioning;
pub mod resilience;

pub use classification::{EventClassifier, LifecycleAction, RecordProcessor};
pub use config::{ConfigManager, EngineConfig, RuntimeParameters};
pub use context::{DispatchContext, InvocationContext, ProviderSet};
pub use error::{ErrorKind, LifecycleError, Result};
pub use organizations::OuResolver;
pub use provisioning::{
    ConcurrencyGate, DispatchOutcome, ProvisioningStatusOracle, RequestDispatcher, RequestValidator,
    ValidationOutcome,
};
pub use resilience::ThrottleRetry;

//! # Provisioning
//!
//! Everything between a queued [`WorkItem`](crate::models::WorkItem) and an accepted
//! provider call: the idempotency oracle consulted by the classifier, request
//! validation, the concurrency gate and the dispatcher that ties them together.

pub mod dispatcher;
pub mod gate;
pub mod provisioner;
pub mod status_oracle;
pub mod validator;

pub use dispatcher::{DispatchOutcome, RequestDispatcher};
pub use gate::{ConcurrencyGate, GateCheck};
pub use provisioner::{ProductProvisioner, ProvisioningTarget};
pub use status_oracle::ProvisioningStatusOracle;
pub use validator::{RejectionReason, RequestValidator, ValidationOutcome};

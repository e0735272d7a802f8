//! # Classification
//!
//! Turns account request change-log records into lifecycle actions and carries them
//! out: cleanup on removal, work items for provisioning, or a customization-only run.

pub mod action;
pub mod classifier;
pub mod record_processor;
pub mod shared_accounts;

pub use action::LifecycleAction;
pub use classifier::{decide, AccountExistence, EventClassifier, RecordFacts};
pub use record_processor::{ProcessedRecord, ProcessorTargets, RecordProcessor};
pub use shared_accounts::{ProtectedAccounts, SharedAccountGuard};

//! Lifecycle actions produced by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exactly one action is produced per account request record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Request deleted; run the cleanup function
    Remove,
    /// No healthy account exists yet; queue an `ADD` work item
    EnqueueCreate,
    /// Control-tower parameters changed; queue an `UPDATE` work item
    EnqueueUpdate,
    /// Account exists and its control-tower parameters are unchanged
    InvokeCustomizationOnly,
    /// The decision table does not cover the record
    Unsupported,
}

impl LifecycleAction {
    /// Whether the action produces a work item
    pub fn enqueues(self) -> bool {
        matches!(self, Self::EnqueueCreate | Self::EnqueueUpdate)
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Remove => "remove",
            Self::EnqueueCreate => "enqueue_create",
            Self::EnqueueUpdate => "enqueue_update",
            Self::InvokeCustomizationOnly => "invoke_customization_only",
            Self::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

//! Error types for the account request lifecycle engine.
//!
//! Validation rejections are not errors: they travel as
//! [`ValidationOutcome`](crate::provisioning::ValidationOutcome) and
//! [`DispatchOutcome`](crate::provisioning::DispatchOutcome). Everything here propagates
//! to the caller, which routes it by [`ErrorKind`].

use crate::config::ConfigurationError;
use crate::messaging::MessagingError;
use crate::models::{EventKind, RecordError};
use crate::providers::ProviderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse classification used by the outer layer to route alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rate limiting, retried or exhausted
    Transient,
    /// A request that must be rejected, not retried
    Validation,
    /// A record shape the decision table does not cover
    Classification,
    /// An expected entity could not be found
    Resolution,
    Configuration,
    Messaging,
    Provider,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transient => "transient",
            Self::Validation => "validation",
            Self::Classification => "classification",
            Self::Resolution => "resolution",
            Self::Configuration => "configuration",
            Self::Messaging => "messaging",
            Self::Provider => "provider",
        };
        f.write_str(name)
    }
}

/// An OU, account or product that had to exist could not be found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Organization reports no root")]
    NoRoot,

    #[error("Organization reports {count} roots, expected exactly one")]
    MultipleRoots { count: usize },

    #[error("Account not found: {account}")]
    AccountNotFound { account: String },

    #[error("Parent {parent_id} of account {account_id} is not in the OU cache")]
    OuNotCached {
        account_id: String,
        parent_id: String,
    },

    #[error("No provisioned product found for account {account_email}")]
    ProvisionedProductNotFound { account_email: String },

    #[error("Product {product_id} has no active provisioning artifact")]
    NoActiveArtifact { product_id: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ResolutionError {
    pub fn account_not_found(account: impl Into<String>) -> Self {
        Self::AccountNotFound {
            account: account.into(),
        }
    }

    pub fn provisioned_product_not_found(account_email: impl Into<String>) -> Self {
        Self::ProvisionedProductNotFound {
            account_email: account_email.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider(e) => provider_kind(e),
            _ => ErrorKind::Resolution,
        }
    }
}

/// The classifier could not produce an action for a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("Unsupported {event_kind} record: {reason}")]
    Unsupported { event_kind: EventKind, reason: String },

    #[error("Malformed account request record: {0}")]
    MalformedRecord(#[from] RecordError),

    #[error("Shared account {account_id} ({account_email}) cannot be moved to OU '{requested_ou}'")]
    ProtectedAccountMove {
        account_id: String,
        account_email: String,
        requested_ou: String,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

impl ClassificationError {
    pub fn unsupported(event_kind: EventKind, reason: impl Into<String>) -> Self {
        Self::Unsupported {
            event_kind,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported { .. } | Self::MalformedRecord(_) => ErrorKind::Classification,
            Self::ProtectedAccountMove { .. } => ErrorKind::Validation,
            Self::Provider(e) => provider_kind(e),
            Self::Resolution(e) => e.kind(),
        }
    }
}

fn provider_kind(error: &ProviderError) -> ErrorKind {
    if error.is_throttling() || error.is_throttle_exhausted() {
        ErrorKind::Transient
    } else {
        ErrorKind::Provider
    }
}

/// Crate-level error
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Messaging(#[from] MessagingError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider(e) => provider_kind(e),
            Self::Messaging(_) => ErrorKind::Messaging,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Resolution(e) => e.kind(),
            Self::Classification(e) => e.kind(),
        }
    }

    /// Expected rejections, as opposed to system faults
    pub fn is_rejection(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

pub type Result<T> = std::result::Result<T, LifecycleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_route_by_cause() {
        let exhausted: LifecycleError = ProviderError::ThrottleExhausted {
            operation: "list_roots".to_string(),
            attempts: 3,
            message: "Rate exceeded".to_string(),
        }
        .into();
        assert_eq!(exhausted.kind(), ErrorKind::Transient);

        let nested: LifecycleError =
            ClassificationError::from(ResolutionError::NoRoot).into();
        assert_eq!(nested.kind(), ErrorKind::Resolution);

        let protected: LifecycleError = ClassificationError::ProtectedAccountMove {
            account_id: "222222222222".to_string(),
            account_email: "audit@x.com".to_string(),
            requested_ou: "Sandbox".to_string(),
        }
        .into();
        assert!(protected.is_rejection());

        let unsupported: LifecycleError =
            ClassificationError::unsupported(EventKind::Insert, "no images").into();
        assert_eq!(unsupported.kind(), ErrorKind::Classification);
        assert_eq!(
            unsupported.to_string(),
            "Unsupported INSERT record: no images"
        );
    }
}

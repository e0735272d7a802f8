//! # Provider Error Types
//!
//! Errors raised by the external organization, product-catalog and parameter-store
//! collaborators. Throttling is modelled explicitly so the retry layer can recognise
//! it without inspecting message strings.

use crate::resilience::Retryable;
use thiserror::Error;

/// Errors returned by provider collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider throttled {operation}: {message}")]
    Throttled { operation: String, message: String },

    #[error("Provider kept throttling {operation} after {attempts} attempts: {message}")]
    ThrottleExhausted {
        operation: String,
        attempts: u32,
        message: String,
    },

    #[error("Resource not found during {operation}: {resource}")]
    NotFound { operation: String, resource: String },

    #[error("Provider rejected {operation}: {message}")]
    Rejected { operation: String, message: String },

    #[error("Provider service error during {operation}: {message}")]
    Service { operation: String, message: String },

    #[error("Malformed provider response for {operation}: {message}")]
    MalformedResponse { operation: String, message: String },
}

impl ProviderError {
    /// Create a throttling (rate-limit class) error
    pub fn throttled(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Throttled {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a resource-not-found error
    pub fn not_found(operation: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::NotFound {
            operation: operation.into(),
            resource: resource.into(),
        }
    }

    /// Create a request-rejected error
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a generic service error
    pub fn service(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this is a rate-limit class error
    pub fn is_throttling(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// Whether retries were exhausted on throttling
    pub fn is_throttle_exhausted(&self) -> bool {
        matches!(self, Self::ThrottleExhausted { .. })
    }

    /// Whether the provider reported a missing resource
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Retryable for ProviderError {
    fn is_retryable(&self) -> bool {
        self.is_throttling()
    }

    fn exhausted(self, operation: &str, attempts: u32) -> Self {
        match self {
            Self::Throttled { message, .. } => Self::ThrottleExhausted {
                operation: operation.to_string(),
                attempts,
                message,
            },
            other => other,
        }
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

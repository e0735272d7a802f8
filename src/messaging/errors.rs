//! # Messaging Error Types
//!
//! Failures of the work queue transport. A malformed work item body is not a
//! messaging error: the dispatcher decodes bodies itself and rejects them.

use thiserror::Error;

/// Work queue error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Send to {queue_name} failed: {message}")]
    SendFailed { queue_name: String, message: String },

    #[error("Receive from {queue_name} failed: {message}")]
    ReceiveFailed { queue_name: String, message: String },

    #[error("Delete from {queue_name} failed: {message}")]
    DeleteFailed { queue_name: String, message: String },

    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    /// The message was already deleted, or never received
    #[error("Unknown receipt handle on {queue_name}: {receipt_handle}")]
    ReceiptNotFound {
        queue_name: String,
        receipt_handle: String,
    },

    #[error("Work item could not be encoded: {message}")]
    Encoding { message: String },
}

impl MessagingError {
    pub fn send_failed(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SendFailed {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    pub fn receive_failed(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReceiveFailed {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    pub fn delete_failed(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DeleteFailed {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    pub fn queue_not_found(queue_name: impl Into<String>) -> Self {
        Self::QueueNotFound {
            queue_name: queue_name.into(),
        }
    }

    pub fn receipt_not_found(
        queue_name: impl Into<String>,
        receipt_handle: impl Into<String>,
    ) -> Self {
        Self::ReceiptNotFound {
            queue_name: queue_name.into(),
            receipt_handle: receipt_handle.into(),
        }
    }

    /// The queue itself is missing, as opposed to a transient transport failure
    pub fn is_missing_queue(&self) -> bool {
        matches!(self, Self::QueueNotFound { .. })
    }
}

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding {
            message: err.to_string(),
        }
    }
}

pub type MessagingResult<T> = Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_queue() {
        let err = MessagingError::send_failed("requests.fifo", "throughput exceeded");
        assert_eq!(
            err.to_string(),
            "Send to requests.fifo failed: throughput exceeded"
        );
        assert!(!err.is_missing_queue());
        assert!(MessagingError::queue_not_found("requests.fifo").is_missing_queue());
    }

    #[test]
    fn test_json_errors_become_encoding_errors() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json").unwrap_err();
        assert!(matches!(
            MessagingError::from(err),
            MessagingError::Encoding { .. }
        ));
    }
}

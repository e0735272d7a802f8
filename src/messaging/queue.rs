//! # Work Queue
//!
//! FIFO queue carrying [`WorkItem`]s from the classifier to the dispatcher. Every send
//! uses one freshly generated UUID as both deduplication and group id, so uniqueness is
//! enforced by the engine rather than by the transport's dedup window.

use super::errors::MessagingResult;
use crate::models::WorkItem;
use async_trait::async_trait;
use std::fmt;
use tracing::info;
use uuid::Uuid;

/// Opaque handle used to delete a received message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(pub String);

impl ReceiptHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message received from the queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub message_id: String,
    pub receipt_handle: ReceiptHandle,
    pub body: String,
}

/// Transport-level send options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOptions {
    pub deduplication_id: String,
    pub group_id: String,
}

impl SendOptions {
    /// Dedup and group id set to the same fresh UUID
    pub fn unique() -> Self {
        let id = Uuid::new_v4().to_string();
        Self {
            deduplication_id: id.clone(),
            group_id: id,
        }
    }
}

/// Queue collaborator
#[async_trait]
pub trait WorkQueue: Send + Sync + fmt::Debug {
    /// Returns the transport's message id
    async fn send(&self, queue_name: &str, body: String, options: SendOptions)
        -> MessagingResult<String>;

    /// At most one message; `None` when the queue is empty
    async fn receive_one(&self, queue_name: &str) -> MessagingResult<Option<QueuedMessage>>;

    async fn delete(&self, queue_name: &str, receipt_handle: &ReceiptHandle) -> MessagingResult<()>;
}

/// Serialize and send one work item
pub async fn enqueue_work_item(
    queue: &dyn WorkQueue,
    queue_name: &str,
    item: &WorkItem,
) -> MessagingResult<String> {
    let body = item.to_json()?;
    let options = SendOptions::unique();
    let message_id = queue.send(queue_name, body, options.clone()).await?;

    info!(
        queue = %queue_name,
        message_id = %message_id,
        operation = %item.operation,
        deduplication_id = %options.deduplication_id,
        "📤 Work item enqueued"
    );
    Ok(message_id)
}

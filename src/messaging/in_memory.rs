//! # In-Memory Work Queue
//!
//! Thread-safe in-memory FIFO queue for testing and development.
//!
//! A received message stays in flight until deleted; it is not redelivered by this
//! implementation. Sends, deletions and send options are recorded for assertions.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::errors::{MessagingError, MessagingResult};
use super::queue::{QueuedMessage, ReceiptHandle, SendOptions, WorkQueue};

#[derive(Debug, Default)]
struct InMemoryQueue {
    /// Visible messages (FIFO order)
    visible: VecDeque<QueuedMessage>,
    /// Received but not yet deleted, by receipt handle
    in_flight: HashMap<ReceiptHandle, QueuedMessage>,
    sent_options: Vec<SendOptions>,
    deleted: Vec<String>,
    next_id: u64,
}

/// In-memory work queue
#[derive(Debug, Default)]
pub struct InMemoryWorkQueue {
    queues: Mutex<HashMap<String, InMemoryQueue>>,
}

impl InMemoryWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue; sends to unknown queues fail
    pub fn ensure_queue(&self, queue_name: &str) {
        self.queues
            .lock()
            .entry(queue_name.to_string())
            .or_default();
    }

    /// Put a raw body on the queue, bypassing send options
    pub fn push_raw(&self, queue_name: &str, body: impl Into<String>) -> MessagingResult<String> {
        self.push(queue_name, body.into(), SendOptions::unique())
    }

    fn push(&self, queue_name: &str, body: String, options: SendOptions) -> MessagingResult<String> {
        let mut queues = self.queues.lock();
        let queue = queues
            .get_mut(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        queue.next_id += 1;
        let message_id = format!("msg-{}", queue.next_id);
        queue.visible.push_back(QueuedMessage {
            message_id: message_id.clone(),
            receipt_handle: ReceiptHandle(format!("receipt-{}", queue.next_id)),
            body,
        });
        queue.sent_options.push(options);
        Ok(message_id)
    }

    /// Visible messages
    pub fn queue_length(&self, queue_name: &str) -> usize {
        self.queues
            .lock()
            .get(queue_name)
            .map_or(0, |queue| queue.visible.len())
    }

    /// Received but not deleted
    pub fn in_flight_count(&self, queue_name: &str) -> usize {
        self.queues
            .lock()
            .get(queue_name)
            .map_or(0, |queue| queue.in_flight.len())
    }

    /// Message ids deleted so far
    pub fn deleted(&self, queue_name: &str) -> Vec<String> {
        self.queues
            .lock()
            .get(queue_name)
            .map(|queue| queue.deleted.clone())
            .unwrap_or_default()
    }

    pub fn sent_options(&self, queue_name: &str) -> Vec<SendOptions> {
        self.queues
            .lock()
            .get(queue_name)
            .map(|queue| queue.sent_options.clone())
            .unwrap_or_default()
    }

    /// Bodies of visible messages, oldest first
    pub fn peek_bodies(&self, queue_name: &str) -> Vec<String> {
        self.queues
            .lock()
            .get(queue_name)
            .map(|queue| queue.visible.iter().map(|m| m.body.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl WorkQueue for InMemoryWorkQueue {
    async fn send(
        &self,
        queue_name: &str,
        body: String,
        options: SendOptions,
    ) -> MessagingResult<String> {
        self.push(queue_name, body, options)
    }

    async fn receive_one(&self, queue_name: &str) -> MessagingResult<Option<QueuedMessage>> {
        let mut queues = self.queues.lock();
        let queue = queues
            .get_mut(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        Ok(queue.visible.pop_front().map(|message| {
            queue
                .in_flight
                .insert(message.receipt_handle.clone(), message.clone());
            message
        }))
    }

    async fn delete(&self, queue_name: &str, receipt_handle: &ReceiptHandle) -> MessagingResult<()> {
        let mut queues = self.queues.lock();
        let queue = queues
            .get_mut(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        let message = queue
            .in_flight
            .remove(receipt_handle)
            .ok_or_else(|| MessagingError::receipt_not_found(queue_name, receipt_handle.as_str()))?;
        queue.deleted.push(message.message_id);
        Ok(())
    }
}

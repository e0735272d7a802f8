//! # Messaging Module
//!
//! Work-queue plumbing between the classifier (producer) and the dispatcher (consumer).
//! Delivery is at-least-once; the dispatcher deletes a message only once the provider
//! accepted it or the request was rejected.

pub mod errors;
pub mod in_memory;
pub mod queue;

pub use errors::{MessagingError, MessagingResult};
pub use in_memory::InMemoryWorkQueue;
pub use queue::{enqueue_work_item, QueuedMessage, ReceiptHandle, SendOptions, WorkQueue};

//! Task queue module
//!
//! The queue substrate between the detection and indexing workers is
//! external and at-least-once: messages may be redelivered and may reorder
//! across batches. The interface carries raw string bodies; parsing (and
//! the `Malformed` outcome) belongs to the consumer, not the transport.

mod memory;

pub use memory::MemoryTaskQueue;

use async_trait::async_trait;
use facedex_core::Result;

/// A message pulled from the queue.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    /// Raw message body as published.
    pub body: String,
    /// How many times this message has been delivered, starting at 1.
    pub receive_count: u32,
}

/// Narrow queue interface: publish detection-task bodies, pull batches.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Publish one message. Queue unreachable is `Unavailable`.
    async fn publish(&self, body: &str) -> Result<()>;

    /// Pull up to `max` messages. The consumer republishes on failure;
    /// delivery is at-least-once, never exactly-once.
    async fn receive_batch(&self, max: usize) -> Result<Vec<QueueMessage>>;
}

//! In-memory task queue for development and tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use facedex_core::Result;
use tokio::sync::Mutex;

use super::{QueueMessage, TaskQueue};

/// FIFO queue held in memory. Redelivery is simulated by republishing,
/// which is exactly what the consumer loop does on batch failure.
#[derive(Default)]
pub struct MemoryTaskQueue {
    messages: Mutex<VecDeque<QueueMessage>>,
}

impl MemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages currently waiting, for test assertions.
    pub async fn pending(&self) -> usize {
        self.messages.lock().await.len()
    }
}

#[async_trait]
impl TaskQueue for MemoryTaskQueue {
    async fn publish(&self, body: &str) -> Result<()> {
        self.messages.lock().await.push_back(QueueMessage {
            body: body.to_string(),
            receive_count: 0,
        });
        Ok(())
    }

    async fn receive_batch(&self, max: usize) -> Result<Vec<QueueMessage>> {
        let mut queue = self.messages.lock().await;
        let take = max.min(queue.len());
        Ok(queue
            .drain(..take)
            .map(|mut m| {
                m.receive_count += 1;
                m
            })
            .collect())
    }
}

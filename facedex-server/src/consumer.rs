//! Background queue consumer
//!
//! Continuously drains the task queue into the indexing worker. A failed
//! batch goes back on the queue; the substrate is at-least-once, so
//! redelivery (and the duplicate Face rows it can produce) is expected.

use std::time::Duration;

use tracing::{error, info};

use crate::state::AppState;
use crate::workers::IndexingWorker;

/// Run the consumer loop until the task is aborted.
pub async fn run_consumer(state: AppState) {
    let worker = IndexingWorker::new(state.object_store.clone(), state.faces.clone());
    let batch_size = state.config.consume_batch_size;
    let idle = Duration::from_millis(state.config.consume_poll_ms);

    info!(batch_size, "queue consumer started");

    loop {
        let batch = match state.queue.receive_batch(batch_size).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(error = %e, "queue receive failed");
                tokio::time::sleep(idle).await;
                continue;
            }
        };

        if batch.is_empty() {
            tokio::time::sleep(idle).await;
            continue;
        }

        if let Err(e) = worker.handle_batch(&batch).await {
            error!(error = %e, batch = batch.len(), "indexing batch failed, republishing");
            for message in &batch {
                if let Err(publish_err) = state.queue.publish(&message.body).await {
                    error!(error = %publish_err, "republish failed, message lost");
                }
            }
            tokio::time::sleep(idle).await;
        }
    }
}

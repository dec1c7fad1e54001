//! Pipeline trigger handlers
//!
//! `photo_uploaded` is the upload-notification entrypoint: the object
//! store's event source posts a batch of records here and the detection
//! worker runs inside the request. `process_tasks` drains one batch from
//! the task queue through the indexing worker; the background consumer
//! does the same continuously; this endpoint exists for operators and
//! tests.

use axum::extract::State;
use axum::Json;
use facedex_core::UploadRecord;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;
use crate::workers::{DetectionWorker, IndexingWorker};

/// Upload-notification batch.
#[derive(Debug, Deserialize)]
pub struct UploadNotification {
    pub records: Vec<UploadRecord>,
}

#[derive(Debug, Serialize)]
pub struct DetectionOutcome {
    /// Detection tasks published.
    pub published: usize,
}

/// POST /hooks/photo-uploaded
///
/// `Unavailable` propagates as 503 so the event source redelivers the
/// batch; nothing is acknowledged that was not processed.
pub async fn photo_uploaded(
    State(state): State<AppState>,
    Json(notification): Json<UploadNotification>,
) -> Result<Json<DetectionOutcome>, ApiError> {
    if notification.records.is_empty() {
        return Err(ApiError::bad_request("notification has no records"));
    }

    let worker = DetectionWorker::new(
        state.object_store.clone(),
        state.detector.clone(),
        state.queue.clone(),
    );
    let published = worker.handle_batch(&notification.records).await?;

    Ok(Json(DetectionOutcome { published }))
}

#[derive(Debug, Serialize)]
pub struct IndexingOutcome {
    pub indexed: usize,
    pub dropped: usize,
}

/// POST /hooks/process-tasks - drain one batch from the task queue.
pub async fn process_tasks(
    State(state): State<AppState>,
) -> Result<Json<IndexingOutcome>, ApiError> {
    let batch = state
        .queue
        .receive_batch(state.config.consume_batch_size)
        .await?;

    let worker = IndexingWorker::new(state.object_store.clone(), state.faces.clone());
    let report = match worker.handle_batch(&batch).await {
        Ok(report) => report,
        Err(e) => {
            // Failed batches go back on the queue; at-least-once, not lost.
            for message in &batch {
                if let Err(publish_err) = state.queue.publish(&message.body).await {
                    tracing::error!(error = %publish_err, "republish failed, message lost");
                }
            }
            return Err(e.into());
        }
    };

    Ok(Json(IndexingOutcome {
        indexed: report.indexed,
        dropped: report.dropped,
    }))
}

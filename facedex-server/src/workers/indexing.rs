//! Indexing worker: detection tasks in, stored crops and Face rows out.

use std::sync::Arc;

use facedex_core::{crop_face, face_object_key, photo_object_key, DetectionTask, Result};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::db::{FaceStore, NewFace};
use crate::object_store::ObjectStore;
use crate::queue::QueueMessage;

/// Outcome of one indexing batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Face rows created.
    pub indexed: usize,
    /// Messages dropped as terminally bad (malformed body, vanished photo,
    /// undecodable image).
    pub dropped: usize,
}

/// Consumes batches of detection-task messages. For each: crop the face
/// region, store the crop, then insert the Face row, strictly in that
/// order, so a Face row never references a missing image.
pub struct IndexingWorker {
    object_store: Arc<dyn ObjectStore>,
    faces: Arc<dyn FaceStore>,
}

impl IndexingWorker {
    pub fn new(object_store: Arc<dyn ObjectStore>, faces: Arc<dyn FaceStore>) -> Self {
        Self {
            object_store,
            faces,
        }
    }

    /// Process one batch sequentially.
    ///
    /// `Unavailable` fails the batch so the queue substrate redelivers it;
    /// redelivery generates fresh face ids, so duplicates surface as extra
    /// Face rows rather than lost work. Malformed bodies are logged and
    /// dropped; the substrate's dead-letter policy, if any, never sees
    /// them.
    #[instrument(level = "info", skip_all, fields(batch = messages.len()))]
    pub async fn handle_batch(&self, messages: &[QueueMessage]) -> Result<BatchReport> {
        let mut report = BatchReport::default();

        for message in messages {
            let task = match DetectionTask::from_message(&message.body) {
                Ok(task) => task,
                Err(e) => {
                    warn!(error = %e, receive_count = message.receive_count, "dropping malformed task");
                    report.dropped += 1;
                    continue;
                }
            };

            match self.index_one(&task).await {
                Ok(face_id) => {
                    debug!(face_id = %face_id, photo = %task.original_photo_key, "face indexed");
                    report.indexed += 1;
                }
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(photo = %task.original_photo_key, error = %e, "dropping task");
                    report.dropped += 1;
                }
            }
        }

        info!(indexed = report.indexed, dropped = report.dropped, "indexing batch processed");
        Ok(report)
    }

    async fn index_one(&self, task: &DetectionTask) -> Result<Uuid> {
        let photo_key = photo_object_key(&task.original_photo_key);
        let photo = self.object_store.get(&photo_key).await?;

        let crop = crop_face(&photo, task.effective_region())?;

        // Each processing generates a fresh id, even for a redelivered task.
        let face_id = Uuid::new_v4();
        let face_key = face_object_key(face_id);

        // The crop must be durable before the row exists. The reverse
        // failure (crop stored, insert fails) leaves an orphaned object,
        // which nothing ever resolves without the row.
        self.object_store.put(&face_key, &crop).await?;

        if let Err(e) = self
            .faces
            .insert_face(&NewFace {
                face_id,
                photo_id: task.original_photo_key.clone(),
                bounding_box: task.effective_region(),
            })
            .await
        {
            warn!(face_key = %face_key, error = %e, "face row insert failed, crop orphaned");
            return Err(e);
        }

        Ok(face_id)
    }
}

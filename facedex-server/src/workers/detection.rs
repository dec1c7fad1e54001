//! Detection worker: upload notifications in, detection tasks out.

use std::sync::Arc;

use facedex_core::{photo_object_key, primary_box, DetectionTask, FaceDetector, FacedexError, Result, UploadRecord};
use tracing::{debug, info, instrument, warn};

use crate::object_store::ObjectStore;
use crate::queue::TaskQueue;

/// Consumes batches of upload-notification records and publishes exactly
/// one `DetectionTask` per record that still has a photo behind it.
pub struct DetectionWorker {
    object_store: Arc<dyn ObjectStore>,
    detector: Arc<dyn FaceDetector>,
    queue: Arc<dyn TaskQueue>,
}

impl DetectionWorker {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        detector: Arc<dyn FaceDetector>,
        queue: Arc<dyn TaskQueue>,
    ) -> Self {
        Self {
            object_store,
            detector,
            queue,
        }
    }

    /// Process one batch sequentially. Returns the number of tasks
    /// published.
    ///
    /// `Unavailable` from the detector, store, or queue fails the batch so
    /// the invoking infrastructure retries it; coordinates are never
    /// fabricated on infrastructure failure. A record whose photo is gone,
    /// or whose bytes the detector rejects, is logged and skipped.
    #[instrument(level = "info", skip_all, fields(batch = records.len()))]
    pub async fn handle_batch(&self, records: &[UploadRecord]) -> Result<usize> {
        let mut published = 0;

        for record in records {
            match self.handle_record(record).await {
                Ok(()) => published += 1,
                Err(e) if e.is_retryable() => return Err(e),
                Err(e) => {
                    warn!(object_key = %record.object_key, error = %e, "upload record skipped");
                }
            }
        }

        info!(published, "detection batch processed");
        Ok(published)
    }

    async fn handle_record(&self, record: &UploadRecord) -> Result<()> {
        let photo_key = photo_object_key(&record.object_key);
        let bytes = self.object_store.get(&photo_key).await?;

        let boxes = self.detector.detect(&bytes).await?;
        // Only the first detected face is indexed; an empty result is the
        // legitimate "no face found" encoding.
        let primary = primary_box(&boxes);
        if boxes.len() > 1 {
            debug!(
                object_key = %record.object_key,
                detected = boxes.len(),
                "multiple faces detected, indexing first only"
            );
        }

        let task = DetectionTask::new(record.object_key.clone(), primary);
        let body = task.to_message()?;
        self.queue.publish(&body).await.map_err(|e| {
            FacedexError::Unavailable(format!("publish task for {}: {e}", record.object_key))
        })?;

        debug!(object_key = %record.object_key, face = primary.is_some(), "detection task published");
        Ok(())
    }
}

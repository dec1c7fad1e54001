//! Deterministic detector implementations for testing and local development.

use async_trait::async_trait;

use super::{DetectorSource, FaceDetector};
use crate::error::{FacedexError, Result};
use crate::types::BoundingBox;

/// Detector returning a preset list of boxes regardless of input.
pub struct StaticDetector {
    boxes: Vec<BoundingBox>,
}

impl StaticDetector {
    pub fn with_boxes(boxes: Vec<BoundingBox>) -> Self {
        Self { boxes }
    }

    /// One face at a fixed position.
    pub fn single(bbox: BoundingBox) -> Self {
        Self { boxes: vec![bbox] }
    }

    /// Finds no faces in anything.
    pub fn none() -> Self {
        Self { boxes: Vec::new() }
    }
}

#[async_trait]
impl FaceDetector for StaticDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<BoundingBox>> {
        Ok(self.boxes.clone())
    }

    fn source_id(&self) -> DetectorSource {
        DetectorSource::Static
    }
}

/// Detector that always fails with `Unavailable`, for exercising the
/// infrastructure-failure path in worker tests.
pub struct UnavailableDetector;

#[async_trait]
impl FaceDetector for UnavailableDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<BoundingBox>> {
        Err(FacedexError::Unavailable("detector offline".into()))
    }

    fn source_id(&self) -> DetectorSource {
        DetectorSource::Static
    }
}

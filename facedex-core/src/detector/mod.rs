//! Face-detector capability abstraction.
//!
//! Detection itself is an external capability: the pipeline only consumes
//! an ordered sequence of bounding boxes. Implementations:
//!
//! - `HttpDetector`: remote detection service over HTTP
//! - `StaticDetector`: deterministic preset boxes (testing and local dev)

pub mod http;
pub mod mock;

pub use http::{HttpDetector, HttpDetectorConfig};
pub use mock::{StaticDetector, UnavailableDetector};

use async_trait::async_trait;

use crate::error::Result;
use crate::types::BoundingBox;

/// Identifies which detector implementation produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorSource {
    Http,
    Static,
}

/// External face-detection capability.
///
/// Returns zero or more bounding boxes in detector output order. An
/// infrastructure failure must surface as `Unavailable`, never as an
/// empty result, which means "no face found".
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> Result<Vec<BoundingBox>>;

    fn source_id(&self) -> DetectorSource;
}

/// Select the primary face from detector output: the first box in output
/// order, or `None` when nothing was detected.
///
/// Only one face per photo is ever indexed; boxes past the first are
/// discarded. TODO: index every detected box once the naming flow can
/// handle several unnamed faces from one photo.
pub fn primary_box(boxes: &[BoundingBox]) -> Option<BoundingBox> {
    boxes.first().copied()
}

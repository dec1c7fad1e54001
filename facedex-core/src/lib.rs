//! Facedex Core - domain types for the photo face-indexing pipeline
//!
//! This crate holds everything the pipeline components agree on:
//!
//! - The error taxonomy (`FacedexError`) that callers branch on
//! - Wire types: `UploadRecord`, `DetectionTask`, `BoundingBox`
//! - Object-store key namespaces (`photos/`, `faces/`) and key validation
//! - The `FaceDetector` capability trait with HTTP and static backends
//! - Face-region cropping with the full-image fallback
//!
//! # Example
//!
//! ```no_run
//! use facedex_core::{crop_face, primary_box, BoundingBox, DetectionTask};
//!
//! # fn example(photo: &[u8]) -> facedex_core::Result<()> {
//! let boxes = vec![BoundingBox::new(10, 10, 50, 50)];
//! let task = DetectionTask::new("trip1.jpg", primary_box(&boxes));
//! let crop = crop_face(photo, task.effective_region())?;
//! # let _ = crop;
//! # Ok(())
//! # }
//! ```

pub mod crop;
pub mod detector;
pub mod error;
pub mod keys;
pub mod types;

// Re-export main types for convenience
pub use crop::crop_face;
pub use detector::{
    primary_box, DetectorSource, FaceDetector, HttpDetector, HttpDetectorConfig, StaticDetector,
    UnavailableDetector,
};
pub use error::{FacedexError, Result};
pub use keys::{
    face_object_key, photo_object_key, validate_key_segment, FACES_PREFIX, IMAGE_SUFFIX,
    PHOTOS_PREFIX,
};
pub use types::{BoundingBox, DetectionTask, UploadRecord};

//! Object-store key namespaces and validation.
//!
//! The gateway read path and the indexing worker agree on two namespaces:
//! `photos/` holds original uploads, `faces/` holds cropped face images
//! written under keys derived from the face id. Key validation runs before
//! any storage access so bad keys never reach a backend.

use uuid::Uuid;

use crate::error::{FacedexError, Result};

/// Namespace prefix for original photo uploads.
pub const PHOTOS_PREFIX: &str = "photos/";

/// Namespace prefix for cropped face images.
pub const FACES_PREFIX: &str = "faces/";

/// Every stored image key carries this suffix.
pub const IMAGE_SUFFIX: &str = ".jpg";

/// Derive the object-store key for a face crop: `faces/<face_id>.jpg`.
pub fn face_object_key(face_id: Uuid) -> String {
    format!("{FACES_PREFIX}{face_id}{IMAGE_SUFFIX}")
}

/// Derive the object-store key for an uploaded photo: `photos/<key>`.
pub fn photo_object_key(photo_key: &str) -> String {
    format!("{PHOTOS_PREFIX}{photo_key}")
}

/// Validate a key segment supplied by a caller before it touches storage.
///
/// Rejects empty keys, keys missing the image suffix, and anything that
/// could escape the namespace (path separators, parent references).
pub fn validate_key_segment(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(FacedexError::InvalidInput("empty key".into()));
    }
    if !key.ends_with(IMAGE_SUFFIX) {
        return Err(FacedexError::InvalidInput(format!(
            "key {key:?} must end with {IMAGE_SUFFIX}"
        )));
    }
    if key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(FacedexError::InvalidInput(format!(
            "key {key:?} contains path separators"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_key_lands_in_faces_namespace() {
        let id = Uuid::new_v4();
        let key = face_object_key(id);
        assert!(key.starts_with(FACES_PREFIX));
        assert!(key.ends_with(IMAGE_SUFFIX));
        assert!(key.contains(&id.to_string()));
    }

    #[test]
    fn photo_key_is_prefixed() {
        assert_eq!(photo_object_key("trip1.jpg"), "photos/trip1.jpg");
    }

    #[test]
    fn valid_segment_passes() {
        assert!(validate_key_segment("trip1.jpg").is_ok());
    }

    #[test]
    fn suffix_is_required() {
        assert!(matches!(
            validate_key_segment("trip1.png"),
            Err(FacedexError::InvalidInput(_))
        ));
        assert!(matches!(
            validate_key_segment(""),
            Err(FacedexError::InvalidInput(_))
        ));
    }

    #[test]
    fn traversal_is_rejected() {
        assert!(validate_key_segment("../secret.jpg").is_err());
        assert!(validate_key_segment("a/b.jpg").is_err());
        assert!(validate_key_segment("a\\b.jpg").is_err());
    }
}

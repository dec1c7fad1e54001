//! Wire and domain types for the ingestion pipeline.
//!
//! `DetectionTask` is the queue payload between the detection and indexing
//! workers; `UploadRecord` is the upload-notification record that triggers
//! detection. Both are schema-validated at the edge so malformed shapes fail
//! fast instead of deep inside worker logic.

use serde::{Deserialize, Serialize};

use crate::error::{FacedexError, Result};

/// Axis-aligned rectangle delimiting a detected face within a photo.
///
/// Coordinates follow detector convention: `(x1, y1)` top-left,
/// `(x2, y2)` bottom-right, pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl BoundingBox {
    /// The degenerate zero-area box used as a "no face found" placeholder.
    pub const ZERO: Self = Self {
        x1: 0,
        y1: 0,
        x2: 0,
        y2: 0,
    };

    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i64 {
        (self.x2 - self.x1).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.y2 - self.y1).max(0)
    }

    /// A box is degenerate when it encloses no pixels (zero or inverted
    /// extent). Degenerate boxes mean "crop nothing, use the full image".
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Wire form: `[x1, y1, x2, y2]`.
    pub fn to_coords(&self) -> [i64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Upload-notification record: one per newly stored photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    /// Object-store key of the uploaded photo, e.g. `trip1.jpg`.
    pub object_key: String,
}

/// Queue payload emitted by the detection worker, one per upload record.
///
/// `face_coordinates` serializes as a flat `[x1, y1, x2, y2]` array; an
/// empty array denotes "no face found". A zero-area box is accepted on
/// decode as the equivalent degenerate encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionTask {
    pub original_photo_key: String,
    #[serde(with = "coords")]
    pub face_coordinates: Option<BoundingBox>,
}

impl DetectionTask {
    pub fn new(original_photo_key: impl Into<String>, bbox: Option<BoundingBox>) -> Self {
        Self {
            original_photo_key: original_photo_key.into(),
            face_coordinates: bbox,
        }
    }

    /// The face region to index, with the degenerate placeholder collapsed
    /// to `None` so callers have a single "full image" branch.
    pub fn effective_region(&self) -> Option<BoundingBox> {
        self.face_coordinates.filter(|b| !b.is_degenerate())
    }

    /// Parse a raw queue message body. Failures are `Malformed`, terminal
    /// for that single message.
    pub fn from_message(body: &str) -> Result<Self> {
        serde_json::from_str(body)
            .map_err(|e| FacedexError::Malformed(format!("detection task body: {e}")))
    }

    pub fn to_message(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| FacedexError::Malformed(format!("detection task encode: {e}")))
    }
}

/// Serde adapter for the `face_coordinates` wire format.
mod coords {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::BoundingBox;

    pub fn serialize<S>(value: &Option<BoundingBox>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let coords: Vec<i64> = match value {
            Some(b) => b.to_coords().to_vec(),
            None => Vec::new(),
        };
        serializer.collect_seq(coords)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<BoundingBox>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let coords = Vec::<i64>::deserialize(deserializer)?;
        match coords.as_slice() {
            [] => Ok(None),
            [x1, y1, x2, y2] => Ok(Some(BoundingBox::new(*x1, *y1, *x2, *y2))),
            other => Err(D::Error::custom(format!(
                "face_coordinates must have 0 or 4 elements, got {}",
                other.len()
            ))),
        }
    }
}

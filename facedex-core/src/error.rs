use thiserror::Error;

/// Error taxonomy shared across the ingestion pipeline.
///
/// Callers branch on these kinds instead of catching broad error types:
/// `Unavailable` is retryable by the surrounding queue/invocation
/// infrastructure, everything else is terminal for the item that raised it.
#[derive(Error, Debug)]
pub enum FacedexError {
    /// A referenced object or row does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied a malformed key, payload, or parameter.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The face already carries a name; names are never overwritten.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage, queue, or database unreachable within the timeout.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// A queue message body that could not be parsed.
    #[error("malformed message: {0}")]
    Malformed(String),
}

impl FacedexError {
    /// Whether the surrounding infrastructure should redeliver the work item.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<image::ImageError> for FacedexError {
    fn from(err: image::ImageError) -> Self {
        Self::InvalidInput(format!("image processing failed: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, FacedexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_is_retryable() {
        assert!(FacedexError::Unavailable("db down".into()).is_retryable());
        assert!(!FacedexError::NotFound("x".into()).is_retryable());
        assert!(!FacedexError::Conflict("named".into()).is_retryable());
        assert!(!FacedexError::Malformed("not json".into()).is_retryable());
    }

    #[test]
    fn image_error_maps_to_invalid_input() {
        let err = image::load_from_memory(b"not an image").unwrap_err();
        let mapped: FacedexError = err.into();
        assert!(matches!(mapped, FacedexError::InvalidInput(_)));
    }
}

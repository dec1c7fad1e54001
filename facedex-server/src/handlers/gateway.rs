//! Image gateway handler
//!
//! Resolves an opaque key to object-store bytes. Only the `faces/` and
//! `photos/` namespaces are reachable, the key shape is validated before
//! any storage access, and no database is touched on this path.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use facedex_core::{validate_key_segment, FACES_PREFIX, PHOTOS_PREFIX};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters: exactly one of `face` or `photo`.
#[derive(Deserialize)]
pub struct ImageQuery {
    pub face: Option<String>,
    pub photo: Option<String>,
}

/// GET /image?face=<key> | ?photo=<key>
///
/// Returns the raw JPEG bytes, 404 for a missing object, 400 for a key
/// that fails validation (wrong suffix, path separators); the 400 is
/// decided before the store is consulted.
pub async fn image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, ApiError> {
    let (prefix, segment) = match (query.face, query.photo) {
        (Some(face), None) => (FACES_PREFIX, face),
        (None, Some(photo)) => (PHOTOS_PREFIX, photo),
        _ => {
            return Err(ApiError::bad_request(
                "exactly one of 'face' or 'photo' must be provided",
            ))
        }
    };

    validate_key_segment(&segment)?;

    let key = format!("{prefix}{segment}");
    let bytes = state.object_store.get(&key).await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

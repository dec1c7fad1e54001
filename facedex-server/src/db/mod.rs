//! Face store module
//!
//! Persistence for the Face and FaceName tables. Two backends:
//! - **PostgreSQL** (production): `sqlx` pool, migrations, atomic claims
//!   with `FOR UPDATE SKIP LOCKED`.
//! - **In-memory** (development and tests): same semantics, including the
//!   claim lease, behind a mutex.
//!
//! The Indexing Worker inserts Face rows; the claim protocol inserts
//! FaceName rows. No transaction ever spans both components.

mod memory;
mod postgres;

pub use memory::MemoryFaceStore;
pub use postgres::PostgresFaceStore;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use facedex_core::{BoundingBox, Result};
use uuid::Uuid;

/// Input for creating a Face row.
///
/// The worker generates `face_id` fresh for every processed task, so
/// duplicate delivery produces duplicate rows with distinct ids; the
/// documented at-least-once consequence, deliberately not deduplicated.
#[derive(Debug, Clone)]
pub struct NewFace {
    pub face_id: Uuid,
    /// Object-store key of the owning photo.
    pub photo_id: String,
    pub bounding_box: Option<BoundingBox>,
}

/// A face handed out by `claim_unnamed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedFace {
    pub face_id: Uuid,
    pub photo_id: String,
}

/// Full Face row, as read back for diagnostics and tests.
#[derive(Debug, Clone)]
pub struct FaceRecord {
    pub face_id: Uuid,
    pub photo_id: String,
    pub bounding_box: Option<BoundingBox>,
    pub name: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Face/FaceName persistence consumed by the Indexing Worker and the
/// claim protocol.
#[async_trait]
pub trait FaceStore: Send + Sync {
    /// Insert one Face row. Called after the crop is durably stored, never
    /// before.
    async fn insert_face(&self, face: &NewFace) -> Result<()>;

    /// Atomically claim one unnamed face for labeling.
    ///
    /// Picks a face with no FaceName row whose lease is absent or older
    /// than `lease_ttl`, stamps the lease, and returns it. Concurrent
    /// callers never receive the same face while a lease is active.
    async fn claim_unnamed(&self, lease_ttl: Duration) -> Result<Option<ClaimedFace>>;

    /// Insert the FaceName row. `Conflict` if the face is already named;
    /// names are never overwritten. `NotFound` if the face does not exist.
    async fn assign_name(&self, face_id: Uuid, name: &str) -> Result<()>;

    /// Ordered distinct photo keys of every face named exactly `name`.
    async fn find_by_name(&self, name: &str) -> Result<Vec<String>>;

    /// Read one face back, primarily for diagnostics.
    async fn get_face(&self, face_id: Uuid) -> Result<Option<FaceRecord>>;

    /// Number of faces still lacking a name.
    async fn count_unnamed(&self) -> Result<i64>;

    /// Fail-fast connectivity check for readiness probes.
    async fn check_health(&self) -> Result<()>;
}

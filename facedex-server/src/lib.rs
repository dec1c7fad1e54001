//! Facedex Server Library - the photo face-indexing service
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.
//!
//! The pipeline: an upload notification triggers the Detection Worker,
//! which publishes one detection task per photo; the Indexing Worker
//! consumes tasks, stores a face crop, and writes the Face row; the claim
//! protocol hands unnamed faces to the conversational labeling flow; the
//! image gateway serves stored bytes by opaque key.

pub mod claim;
pub mod config;
pub mod consumer;
pub mod db;
pub mod error;
pub mod handlers;
pub mod object_store;
pub mod queue;
pub mod routes;
pub mod state;
pub mod workers;

pub use claim::{LabelSession, LabelState, OfferedFace};
pub use config::Config;
pub use consumer::run_consumer;
pub use db::{
    ClaimedFace, FaceRecord, FaceStore, MemoryFaceStore, NewFace, PostgresFaceStore,
};
pub use error::ApiError;
pub use object_store::{FsObjectStore, MemoryObjectStore, ObjectStore};
pub use queue::{MemoryTaskQueue, QueueMessage, TaskQueue};
pub use routes::create_router;
pub use state::AppState;
pub use workers::{BatchReport, DetectionWorker, IndexingWorker};

//! Application state module
//!
//! Defines shared state accessible across all request handlers. Every
//! external collaborator sits behind its narrow trait, so tests swap in
//! memory backends without touching handler code.

use std::sync::Arc;

use dashmap::DashMap;
use facedex_core::FaceDetector;
use uuid::Uuid;

use crate::config::Config;
use crate::db::FaceStore;
use crate::object_store::ObjectStore;
use crate::queue::TaskQueue;

/// Application state containing shared resources.
#[derive(Clone)]
pub struct AppState {
    /// Photo and face-crop byte storage
    pub object_store: Arc<dyn ObjectStore>,
    /// Face/FaceName persistence
    pub faces: Arc<dyn FaceStore>,
    /// Detection-task transport
    pub queue: Arc<dyn TaskQueue>,
    /// External detection capability
    pub detector: Arc<dyn FaceDetector>,
    /// Server configuration
    pub config: Arc<Config>,
    /// Outstanding labeling offers, keyed by conversation id
    pub offers: Arc<DashMap<i64, Uuid>>,
}

impl AppState {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        faces: Arc<dyn FaceStore>,
        queue: Arc<dyn TaskQueue>,
        detector: Arc<dyn FaceDetector>,
        config: Config,
    ) -> Self {
        Self {
            object_store,
            faces,
            queue,
            detector,
            config: Arc::new(config),
            offers: Arc::new(DashMap::new()),
        }
    }
}

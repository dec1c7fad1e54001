//! Facedex Server - photo face-indexing service
//!
//! Wires the configured backends together, spawns the queue consumer, and
//! serves the HTTP surface: the image gateway, the bot webhook, and the
//! pipeline trigger hooks.

use std::sync::Arc;

use facedex_core::{FaceDetector, HttpDetector, StaticDetector};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use facedex_server::{
    create_router, run_consumer, AppState, Config, FaceStore, FsObjectStore, MemoryFaceStore,
    MemoryTaskQueue, PostgresFaceStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let addr = config.socket_addr();

    let object_store = Arc::new(FsObjectStore::new(config.storage_root.clone()));

    let faces: Arc<dyn FaceStore> = match &config.database_url {
        Some(url) => {
            info!("Using PostgreSQL face store");
            Arc::new(PostgresFaceStore::new(url, config.connect_timeout()).await?)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory face store - faces will be lost on restart!");
            Arc::new(MemoryFaceStore::new())
        }
    };

    let detector: Arc<dyn FaceDetector> = match HttpDetector::from_env() {
        Ok(detector) => {
            info!("Using HTTP detector");
            Arc::new(detector)
        }
        Err(e) => {
            warn!(error = %e, "detector not configured, every photo will index as 'no face found'");
            Arc::new(StaticDetector::none())
        }
    };

    // In-process queue; a hosted queue substrate slots in behind the same
    // trait at deploy time.
    let queue = Arc::new(MemoryTaskQueue::new());

    let state = AppState::new(object_store, faces, queue, detector, config);

    let consumer = tokio::spawn(run_consumer(state.clone()));

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Facedex server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    consumer.abort();
    Ok(())
}

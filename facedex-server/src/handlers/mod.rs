//! HTTP handlers for the ingestion service.

pub mod bot;
pub mod gateway;
pub mod health;
pub mod ingest;

pub use bot::webhook;
pub use gateway::image;
pub use health::{health, ready};
pub use ingest::{photo_uploaded, process_tasks};

//! Pipeline workers
//!
//! The Detection Worker turns upload notifications into detection tasks;
//! the Indexing Worker turns detection tasks into stored crops and Face
//! rows. Both process their batch sequentially and fail fast on
//! infrastructure errors so the queue substrate's retry policy applies.

pub mod detection;
pub mod indexing;

pub use detection::DetectionWorker;
pub use indexing::{BatchReport, IndexingWorker};

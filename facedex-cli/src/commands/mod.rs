//! CLI command implementations.

pub mod find;
pub mod ingest;
pub mod label;
pub mod status;

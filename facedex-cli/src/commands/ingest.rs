//! Ingest command implementation.
//!
//! Copies a photo into the server's storage root and pushes it through
//! the pipeline: upload notification, then a queue drain unless the
//! caller wants the task left for the background consumer.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use facedex_core::{validate_key_segment, PHOTOS_PREFIX};
use serde_json::json;
use tracing::info;

use crate::client::ApiClient;

pub async fn execute(
    client: &ApiClient,
    file: PathBuf,
    storage_root: PathBuf,
    no_process: bool,
) -> Result<()> {
    let Some(object_key) = file.file_name().and_then(|n| n.to_str()).map(String::from) else {
        bail!("file path has no usable name: {}", file.display());
    };
    // Same shape check the gateway applies, so a bad name fails here
    // instead of producing an unreachable object.
    validate_key_segment(&object_key)
        .map_err(|e| anyhow::anyhow!("invalid photo name {object_key:?}: {e}"))?;

    let content = std::fs::read(&file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    info!(path = %file.display(), bytes = content.len(), "Read photo");

    let dest = storage_root.join(PHOTOS_PREFIX).join(&object_key);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to write {}", parent.display()))?;
    }
    std::fs::write(&dest, &content)
        .with_context(|| format!("Failed to copy photo to {}", dest.display()))?;
    info!(path = %dest.display(), "Stored photo");

    let outcome = client
        .post_json(
            "/hooks/photo-uploaded",
            json!({ "records": [ { "object_key": object_key } ] }),
        )
        .await?;
    let published = outcome["published"].as_u64().unwrap_or(0);

    println!();
    println!("{}", "Photo ingested!".green().bold());
    println!();
    println!("   {} {}", "Stored as:".dimmed(), dest.display());
    println!("   {} {published}", "Tasks published:".dimmed());

    if no_process {
        println!(
            "   {} background consumer will index it",
            "Queue:".dimmed()
        );
        return Ok(());
    }

    let outcome = client.post_json("/hooks/process-tasks", json!({})).await?;
    println!(
        "   {} {} indexed, {} dropped",
        "Queue drained:".dimmed(),
        outcome["indexed"].as_u64().unwrap_or(0),
        outcome["dropped"].as_u64().unwrap_or(0)
    );

    Ok(())
}

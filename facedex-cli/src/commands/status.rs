//! Status command: server health at a glance.

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;

pub async fn execute(client: &ApiClient) -> Result<()> {
    let health = client.get_json("/health").await?;

    let status = health["status"].as_str().unwrap_or("unknown");
    let styled = if status == "healthy" {
        status.green().bold()
    } else {
        status.yellow().bold()
    };

    println!("{} {}", "Server:".dimmed(), client.base_url());
    println!("{} {styled}", "Status:".dimmed());
    println!(
        "{} {}",
        "Version:".dimmed(),
        health["version"].as_str().unwrap_or("?")
    );
    println!(
        "{} {}",
        "Database:".dimmed(),
        if health["database_ok"].as_bool().unwrap_or(false) {
            "ok"
        } else {
            "unreachable"
        }
    );
    if let Some(unnamed) = health["unnamed_faces"].as_i64() {
        println!("{} {unnamed}", "Unnamed faces:".dimmed());
    }

    Ok(())
}

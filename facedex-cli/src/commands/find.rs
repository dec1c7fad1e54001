//! Find command: photos containing a named person.

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;

pub async fn execute(client: &ApiClient, name: &str) -> Result<()> {
    let reply = client.bot(&format!("/find {name}")).await?;

    println!("{}", reply["reply"].as_str().unwrap_or("").bold());
    if let Some(urls) = reply["photo_urls"].as_array() {
        for url in urls {
            println!("   {}", url.as_str().unwrap_or(""));
        }
    }

    Ok(())
}

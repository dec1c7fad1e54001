//! Labeling commands: fetch an unnamed face, then name it.

use anyhow::Result;
use colored::Colorize;

use crate::client::ApiClient;

pub async fn getface(client: &ApiClient) -> Result<()> {
    let reply = client.bot("/getface").await?;

    let text = reply["reply"].as_str().unwrap_or("");
    match reply["photo_urls"].as_array().and_then(|a| a.first()) {
        Some(url) => {
            println!("{}", text.green().bold());
            println!();
            println!("   {} {}", "Face:".dimmed(), url.as_str().unwrap_or(""));
            println!(
                "   {} facedex name <NAME>",
                "Reply with:".dimmed()
            );
        }
        None => println!("{text}"),
    }

    Ok(())
}

pub async fn name(client: &ApiClient, name: &str) -> Result<()> {
    let reply = client.bot(name).await?;
    println!("{}", reply["reply"].as_str().unwrap_or("").green());
    Ok(())
}

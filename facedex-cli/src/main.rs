//! Facedex CLI - operator tool for the photo face-indexing service.
//!
//! Talks to a running facedex-server over HTTP. `ingest` additionally
//! needs filesystem access to the server's storage root, so it is meant
//! for co-located use.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

mod client;
mod commands;
mod exit_codes;

#[derive(Parser)]
#[command(name = "facedex")]
#[command(author, version, about = "Photo face indexing and labeling", long_about = None)]
struct Cli {
    /// Base URL of the facedex server
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Conversation id used for the labeling flow
    #[arg(long, global = true, default_value_t = 1)]
    chat: i64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a photo: copy it into the storage root and run the pipeline
    Ingest {
        /// Path to the photo file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Storage root shared with the server
        #[arg(long, default_value = "./storage")]
        storage_root: PathBuf,

        /// Skip draining the task queue after publishing
        #[arg(long)]
        no_process: bool,
    },

    /// Fetch one unnamed face to label
    Getface,

    /// Name the face last offered on this conversation
    Name {
        /// The person's name
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Find photos containing a named person
    Find {
        /// The person's name (exact match)
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Show server health
    Status,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = client::ApiClient::new(cli.server, cli.chat);

    let result = match cli.command {
        Commands::Ingest {
            file,
            storage_root,
            no_process,
        } => commands::ingest::execute(&client, file, storage_root, no_process).await,
        Commands::Getface => commands::label::getface(&client).await,
        Commands::Name { name } => commands::label::name(&client, &name).await,
        Commands::Find { name } => commands::find::execute(&client, &name).await,
        Commands::Status => commands::status::execute(&client).await,
    };

    if let Err(err) = result {
        let exit = exit_codes::ExitCode::from_anyhow(&err);
        eprintln!("{} {:#}", "error:".red().bold(), err);
        std::process::exit(exit.code);
    }
}

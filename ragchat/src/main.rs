//! ragchat - Chat with a retrieval-augmented QA backend from the terminal.
//!
//! Architecture:
//! - The session controller owns the transcript and the request state machine
//! - The gateway talks to the backend's chat and upload endpoints over HTTP
//! - The CLI renders controller events and turns typed lines into operations

mod cli;
mod config;
mod gateway;
mod models;
mod session;
mod transcript;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    execute(cli).await
}

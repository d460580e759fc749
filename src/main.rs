mod catalog;
mod classify;
mod cli;
mod config;
mod error;
mod legacy;
mod locator;
mod parser;
mod paths;
mod platform;
mod registry;
mod scanner;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    cli.execute().await
}

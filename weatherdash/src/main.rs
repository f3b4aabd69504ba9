//! Binary crate for `weatherdash`.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Serving the web form and rendering snapshots

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod templates;
mod web;

/// Log filter used when `RUST_LOG` is not set.
pub(crate) const DEFAULT_LOG_FILTER: &str =
    "weatherdash=info,weatherdash_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}

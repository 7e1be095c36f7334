//! jobfeed CLI: refresh a Markdown table of open job listings.
//!
//! Fetches listings from a search API (or public job boards), keeps the ones
//! whose titles match the target phrases, and writes them into a README.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}

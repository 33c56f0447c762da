mod auth;
mod cli;
mod config;
mod dashboard;
mod error;
mod inputs;
mod output;
mod providers;
mod refresher;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting pipeboard - GitLab pipeline dashboard");
    cli.execute().await?;

    Ok(())
}

//! tictactoe_server - SSH tic-tac-toe
//!
//! Serves the game over SSH, or plays it in the current terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,tictactoe_server=debug";
const LOCAL_LOG_FILE: &str = "tictactoe.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .init();
            tictactoe_server::run_server(args.into()).await
        }
        Command::Play => {
            // Log to a file so output does not corrupt the UI
            let log_file = std::fs::File::create(LOCAL_LOG_FILE)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false)
                .init();
            tictactoe_server::run_local()
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

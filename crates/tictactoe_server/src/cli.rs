//! Command-line interface for tictactoe_server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tictactoe_server::ServeConfig;

/// Two-player tic-tac-toe over SSH
#[derive(Parser, Debug)]
#[command(name = "tictactoe_server")]
#[command(about = "Serve tic-tac-toe as a terminal UI over SSH", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the SSH game server
    Serve(ServeArgs),

    /// Play in the current terminal
    Play,
}

/// Options for the SSH game server
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind to
    #[arg(short, long, env = "PORT", default_value = "23234")]
    pub port: u16,

    /// Host key path; an Ed25519 key is generated here if missing
    #[arg(
        long,
        env = "HOST_KEY_PATH",
        default_value = "/ssh-tictactoe-keys/ssh-tictactoe-key"
    )]
    pub host_key: PathBuf,
}

impl From<ServeArgs> for ServeConfig {
    fn from(args: ServeArgs) -> Self {
        ServeConfig::new(SocketAddr::new(args.host, args.port), args.host_key)
    }
}

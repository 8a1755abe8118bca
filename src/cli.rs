//! Command-line surface: runs the compatibility service by default, or one
//! of the one-shot legacy-forwarding subcommands.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "cardano-p2p-relay", about = "Blockchain-verified peer-discovery relay")]
pub struct Args {
    /// Path to a YAML configuration file.
    #[arg(long, env = "P2P_CONFIG")]
    pub config: Option<String>,

    /// Elevate logging to debug level.
    #[arg(long, env = "P2P_DEBUG")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the compatibility service (vetting pipeline + HTTP server). This
    /// is also what runs when no subcommand is given.
    Serve,
    /// Issue one GET against a legacy directory's fetch endpoint and print
    /// the response.
    Fetch {
        #[arg(long)]
        endpoint_url: String,
        #[arg(long)]
        network: u64,
        #[arg(long, default_value_t = 10)]
        max: u32,
        #[arg(long, default_value_t = 4)]
        ipv: u32,
    },
    /// Read the current block height and push it to a legacy directory.
    Push {
        #[arg(long)]
        endpoint_url: String,
        #[arg(long)]
        network: u64,
        #[arg(long)]
        port: u16,
    },
}

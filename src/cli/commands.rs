use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "audit-chain", about = "Proof-of-audit evidence ledger")]
pub struct Opt {
    #[arg(long = "config", global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        name = "demo",
        about = "Run the evidence/audit scenario on a fresh ledger and print its stats"
    )]
    Demo {
        #[arg(long = "miner", default_value = "miner1", help = "Principal that mines the block")]
        miner: String,
    },
    #[command(
        name = "replay",
        about = "Submit transactions from a JSON file, mine one block, print the result"
    )]
    Replay {
        #[arg(help = "JSON array of transaction requests")]
        file: PathBuf,
        #[arg(long = "miner", help = "Principal that mines the block")]
        miner: String,
    },
    #[command(name = "show-config", about = "Print the effective configuration")]
    ShowConfig,
}

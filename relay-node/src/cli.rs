use clap::Parser;

/// Reduced to the single long-running mode this system needs: no
/// subcommands, matching `cmd/ethrex`'s flag style without its L2/L1 split.
#[derive(Parser, Debug)]
#[command(name = "relay-node", about = "Privacy-preserving escrow unlinker relay")]
pub struct Cli {
    /// Load environment variables from this file before reading config,
    /// on top of whatever the process already has set.
    #[arg(long)]
    pub env_file: Option<String>,

    /// Overrides `PORT` from the environment.
    #[arg(long)]
    pub port: Option<u16>,
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{PeerSelector, DEFAULT_CONFIG_DIR};

#[derive(Parser, Debug)]
#[command(
    name = "wgpeers",
    about = "Manage the peers of a WireGuard server config",
    version
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file, or directory to search for a *.conf file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    pub config: PathBuf,

    /// Config file name inside the --config directory
    #[arg(short, long, global = true)]
    pub file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all peers
    List {
        /// Print peers as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show a single peer
    Show {
        #[command(flatten)]
        selector: SelectorArgs,

        /// Print the peer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add a peer, allocating an address unless one is given
    Add(AddArgs),

    /// Delete a peer by public key
    Delete {
        /// Public key of the peer to remove
        #[arg(long)]
        public_key: String,
    },

    /// Print the address the next peer would get
    NextIp,
}

/// Exactly one way to pick a peer
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SelectorArgs {
    /// Match on AllowedIPs (e.g. 10.0.0.2/32)
    #[arg(long)]
    pub ip: Option<String>,

    /// Match on public key
    #[arg(long)]
    pub public_key: Option<String>,
}

impl SelectorArgs {
    pub fn selector(&self) -> Option<PeerSelector<'_>> {
        match (self.ip.as_deref(), self.public_key.as_deref()) {
            (Some(ip), None) => Some(PeerSelector::Ip(ip)),
            (None, Some(key)) => Some(PeerSelector::PublicKey(key)),
            _ => None,
        }
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Public key of the new peer
    #[arg(long)]
    pub public_key: String,

    /// Address to route to the peer (allocated if omitted)
    #[arg(long)]
    pub allowed_ips: Option<String>,

    /// Remote endpoint as host:port
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Keepalive interval in seconds
    #[arg(long)]
    pub keepalive: Option<u16>,

    #[arg(long)]
    pub preshared_key: Option<String>,

    /// Display name, stored as a comment in the peer section
    #[arg(long)]
    pub name: Option<String>,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

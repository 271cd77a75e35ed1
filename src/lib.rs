//! wgpeers - edit the peer roster of a WireGuard server config
//!
//! This library loads a wg-quick style config file into an interface
//! definition plus an ordered list of peers, lets callers add, delete and
//! look up peers, and hands out IPv4 addresses from the interface's subnet.
//! Nothing here touches the live interface or generates keys; keys are
//! opaque strings.
//!
//! # Features
//!
//! - Round-trip safe load/save: interface comments and unknown keys survive
//! - Peer names carried in `# name` comment lines
//! - Monotonic address allocation that skips `.0` and `.255` of every block
//! - JSON export of peers
//!
//! # Example
//!
//! ```no_run
//! use wgpeers::config::{Peer, WireGuardConfig};
//!
//! let mut config = WireGuardConfig::load("/etc/wireguard/wg0.conf").unwrap();
//! let address = config.next_peer_interface().unwrap();
//! config
//!     .add_peer(Peer::new("<base64-public-key>", address.to_string()))
//!     .unwrap();
//! config.save().unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod network;

pub use error::{Result, WgError};

pub mod discovery;
pub mod name;
pub mod parser;
pub mod sections;
pub mod types;
pub mod wireguard;

pub use discovery::{locate_config, DEFAULT_CONFIG_DIR};
pub use parser::{parse_config, parse_config_file};
pub use types::{Interface, Peer};
pub use wireguard::{PeerSelector, WireGuardConfig};

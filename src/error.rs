use ip_network::Ipv4Network;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WgError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid {field}: {value:?} cannot be written to a config file")]
    InvalidValue { field: &'static str, value: String },

    #[error("Duplicate peer public key: {0}")]
    DuplicatePeer(String),

    #[error("Peer not found: {0}")]
    PeerNotFound(String),

    #[error("No WireGuard config found at {}", .0.display())]
    NoConfigFound(PathBuf),

    #[error("Config has no backing file to save to")]
    NoBackingFile,

    #[error("File error: {0}")]
    File(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum AllocationError {
    #[error("No free address left in {network}")]
    AddressPoolExhausted { network: Ipv4Network },
}

pub type Result<T> = std::result::Result<T, WgError>;

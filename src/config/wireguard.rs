use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, Result, WgError};
use crate::network::{next_host, Ipv4Interface};

use super::discovery::locate_config;
use super::parser::{parse_config, parse_config_file};
use super::sections::{render_sections, RawConfig};
use super::types::{Interface, Peer};

/// How to look a peer up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerSelector<'a> {
    /// Exact match on the AllowedIPs string
    Ip(&'a str),
    PublicKey(&'a str),
}

impl PeerSelector<'_> {
    fn matches(&self, peer: &Peer) -> bool {
        match self {
            PeerSelector::Ip(ip) => peer.allowed_ips == *ip,
            PeerSelector::PublicKey(key) => peer.public_key == *key,
        }
    }
}

impl std::fmt::Display for PeerSelector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeerSelector::Ip(ip) => write!(f, "AllowedIPs {}", ip),
            PeerSelector::PublicKey(key) => write!(f, "PublicKey {}", key),
        }
    }
}

/// A server config: one interface and its ordered peers.
///
/// Public keys are unique within the peer list. Not synchronised; wrap it in
/// a mutex to share between threads.
#[derive(Debug, Clone)]
pub struct WireGuardConfig {
    path: Option<PathBuf>,
    preamble: Vec<String>,
    interface: Interface,
    peers: Vec<Peer>,
}

impl WireGuardConfig {
    pub fn new(interface: Interface) -> Self {
        Self::from_parts(Vec::new(), interface, Vec::new())
    }

    pub(crate) fn from_parts(preamble: Vec<String>, interface: Interface, peers: Vec<Peer>) -> Self {
        Self {
            path: None,
            preamble,
            interface,
            peers,
        }
    }

    /// Load the config file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        parse_config_file(path)
    }

    /// Locate a config (see [`locate_config`]) and load it
    pub fn open<P: AsRef<Path>>(path: P, file_name: Option<&str>) -> Result<Self> {
        let path = locate_config(path.as_ref(), file_name)?;
        parse_config_file(path)
    }

    pub(crate) fn set_path(&mut self, path: &Path) {
        self.path = Some(path.to_path_buf());
    }

    /// File this config was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Append a peer. Its address is taken as given; use
    /// [`WireGuardConfig::next_peer_interface`] or
    /// [`WireGuardConfig::allocate_peer`] to get a fresh one.
    ///
    /// Fails if a field can't be written out as is (see [`Peer::validate`]) or
    /// the public key is already present.
    pub fn add_peer(&mut self, peer: Peer) -> Result<()> {
        peer.validate()?;
        if self.peers.iter().any(|p| p.public_key == peer.public_key) {
            return Err(ConfigError::DuplicatePeer(peer.public_key).into());
        }

        tracing::info!("Adding peer {} ({})", peer.public_key, peer.allowed_ips);
        self.peers.push(peer);
        Ok(())
    }

    /// Remove the peer with the same public key as `peer`.
    ///
    /// Returns the removed peer; a peer that isn't present is ignored.
    pub fn delete_peer(&mut self, peer: &Peer) -> Option<Peer> {
        let idx = self
            .peers
            .iter()
            .position(|p| p.public_key == peer.public_key)?;

        let removed = self.peers.remove(idx);
        tracing::info!("Deleted peer {} ({})", removed.public_key, removed.allowed_ips);
        Some(removed)
    }

    /// First peer matching `selector`
    pub fn get_peer(&self, selector: PeerSelector<'_>) -> Option<&Peer> {
        self.peers.iter().find(|p| selector.matches(p))
    }

    /// Like [`WireGuardConfig::get_peer`], but a miss is an error
    pub fn require_peer(&self, selector: PeerSelector<'_>) -> Result<&Peer> {
        self.get_peer(selector)
            .ok_or_else(|| ConfigError::PeerNotFound(selector.to_string()).into())
    }

    /// Address for the next peer: the successor of the highest address in
    /// use, or of the interface's own address when no peer has one.
    ///
    /// Allocation only moves forward, addresses of deleted peers are not
    /// handed out again.
    pub fn next_peer_interface(&self) -> Result<Ipv4Interface> {
        let highest = self
            .peers
            .iter()
            .filter_map(|peer| {
                let addr = peer.address();
                if addr.is_none() {
                    tracing::warn!(
                        "Peer {} has no IPv4 address in AllowedIPs {:?}, ignoring it for allocation",
                        peer.public_key,
                        peer.allowed_ips
                    );
                }
                addr
            })
            .max()
            .unwrap_or(self.interface.address);

        Ok(next_host(highest, self.interface.address.network())?)
    }

    /// Add `peer`, giving it the next free address if its AllowedIPs is
    /// empty. Returns the peer's address.
    pub fn allocate_peer(&mut self, mut peer: Peer) -> Result<String> {
        if peer.allowed_ips.trim().is_empty() {
            peer.allowed_ips = self.next_peer_interface()?.to_string();
        }
        let allowed_ips = peer.allowed_ips.clone();
        self.add_peer(peer)?;
        Ok(allowed_ips)
    }

    /// Flatten interface and peers to raw sections
    pub fn to_raw(&self) -> RawConfig {
        RawConfig {
            preamble: self.preamble.clone(),
            interface: self.interface.to_raw(),
            peers: self.peers.iter().map(Peer::to_raw).collect(),
        }
    }

    /// Config file text
    pub fn render(&self) -> String {
        render_sections(&self.to_raw())
    }

    /// Write back to the file this config was loaded from
    pub fn save(&self) -> Result<()> {
        let path = self.path.as_deref().ok_or(ConfigError::NoBackingFile)?;
        self.save_to(path)
    }

    /// Write to `path`. The text goes to a sibling `.tmp` file first and is
    /// renamed over `path`, so an interrupted save leaves the old file intact.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let temp_path = staging_path(path);
        fs::write(&temp_path, self.render())?;
        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        tracing::info!("Saved {} peers to {}", self.peers.len(), path.display());
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

impl FromStr for WireGuardConfig {
    type Err = WgError;

    fn from_str(s: &str) -> Result<Self> {
        parse_config(s)
    }
}

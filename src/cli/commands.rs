use std::path::Path;

use crate::config::{Peer, WireGuardConfig};
use crate::error::{ConfigError, Result, WgError};

use super::args::{AddArgs, SelectorArgs};

fn open(config: &Path, file: Option<&str>) -> Result<WireGuardConfig> {
    let wg = WireGuardConfig::open(config, file)?;
    if let Some(path) = wg.path() {
        tracing::info!("Using config {}", path.display());
    }
    Ok(wg)
}

fn describe(peer: &Peer) -> String {
    format!(
        "{:<20} {:<18} {}",
        peer.name.as_deref().unwrap_or("-"),
        peer.allowed_ips,
        peer.public_key
    )
}

fn peers_json(peers: &[Peer]) -> Result<String> {
    Ok(serde_json::to_string_pretty(peers)?)
}

/// Execute the 'list' command
pub fn cmd_list(config: &Path, file: Option<&str>, json: bool) -> Result<()> {
    let wg = open(config, file)?;

    if json {
        println!("{}", peers_json(wg.peers())?);
        return Ok(());
    }

    for peer in wg.peers() {
        println!("{}", describe(peer));
    }

    Ok(())
}

/// Execute the 'show' command
pub fn cmd_show(config: &Path, file: Option<&str>, selector: &SelectorArgs, json: bool) -> Result<()> {
    let wg = open(config, file)?;
    let selector = selector
        .selector()
        .ok_or_else(|| WgError::Other("Give exactly one of --ip or --public-key".to_string()))?;
    let peer = wg.require_peer(selector)?;

    if json {
        println!("{}", serde_json::to_string_pretty(peer)?);
    } else {
        println!("{}", describe(peer));
        if let Some(endpoint) = &peer.endpoint {
            println!("  endpoint: {}", endpoint);
        }
        if let Some(keepalive) = peer.persistent_keepalive {
            println!("  persistent keepalive: {}s", keepalive);
        }
        if peer.preshared_key.is_some() {
            println!("  preshared key: (set)");
        }
    }

    Ok(())
}

/// Execute the 'add' command
pub fn cmd_add(config: &Path, file: Option<&str>, args: AddArgs) -> Result<()> {
    let mut wg = open(config, file)?;

    let peer = Peer {
        public_key: args.public_key,
        allowed_ips: args.allowed_ips.unwrap_or_default(),
        endpoint: args.endpoint,
        persistent_keepalive: args.keepalive,
        preshared_key: args.preshared_key,
        name: args.name,
    };

    let address = wg.allocate_peer(peer)?;
    wg.save()?;

    println!("{}", address);

    Ok(())
}

/// Execute the 'delete' command
pub fn cmd_delete(config: &Path, file: Option<&str>, public_key: String) -> Result<()> {
    let mut wg = open(config, file)?;

    let target = Peer::new(public_key, String::new());
    if wg.delete_peer(&target).is_none() {
        return Err(ConfigError::PeerNotFound(target.public_key).into());
    }
    wg.save()?;

    Ok(())
}

/// Execute the 'next-ip' command
pub fn cmd_next_ip(config: &Path, file: Option<&str>) -> Result<()> {
    let wg = open(config, file)?;
    println!("{}", wg.next_peer_interface()?);
    Ok(())
}

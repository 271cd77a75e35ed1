use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};

use super::sections::parse_sections;
use super::types::{Interface, Peer};
use super::wireguard::WireGuardConfig;

/// Parse a WireGuard configuration file
pub fn parse_config_file<P: AsRef<Path>>(path: P) -> Result<WireGuardConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(ConfigError::File)?;

    let mut config = parse_config(&content)?;
    config.set_path(path);

    tracing::debug!(
        "Loaded {} with {} peers",
        path.display(),
        config.peers().len()
    );

    Ok(config)
}

/// Parse WireGuard configuration text. The result has no backing file.
pub fn parse_config(content: &str) -> Result<WireGuardConfig> {
    let raw = parse_sections(content)?;

    let interface = Interface::from_raw(&raw.interface)?;

    let mut seen = HashSet::new();
    let mut peers = Vec::with_capacity(raw.peers.len());
    for section in &raw.peers {
        let peer = Peer::from_raw(section)?;
        if !seen.insert(peer.public_key.clone()) {
            return Err(ConfigError::DuplicatePeer(peer.public_key).into());
        }
        peers.push(peer);
    }

    Ok(WireGuardConfig::from_parts(raw.preamble, interface, peers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = parse_config(
            "[Interface]\nPrivateKey = p\nAddress = 10.0.0.0/18\n\n[Peer]\n# alice\nPublicKey = a\nAllowedIPs = 10.0.0.2/32\n",
        )
        .unwrap();
        assert_eq!(config.interface().address.to_string(), "10.0.0.0/18");
        assert_eq!(config.peers().len(), 1);
        assert_eq!(config.peers()[0].name.as_deref(), Some("alice"));
        assert!(config.path().is_none());
    }

    #[test]
    fn test_parse_config_rejects_duplicate_keys() {
        let err = parse_config(
            "[Interface]\nPrivateKey = p\nAddress = 10.0.0.0/18\n[Peer]\nPublicKey = a\nAllowedIPs = 10.0.0.2/32\n[Peer]\nPublicKey = a\nAllowedIPs = 10.0.0.3/32\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::WgError::Config(ConfigError::DuplicatePeer(ref key)) if key == "a"
        ));
    }

    #[test]
    fn test_parse_config_peer_missing_field() {
        let err = parse_config("[Interface]\nPrivateKey = p\nAddress = 10.0.0.0/18\n[Peer]\nPublicKey = a\n")
            .unwrap_err();
        assert!(matches!(
            err,
            crate::WgError::Config(ConfigError::MissingField("AllowedIPs"))
        ));
    }

    #[test]
    fn test_parse_config_file_missing() {
        let err = parse_config_file("/nonexistent/wg0.conf").unwrap_err();
        assert!(matches!(err, crate::WgError::Config(ConfigError::File(_))));
    }
}

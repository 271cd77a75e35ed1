use ip_network::Ipv4Network;
use std::cmp::Ordering;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ConfigError;

/// An IPv4 address together with the prefix length it was configured with
/// (e.g. `10.0.0.1/24`).
///
/// Unlike [`Ipv4Network`], host bits may be set. The containing network is
/// available through [`Ipv4Interface::network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Interface {
    addr: Ipv4Addr,
    prefix: u8,
    network: Ipv4Network,
}

impl Ipv4Interface {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, ConfigError> {
        let network = Ipv4Network::new_truncate(addr, prefix)
            .map_err(|_| ConfigError::InvalidAddress(format!("{}/{}", addr, prefix)))?;
        Ok(Self {
            addr,
            prefix,
            network,
        })
    }

    /// Single-host interface (`/32`)
    pub fn host(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            prefix: 32,
            network: Ipv4Network::from(addr),
        }
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// The network this address belongs to, host bits cleared
    pub fn network(&self) -> Ipv4Network {
        self.network
    }

    /// Parse the first IPv4 entry of a comma-separated address list,
    /// skipping IPv6 and malformed entries.
    pub fn first_in_list(list: &str) -> Option<Self> {
        list.split(',').find_map(|entry| entry.trim().parse().ok())
    }
}

impl FromStr for Ipv4Interface {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidAddress(s.to_string());

        // Addresses without CIDR notation are single hosts
        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, prefix.parse::<u8>().map_err(|_| invalid())?),
            None => (s, 32),
        };
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;

        Self::new(addr, prefix).map_err(|_| invalid())
    }
}

impl Ord for Ipv4Interface {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.addr, self.prefix).cmp(&(other.addr, other.prefix))
    }
}

impl PartialOrd for Ipv4Interface {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Ipv4Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

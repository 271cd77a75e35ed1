use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::network::Ipv4Interface;

use super::name;
use super::sections::{Section, NAME_KEY};

const PRIVATE_KEY: &str = "PrivateKey";
const LISTEN_PORT: &str = "ListenPort";
const ADDRESS: &str = "Address";

const PUBLIC_KEY: &str = "PublicKey";
const ALLOWED_IPS: &str = "AllowedIPs";
const ENDPOINT: &str = "Endpoint";
const PERSISTENT_KEEPALIVE: &str = "PersistentKeepalive";
const PRESHARED_KEY: &str = "PresharedKey";

const PEER_KEYS: [&str; 6] = [
    PUBLIC_KEY,
    ALLOWED_IPS,
    ENDPOINT,
    PERSISTENT_KEEPALIVE,
    PRESHARED_KEY,
    NAME_KEY,
];

/// [Interface] section configuration
#[derive(Clone)]
pub struct Interface {
    /// Private key for this interface, kept opaque
    pub private_key: String,
    /// UDP listen port
    pub listen_port: Option<u16>,
    /// Own address; its network is the pool peers are allocated from
    pub address: Ipv4Interface,
    /// Section as read from disk: comments and keys we don't model are
    /// written back from here
    raw: Section,
}

impl std::fmt::Debug for Interface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interface")
            .field("address", &self.address)
            .field("listen_port", &self.listen_port)
            .finish_non_exhaustive()
    }
}

impl Interface {
    pub fn new(private_key: impl Into<String>, address: Ipv4Interface) -> Self {
        Self {
            private_key: private_key.into(),
            listen_port: None,
            address,
            raw: Section::new(),
        }
    }

    pub fn from_raw(section: &Section) -> Result<Self> {
        let private_key = section
            .get(PRIVATE_KEY)
            .ok_or(ConfigError::MissingField(PRIVATE_KEY))?;

        let address = section
            .get(ADDRESS)
            .ok_or(ConfigError::MissingField(ADDRESS))?;
        let address = Ipv4Interface::first_in_list(address)
            .ok_or_else(|| ConfigError::InvalidAddress(address.to_string()))?;

        let listen_port = section
            .get(LISTEN_PORT)
            .map(|s| {
                s.parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort(s.to_string()))
            })
            .transpose()?;

        Ok(Self {
            private_key: private_key.to_string(),
            listen_port,
            address,
            raw: section.clone(),
        })
    }

    /// Flatten back to a raw section, keeping the original entry order
    pub fn to_raw(&self) -> Section {
        let mut section = self.raw.clone();

        section.set(PRIVATE_KEY, self.private_key.as_str());

        match self.listen_port {
            Some(port) => section.set(LISTEN_PORT, port.to_string()),
            None => section.remove(LISTEN_PORT),
        }

        // Leave address lists (e.g. with an IPv6 entry) untouched unless the
        // IPv4 address itself changed
        let unchanged = section
            .get(ADDRESS)
            .and_then(Ipv4Interface::first_in_list)
            .is_some_and(|addr| addr == self.address);
        if !unchanged {
            section.set(ADDRESS, self.address.to_string());
        }

        section
    }
}

/// [Peer] section configuration
///
/// The serde form is the JSON export: same keys and values as [`Peer::to_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Public key of this peer, unique within a config
    #[serde(rename = "PublicKey")]
    pub public_key: String,
    /// Address(es) routed to this peer; the first IPv4 entry is its pool address
    #[serde(rename = "AllowedIPs")]
    pub allowed_ips: String,
    /// Remote endpoint as `host:port`
    #[serde(rename = "Endpoint", default, skip_serializing_if = "is_blank")]
    pub endpoint: Option<String>,
    /// Keepalive interval in seconds. Zero is not written out.
    #[serde(
        rename = "PersistentKeepalive",
        default,
        skip_serializing_if = "is_unset"
    )]
    pub persistent_keepalive: Option<u16>,
    #[serde(rename = "PresharedKey", default, skip_serializing_if = "is_blank")]
    pub preshared_key: Option<String>,
    /// Display name, without the comment marker
    #[serde(
        rename = "Name",
        default,
        skip_serializing_if = "is_blank",
        serialize_with = "name::serialize_encoded",
        deserialize_with = "name::deserialize_decoded"
    )]
    pub name: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn is_unset(value: &Option<u16>) -> bool {
    value.map_or(true, |v| v == 0)
}

fn invalid(field: &'static str, value: &str) -> crate::WgError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
    }
    .into()
}

impl Peer {
    pub fn new(public_key: impl Into<String>, allowed_ips: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            allowed_ips: allowed_ips.into(),
            endpoint: None,
            persistent_keepalive: None,
            preshared_key: None,
            name: None,
        }
    }

    pub fn from_raw(section: &Section) -> Result<Self> {
        let public_key = section
            .get(PUBLIC_KEY)
            .ok_or(ConfigError::MissingField(PUBLIC_KEY))?;
        let allowed_ips = section
            .get(ALLOWED_IPS)
            .ok_or(ConfigError::MissingField(ALLOWED_IPS))?;

        let persistent_keepalive = section
            .get(PERSISTENT_KEEPALIVE)
            .map(|s| {
                s.parse::<u16>()
                    .map_err(|_| ConfigError::Parse(format!("Invalid PersistentKeepalive: {}", s)))
            })
            .transpose()?;

        for (key, _) in section.fields() {
            if !PEER_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                tracing::debug!("Dropping unsupported key {} of peer {}", key, public_key);
            }
        }

        Ok(Self {
            public_key: public_key.to_string(),
            allowed_ips: allowed_ips.to_string(),
            endpoint: section.get(ENDPOINT).map(String::from),
            persistent_keepalive,
            preshared_key: section.get(PRESHARED_KEY).map(String::from),
            name: name::decode(section.get(NAME_KEY)).map(String::from),
        })
    }

    /// Flatten to a raw section. Optional fields are only written when set
    /// and non-empty; a keepalive of 0 counts as unset.
    pub fn to_raw(&self) -> Section {
        let mut section = Section::new();
        section.push_field(PUBLIC_KEY, self.public_key.as_str());
        section.push_field(ALLOWED_IPS, self.allowed_ips.as_str());

        if let Some(endpoint) = self.endpoint.as_deref().filter(|s| !s.is_empty()) {
            section.push_field(ENDPOINT, endpoint);
        }
        if let Some(keepalive) = self.persistent_keepalive.filter(|&v| v > 0) {
            section.push_field(PERSISTENT_KEEPALIVE, keepalive.to_string());
        }
        if let Some(psk) = self.preshared_key.as_deref().filter(|s| !s.is_empty()) {
            section.push_field(PRESHARED_KEY, psk);
        }
        let label = self.name.as_deref().filter(|s| !s.is_empty());
        if let Some(encoded) = name::encode(label) {
            section.push_field(NAME_KEY, encoded);
        }

        section
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check that every field survives a write and reload unchanged.
    ///
    /// Control characters (line breaks in particular) are rejected everywhere.
    /// Key/value fields may not start or end with whitespace, the reader trims
    /// it; the name may, since it is written as a whole comment line.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (PUBLIC_KEY, Some(self.public_key.as_str())),
            (ALLOWED_IPS, Some(self.allowed_ips.as_str())),
            (ENDPOINT, self.endpoint.as_deref()),
            (PRESHARED_KEY, self.preshared_key.as_deref()),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                if value.chars().any(char::is_control) || value.trim() != value {
                    return Err(invalid(field, value));
                }
            }
        }

        if let Some(label) = self.name.as_deref() {
            if label.chars().any(char::is_control) {
                return Err(invalid(NAME_KEY, label));
            }
        }

        Ok(())
    }

    /// The pool address of this peer: first IPv4 entry of AllowedIPs
    pub fn address(&self) -> Option<Ipv4Interface> {
        Ipv4Interface::first_in_list(&self.allowed_ips)
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::validators::is_wireguard_key;
use crate::{ErrorKind, NetplanError};

pub const WIREGUARD_DEFAULT_PORT: u16 = 51820;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum TunnelMode {
    Ipip,
    Sit,
    Gre,
    Ip6gre,
    Vti,
    Vti6,
    Ip6ip6,
    Ipip6,
    Gretap,
    Ip6gretap,
    Isatap,
    Wireguard,
}

impl TunnelMode {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "ipip" => Some(Self::Ipip),
            "sit" => Some(Self::Sit),
            "gre" => Some(Self::Gre),
            "ip6gre" => Some(Self::Ip6gre),
            "vti" => Some(Self::Vti),
            "vti6" => Some(Self::Vti6),
            "ip6ip6" => Some(Self::Ip6ip6),
            "ipip6" => Some(Self::Ipip6),
            "gretap" => Some(Self::Gretap),
            "ip6gretap" => Some(Self::Ip6gretap),
            "isatap" => Some(Self::Isatap),
            "wireguard" => Some(Self::Wireguard),
            _ => None,
        }
    }

    /// Whether this mode supports mode-specific input/output keys.
    pub(crate) fn supports_io_keys(&self) -> bool {
        matches!(
            self,
            Self::Gre
                | Self::Ip6gre
                | Self::Gretap
                | Self::Ip6gretap
                | Self::Vti
                | Self::Vti6
        )
    }
}

impl std::fmt::Display for TunnelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // serde already knows the kebab-case wire names, reuse them.
        let s = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", s.trim())
    }
}

/// NetworkManager secret handling flags for tunnel private keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyFlags(pub(crate) u32);

impl KeyFlags {
    pub const AGENT_OWNED: u32 = 1 << 1;
    pub const NOT_SAVED: u32 = 1 << 2;
    pub const NOT_REQUIRED: u32 = 1 << 3;

    pub(crate) const NAMES: [(&'static str, u32); 3] = [
        ("agent-owned", Self::AGENT_OWNED),
        ("not-saved", Self::NOT_SAVED),
        ("not-required", Self::NOT_REQUIRED),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Tunnel specific settings of a netdef, including the wireguard private
/// key. The local/remote endpoints live here, the parent `link:` (for
/// vxlan) lives on the netdef itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct TunnelSettings {
    pub mode: Option<TunnelMode>,
    pub local: Option<String>,
    pub remote: Option<String>,
    pub input_key: Option<String>,
    pub output_key: Option<String>,
    /// Wireguard: 44 char base64 key or an absolute path to a key file
    /// (networkd only). Other modes: uint or dotted quad.
    pub private_key: Option<String>,
    pub private_key_flags: KeyFlags,
    pub ttl: Option<u32>,
    /// Wireguard listen port.
    pub port: Option<u16>,
    pub fwmark: Option<u32>,
}

impl TunnelSettings {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One `peers:` entry of a wireguard tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct WireguardPeer {
    pub public_key: Option<String>,
    pub preshared_key: Option<String>,
    /// `host:port` or `[ipv6]:port`.
    pub endpoint: Option<String>,
    pub keepalive: Option<u16>,
    pub allowed_ips: Vec<String>,
}

impl WireguardPeer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn validate(
        &self,
        netdef_id: &str,
    ) -> Result<(), NetplanError> {
        match self.public_key.as_deref() {
            None => {
                return Err(NetplanError::new(
                    ErrorKind::ConfigValidation,
                    format!(
                        "{netdef_id}: a wireguard peer is missing its \
                        public key"
                    ),
                ));
            }
            Some(key) if !is_wireguard_key(key) => {
                return Err(NetplanError::new(
                    ErrorKind::ConfigValidation,
                    format!(
                        "{netdef_id}: invalid wireguard public key '{key}'"
                    ),
                ));
            }
            _ => (),
        }
        if self.allowed_ips.is_empty() {
            return Err(NetplanError::new(
                ErrorKind::ConfigValidation,
                format!(
                    "{netdef_id}: wireguard peer needs to have at least \
                    one address configured in allowed-ips"
                ),
            ));
        }
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Kind of a network interface definition. The serialized names match the
/// plural section names of the YAML schema minus the trailing `s` where
/// one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum DeviceType {
    Ethernet,
    Wifi,
    Modem,
    Bridge,
    Bond,
    Vlan,
    Vrf,
    Tunnel,
    Vxlan,
    OvsPort,
    Dummy,
    Veth,
    SriovVf,
    /// A keyfile connection of a type netplan does not model, kept alive
    /// purely through passthrough.
    NmPassthrough,
    /// Auto-created stand-in for a referenced but undefined interface,
    /// promoted to a concrete type on first real definition.
    Placeholder,
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::Ethernet
    }
}

impl DeviceType {
    /// Fixed emission order of the per-type groups in generated YAML.
    pub(crate) const ALL: [Self; 15] = [
        Self::Ethernet,
        Self::Wifi,
        Self::Modem,
        Self::Bridge,
        Self::Bond,
        Self::Vlan,
        Self::Vrf,
        Self::Tunnel,
        Self::Vxlan,
        Self::OvsPort,
        Self::Dummy,
        Self::Veth,
        Self::SriovVf,
        Self::NmPassthrough,
        Self::Placeholder,
    ];

    /// The plural YAML section this type is parsed from and emitted to.
    /// `None` for types which never appear as their own section.
    pub(crate) fn section(&self) -> Option<&'static str> {
        match self {
            Self::Ethernet | Self::SriovVf => Some("ethernets"),
            Self::Wifi => Some("wifis"),
            Self::Modem => Some("modems"),
            Self::Bridge => Some("bridges"),
            Self::Bond => Some("bonds"),
            Self::Vlan => Some("vlans"),
            Self::Vrf => Some("vrfs"),
            Self::Tunnel | Self::Vxlan => Some("tunnels"),
            Self::Dummy => Some("dummy-devices"),
            Self::Veth => Some("virtual-ethernets"),
            Self::NmPassthrough => Some("nm-devices"),
            Self::OvsPort | Self::Placeholder => None,
        }
    }

    pub fn is_physical(&self) -> bool {
        matches!(
            self,
            Self::Ethernet | Self::Wifi | Self::Modem | Self::SriovVf
        )
    }

    pub(crate) fn is_virtual(&self) -> bool {
        !self.is_physical()
            && !matches!(self, Self::NmPassthrough | Self::Placeholder)
    }
}

impl From<&str> for DeviceType {
    fn from(s: &str) -> Self {
        match s {
            "ethernet" => Self::Ethernet,
            "wifi" => Self::Wifi,
            "modem" => Self::Modem,
            "bridge" => Self::Bridge,
            "bond" => Self::Bond,
            "vlan" => Self::Vlan,
            "vrf" => Self::Vrf,
            "tunnel" => Self::Tunnel,
            "vxlan" => Self::Vxlan,
            "ovs-port" => Self::OvsPort,
            "dummy" => Self::Dummy,
            "veth" => Self::Veth,
            "sriov-vf" => Self::SriovVf,
            _ => Self::NmPassthrough,
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ethernet => "ethernet",
                Self::Wifi => "wifi",
                Self::Modem => "modem",
                Self::Bridge => "bridge",
                Self::Bond => "bond",
                Self::Vlan => "vlan",
                Self::Vrf => "vrf",
                Self::Tunnel => "tunnel",
                Self::Vxlan => "vxlan",
                Self::OvsPort => "ovs-port",
                Self::Dummy => "dummy",
                Self::Veth => "veth",
                Self::SriovVf => "sriov-vf",
                Self::NmPassthrough => "nm-passthrough",
                Self::Placeholder => "placeholder",
            }
        )
    }
}

/// Subsystem consuming a rendered netdef.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum NetplanBackend {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "networkd")]
    Networkd,
    #[serde(rename = "NetworkManager")]
    NetworkManager,
    #[serde(rename = "OpenVSwitch")]
    Ovs,
}

impl Default for NetplanBackend {
    fn default() -> Self {
        Self::None
    }
}

impl NetplanBackend {
    pub(crate) fn from_renderer(s: &str) -> Option<Self> {
        match s {
            "networkd" => Some(Self::Networkd),
            "NetworkManager" => Some(Self::NetworkManager),
            _ => None,
        }
    }
}

impl std::fmt::Display for NetplanBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::None => "none",
                Self::Networkd => "networkd",
                Self::NetworkManager => "NetworkManager",
                Self::Ovs => "OpenVSwitch",
            }
        )
    }
}

/// Wake-on-LAN trigger flags, `wakeonlan: true` maps to `Magic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WolFlags(pub(crate) u32);

impl WolFlags {
    pub const PHY: u32 = 1 << 1;
    pub const UNICAST: u32 = 1 << 2;
    pub const MULTICAST: u32 = 1 << 3;
    pub const BROADCAST: u32 = 1 << 4;
    pub const ARP: u32 = 1 << 5;
    pub const MAGIC: u32 = 1 << 6;
    pub const SECURE: u32 = 1 << 7;
    pub const DISCONNECT: u32 = 1 << 8;

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Wireless wake triggers for `wakeonwlan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WowlanFlags(pub(crate) u32);

impl WowlanFlags {
    pub const ANY: u32 = 1 << 1;
    pub const DISCONNECT: u32 = 1 << 2;
    pub const MAGIC: u32 = 1 << 3;
    pub const GTK_REKEY_FAILURE: u32 = 1 << 4;
    pub const EAP_IDENTITY_REQ: u32 = 1 << 5;
    pub const FOUR_WAY_HANDSHAKE: u32 = 1 << 6;
    pub const RFKILL_RELEASE: u32 = 1 << 7;
    pub const TCP: u32 = 1 << 8;
    pub const DEFAULT: u32 = 1 << 9;

    pub(crate) const NAMES: [(&'static str, u32); 9] = [
        ("any", Self::ANY),
        ("disconnect", Self::DISCONNECT),
        ("magic_pkt", Self::MAGIC),
        ("gtk_rekey_failure", Self::GTK_REKEY_FAILURE),
        ("eap_identity_req", Self::EAP_IDENTITY_REQ),
        ("four_way_handshake", Self::FOUR_WAY_HANDSHAKE),
        ("rfkill_release", Self::RFKILL_RELEASE),
        ("tcp", Self::TCP),
        ("default", Self::DEFAULT),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Address families an interface waits for before being considered up
/// even without carrier (`optional-addresses`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionalAddressFlags(pub(crate) u32);

impl OptionalAddressFlags {
    pub const IPV4_LL: u32 = 1 << 1;
    pub const IPV6_RA: u32 = 1 << 2;
    pub const DHCP4: u32 = 1 << 3;
    pub const DHCP6: u32 = 1 << 4;
    pub const STATIC: u32 = 1 << 5;

    pub(crate) const NAMES: [(&'static str, u32); 5] = [
        ("ipv4-ll", Self::IPV4_LL),
        ("ipv6-ra", Self::IPV6_RA),
        ("dhcp4", Self::DHCP4),
        ("dhcp6", Self::DHCP6),
        ("static", Self::STATIC),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Router-advertisement acceptance, `accept-ra`. Unset leaves the kernel
/// default untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaMode {
    Kernel,
    Enabled,
    Disabled,
}

impl Default for RaMode {
    fn default() -> Self {
        Self::Kernel
    }
}

/// `ipv6-address-generation` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum AddrGenMode {
    Eui64,
    StablePrivacy,
}

impl std::fmt::Display for AddrGenMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Eui64 => "eui64",
                Self::StablePrivacy => "stable-privacy",
            }
        )
    }
}

/// `dhcp-identifier`, networkd only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DhcpIdentifier {
    Duid,
    Mac,
}

impl Default for DhcpIdentifier {
    fn default() -> Self {
        Self::Duid
    }
}

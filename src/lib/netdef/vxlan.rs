// SPDX-License-Identifier: Apache-2.0

pub const VXLAN_VNI_MAX: u32 = 16_777_216;
pub const VXLAN_FLOW_LABEL_MAX: u32 = 1_048_575;

/// Netlink notification toggles (`notifications:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VxlanNotifications(pub(crate) u32);

impl VxlanNotifications {
    pub const L2_MISS: u32 = 1 << 1;
    pub const L3_MISS: u32 = 1 << 2;

    pub(crate) const NAMES: [(&'static str, u32); 2] =
        [("l2-miss", Self::L2_MISS), ("l3-miss", Self::L3_MISS)];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Checksum offload toggles (`checksums:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VxlanChecksums(pub(crate) u32);

impl VxlanChecksums {
    pub const UDP: u32 = 1 << 1;
    pub const ZERO_UDP6_TX: u32 = 1 << 2;
    pub const ZERO_UDP6_RX: u32 = 1 << 3;
    pub const REMOTE_TX: u32 = 1 << 4;
    pub const REMOTE_RX: u32 = 1 << 5;

    pub(crate) const NAMES: [(&'static str, u32); 5] = [
        ("udp", Self::UDP),
        ("zero-udp6-tx", Self::ZERO_UDP6_TX),
        ("zero-udp6-rx", Self::ZERO_UDP6_RX),
        ("remote-tx", Self::REMOTE_TX),
        ("remote-rx", Self::REMOTE_RX),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// Protocol extension toggles (`extensions:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VxlanExtensions(pub(crate) u32);

impl VxlanExtensions {
    pub const GROUP_POLICY: u32 = 1 << 1;
    pub const GENERIC_PROTOCOL: u32 = 1 << 2;

    pub(crate) const NAMES: [(&'static str, u32); 2] = [
        ("group-policy", Self::GROUP_POLICY),
        ("generic-protocol", Self::GENERIC_PROTOCOL),
    ];

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// VXLAN specific settings. The underlay device reference (`link:`)
/// lives on the netdef as `vxlan_link`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct VxlanSettings {
    /// VXLAN network identifier, `id:` in YAML. 0..=16777216.
    pub vni: Option<u32>,
    pub ttl: Option<u32>,
    pub tos: Option<u8>,
    /// 0..=1048575.
    pub flow_label: Option<u32>,
    pub mac_learning: Option<bool>,
    /// FDB ageing in seconds.
    pub ageing: Option<u32>,
    /// Maximum number of FDB entries.
    pub limit: Option<u32>,
    pub arp_proxy: Option<bool>,
    pub short_circuit: Option<bool>,
    pub do_not_fragment: Option<bool>,
    pub port: Option<u16>,
    pub port_range: Option<(u16, u16)>,
    pub notifications: VxlanNotifications,
    pub checksums: VxlanChecksums,
    pub extensions: VxlanExtensions,
}

impl VxlanSettings {
    pub fn new() -> Self {
        Self::default()
    }
}

// SPDX-License-Identifier: Apache-2.0

mod address;
mod auth;
mod bond;
mod bridge;
mod dhcp;
mod modem;
mod nm;
mod ovs;
mod route;
mod tunnel;
mod vxlan;
mod wifi;

pub use self::address::Address;
pub use self::auth::{
    AuthenticationSettings, EapMethod, KeyManagementType, PmfMode,
};
pub use self::bond::BondParameters;
pub use self::bridge::BridgeParameters;
pub use self::dhcp::DhcpOverrides;
pub use self::modem::ModemParameters;
pub use self::nm::NetworkManagerSettings;
pub use self::ovs::{OvsController, OvsSettings, OvsSsl};
pub use self::route::{
    IpRoute, IpRule, RouteScope, RouteType, ROUTE_TABLE_MAIN,
};
pub use self::tunnel::{
    KeyFlags, TunnelMode, TunnelSettings, WireguardPeer,
    WIREGUARD_DEFAULT_PORT,
};
pub use self::vxlan::{
    VxlanChecksums, VxlanExtensions, VxlanNotifications, VxlanSettings,
    VXLAN_FLOW_LABEL_MAX, VXLAN_VNI_MAX,
};
pub use self::wifi::{WifiAccessPoint, WifiBand, WifiMode};

use crate::buffer::{copy_opt_str_to_buffer, copy_str_to_buffer};
use crate::types::{
    AddrGenMode, DeviceType, DhcpIdentifier, NetplanBackend,
    OptionalAddressFlags, RaMode, WowlanFlags,
};

/// `match:` selector binding a netdef to kernel interfaces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct MatchSettings {
    /// Driver glob, multiple globs joined by tab.
    pub driver: Option<String>,
    pub mac: Option<String>,
    pub original_name: Option<String>,
}

impl MatchSettings {
    pub(crate) fn is_empty(&self) -> bool {
        self.driver.is_none()
            && self.mac.is_none()
            && self.original_name.is_none()
    }
}

/// Per-port link-local address families, `link-local:`. Default is
/// IPv6 only, matching the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkLocalConfig {
    pub ipv4: bool,
    pub ipv6: bool,
}

impl Default for LinkLocalConfig {
    fn default() -> Self {
        Self {
            ipv4: false,
            ipv6: true,
        }
    }
}

/// One network interface profile, keyed by its unique textual id.
///
/// References to other netdefs (`bridge_link`, `bond_link`, …) are
/// stored as ids and resolved against the owning [crate::State] or
/// parser, so they stay valid for as long as the owner lives.
#[derive(Debug, Clone, PartialEq, Default)]
#[non_exhaustive]
pub struct NetDefinition {
    pub(crate) id: String,
    pub(crate) device_type: DeviceType,
    pub(crate) backend: NetplanBackend,
    /// The YAML file this netdef was first defined in, used to decide
    /// where edits are written back. `None` for synthesized netdefs.
    pub(crate) filepath: Option<String>,

    pub dhcp4: Option<bool>,
    pub dhcp6: Option<bool>,
    pub dhcp_identifier: Option<DhcpIdentifier>,
    pub dhcp4_overrides: DhcpOverrides,
    pub dhcp6_overrides: DhcpOverrides,
    pub accept_ra: RaMode,
    pub addresses: Vec<Address>,
    /// Deprecated in favour of default routes.
    pub gateway4: Option<String>,
    pub gateway6: Option<String>,
    pub ip4_nameservers: Vec<String>,
    pub ip6_nameservers: Vec<String>,
    pub search_domains: Vec<String>,
    pub link_local: LinkLocalConfig,
    pub ipv6_privacy: Option<bool>,
    pub ipv6_addr_gen_mode: Option<AddrGenMode>,
    pub ipv6_addr_gen_token: Option<String>,
    pub ipv6_mtu: Option<u32>,
    pub mtu: Option<u32>,

    pub routes: Vec<IpRoute>,
    pub ip_rules: Vec<IpRule>,

    pub matches: MatchSettings,
    pub has_match: bool,
    pub set_name: Option<String>,
    /// Literal MAC, or one of NetworkManager's generated-MAC options.
    pub set_mac: Option<String>,
    pub wake_on_lan: Option<bool>,
    pub wowlan: WowlanFlags,
    pub emit_lldp: Option<bool>,
    pub ignore_carrier: bool,
    pub critical: bool,
    pub optional: bool,
    pub optional_addresses: OptionalAddressFlags,
    /// `manual` or `off`, networkd only.
    pub activation_mode: Option<String>,
    pub infiniband_mode: Option<String>,
    pub regulatory_domain: Option<String>,

    pub receive_checksum_offload: Option<bool>,
    pub transmit_checksum_offload: Option<bool>,
    pub tcp_segmentation_offload: Option<bool>,
    pub tcp6_segmentation_offload: Option<bool>,
    pub generic_segmentation_offload: Option<bool>,
    pub generic_receive_offload: Option<bool>,
    pub large_receive_offload: Option<bool>,

    // Non-owning relations to other netdefs, by id.
    pub(crate) bridge_link: Option<String>,
    pub(crate) bond_link: Option<String>,
    pub(crate) vlan_link: Option<String>,
    pub(crate) vrf_link: Option<String>,
    /// VXLAN underlay device.
    pub(crate) vxlan_link: Option<String>,
    pub(crate) sriov_link: Option<String>,
    pub(crate) peer_link: Option<String>,
    pub(crate) veth_peer_link: Option<String>,

    pub vlan_id: Option<u32>,
    /// VRF routing table.
    pub table: Option<u32>,
    pub bond_params: BondParameters,
    pub bridge_params: BridgeParameters,
    /// Per-port values set through the parent bridge's `path-cost:` /
    /// `port-priority:` mappings.
    pub bridge_path_cost: Option<u32>,
    pub bridge_port_priority: Option<u32>,
    pub tunnel: TunnelSettings,
    pub wireguard_peers: Vec<WireguardPeer>,
    pub vxlan: Option<VxlanSettings>,
    pub modem_params: ModemParameters,
    pub ovs_settings: OvsSettings,
    pub access_points: Vec<WifiAccessPoint>,
    pub auth: Option<AuthenticationSettings>,

    pub sriov_explicit_vf_count: Option<u32>,
    pub sriov_delay_virtual_functions_rebind: bool,
    /// `switchdev` or `legacy`.
    pub embedded_switch_mode: Option<String>,

    pub backend_settings: NetworkManagerSettings,
    // Set by the state builder when another ethernet references this
    // netdef as its SR-IOV parent.
    pub(crate) sriov_pf_marker: bool,
}

impl NetDefinition {
    pub(crate) fn new(id: &str, device_type: DeviceType) -> Self {
        Self {
            id: id.to_string(),
            device_type,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn backend(&self) -> NetplanBackend {
        self.backend
    }

    pub fn filepath(&self) -> Option<&str> {
        self.filepath.as_deref()
    }

    pub fn dhcp4(&self) -> bool {
        self.dhcp4 == Some(true)
    }

    pub fn dhcp6(&self) -> bool {
        self.dhcp6 == Some(true)
    }

    pub fn link_local_ipv4(&self) -> bool {
        self.link_local.ipv4
    }

    pub fn link_local_ipv6(&self) -> bool {
        self.link_local.ipv6
    }

    pub fn macaddress(&self) -> Option<&str> {
        self.set_mac.as_deref()
    }

    pub fn set_name(&self) -> Option<&str> {
        self.set_name.as_deref()
    }

    /// The interface name this netdef matches on: an explicit
    /// `match.name` glob, or the id itself for physical netdefs without
    /// a match block.
    pub fn match_interface_name(&self) -> Option<&str> {
        self.matches.original_name.as_deref()
    }

    pub fn bridge_link(&self) -> Option<&str> {
        self.bridge_link.as_deref()
    }

    pub fn bond_link(&self) -> Option<&str> {
        self.bond_link.as_deref()
    }

    pub fn vlan_link(&self) -> Option<&str> {
        self.vlan_link.as_deref()
    }

    pub fn vrf_link(&self) -> Option<&str> {
        self.vrf_link.as_deref()
    }

    pub fn vxlan_link(&self) -> Option<&str> {
        self.vxlan_link.as_deref()
    }

    pub fn sriov_link(&self) -> Option<&str> {
        self.sriov_link.as_deref()
    }

    /// The OVS patch-port peer.
    pub fn peer_link(&self) -> Option<&str> {
        self.peer_link.as_deref()
    }

    pub fn veth_peer_link(&self) -> Option<&str> {
        self.veth_peer_link.as_deref()
    }

    /// Whether this netdef acts as an SR-IOV physical function: it
    /// either declares an explicit VF count or is referenced through
    /// `link:` by another ethernet definition. The latter is decided by
    /// the state builder which flips this flag.
    pub fn is_sriov_pf(&self) -> bool {
        self.sriov_explicit_vf_count.is_some() || self.sriov_pf_marker
    }

    pub fn id_into(&self, buf: &mut [u8]) -> isize {
        copy_str_to_buffer(self.id.as_str(), buf)
    }

    pub fn filepath_into(&self, buf: &mut [u8]) -> isize {
        copy_opt_str_to_buffer(self.filepath.as_deref(), buf)
    }

    pub fn set_name_into(&self, buf: &mut [u8]) -> isize {
        copy_opt_str_to_buffer(self.set_name.as_deref(), buf)
    }

    pub fn macaddress_into(&self, buf: &mut [u8]) -> isize {
        copy_opt_str_to_buffer(self.set_mac.as_deref(), buf)
    }

    pub fn match_interface_name_into(&self, buf: &mut [u8]) -> isize {
        copy_opt_str_to_buffer(self.matches.original_name.as_deref(), buf)
    }

    /// The `/etc/netplan` YAML file this netdef would be written to by
    /// [NetDefinition::write_yaml]: `90-NM-{uuid}.yaml` when it came
    /// from a NetworkManager keyfile, `10-netplan-{id}.yaml` otherwise.
    pub fn default_output_filename(&self) -> String {
        crate::emitter::yaml_output_filename(self)
    }

    pub fn output_filename_into(&self, buf: &mut [u8]) -> isize {
        copy_str_to_buffer(&self.default_output_filename(), buf)
    }

    /// The backend configuration file an external renderer would write
    /// for this netdef, `None` for backends without one.
    pub fn backend_output_filename(&self) -> Option<String> {
        crate::emitter::backend_output_filename(self)
    }

    pub fn backend_output_filename_into(&self, buf: &mut [u8]) -> isize {
        copy_opt_str_to_buffer(
            self.backend_output_filename().as_deref(),
            buf,
        )
    }

    /// Serialize this netdef alone to its default `/etc/netplan` file
    /// below `rootdir`.
    pub fn write_yaml<P: AsRef<std::path::Path>>(
        &self,
        rootdir: P,
    ) -> Result<(), crate::NetplanError> {
        crate::emitter::write_netdef_yaml(self, rootdir.as_ref())
    }

    pub(crate) fn is_wireguard(&self) -> bool {
        self.device_type == DeviceType::Tunnel
            && self.tunnel.mode == Some(TunnelMode::Wireguard)
    }

    /// Invariant: a physical netdef without an explicit `match:` block
    /// matches its own id as interface name.
    pub(crate) fn finalize_match(&mut self) {
        if self.device_type.is_physical()
            && !self.has_match
            && self.matches.original_name.is_none()
        {
            self.matches.original_name = Some(self.id.clone());
        }
    }
}

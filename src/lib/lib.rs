mod buffer;
mod emitter;
mod error;
mod keyfile;
mod netdef;
mod parser;
mod state;
mod types;
mod validators;

#[cfg(test)]
mod unit_tests;

pub use crate::buffer::{copy_opt_str_to_buffer, copy_str_to_buffer};
pub use crate::error::{ErrorKind, NetplanError, BUFFER_TOO_SMALL};
pub use crate::netdef::{
    Address, AuthenticationSettings, BondParameters, BridgeParameters,
    DhcpOverrides, EapMethod, IpRoute, IpRule, KeyFlags,
    KeyManagementType, LinkLocalConfig, MatchSettings, ModemParameters,
    NetDefinition, NetworkManagerSettings, OvsController, OvsSettings,
    OvsSsl, PmfMode, RouteScope, RouteType, TunnelMode, TunnelSettings,
    VxlanChecksums, VxlanExtensions, VxlanNotifications, VxlanSettings,
    WifiAccessPoint, WifiBand, WifiMode, WireguardPeer,
    ROUTE_TABLE_MAIN, VXLAN_FLOW_LABEL_MAX, VXLAN_VNI_MAX,
    WIREGUARD_DEFAULT_PORT,
};
pub use crate::parser::{Parser, ParserFlags};
pub use crate::state::State;
pub use crate::types::{
    AddrGenMode, DeviceType, DhcpIdentifier, NetplanBackend,
    OptionalAddressFlags, RaMode, WolFlags, WowlanFlags,
};
pub use crate::validators::{
    is_hostname, is_ip4_address, is_ip6_address, is_mac_address,
    is_wireguard_key, validate_ovs_target,
};

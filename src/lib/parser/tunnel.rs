// SPDX-License-Identifier: Apache-2.0

// Grammar handlers for the `tunnels:` section: plain IP tunnels,
// wireguard and vxlan. A tunnel netdef is re-typed to vxlan as soon as
// `mode: vxlan` is seen, so the two share one handler.

use serde_yaml::Value;

use super::value::{
    as_mapping, as_sequence, entry_key, scalar_bool, scalar_str,
    scalar_u16, scalar_u32, scalar_u8,
};
use super::{LinkKind, Parser};
use crate::netdef::{
    Address, KeyFlags, NetDefinition, TunnelMode, VxlanChecksums,
    VxlanExtensions, VxlanNotifications, VxlanSettings, WireguardPeer,
    VXLAN_FLOW_LABEL_MAX, VXLAN_VNI_MAX,
};
use crate::types::DeviceType;
use crate::validators::{
    is_ip4_address, is_ip6_address, is_valid_port,
};
use crate::{ErrorKind, NetplanError};

fn config_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::InvalidConfig, msg)
}

impl Parser {
    pub(crate) fn handle_tunnel_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        _path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "mode" => {
                let mode = scalar_str(key, value)?;
                if mode == "vxlan" {
                    def.device_type = DeviceType::Vxlan;
                    def.vxlan.get_or_insert_with(VxlanSettings::new);
                    return Ok(true);
                }
                def.tunnel.mode = Some(
                    TunnelMode::parse(mode.as_str()).ok_or_else(
                        || {
                            config_error(format!(
                                "{}: tunnel mode '{mode}' is not \
                                supported",
                                def.id
                            ))
                        },
                    )?,
                );
            }
            "local" => {
                let local = scalar_str(key, value)?;
                if !is_ip4_address(local.as_str())
                    && !is_ip6_address(local.as_str())
                {
                    return Err(config_error(format!(
                        "{}: malformed local address '{local}'",
                        def.id
                    )));
                }
                def.tunnel.local = Some(local);
            }
            "remote" => {
                let remote = scalar_str(key, value)?;
                if !is_ip4_address(remote.as_str())
                    && !is_ip6_address(remote.as_str())
                {
                    return Err(config_error(format!(
                        "{}: malformed remote address '{remote}'",
                        def.id
                    )));
                }
                def.tunnel.remote = Some(remote);
            }
            "key" | "keys" => self.handle_tunnel_keys(def, value)?,
            "ttl" => {
                let ttl = scalar_u32(key, value)?;
                if ttl > 255 {
                    return Err(config_error(format!(
                        "{}: invalid ttl value '{ttl}'",
                        def.id
                    )));
                }
                match def.vxlan.as_mut() {
                    Some(vxlan) if def.device_type == DeviceType::Vxlan => {
                        vxlan.ttl = Some(ttl)
                    }
                    _ => def.tunnel.ttl = Some(ttl),
                }
            }
            "port" => {
                let port = scalar_u16(key, value)?;
                match def.vxlan.as_mut() {
                    Some(vxlan) if def.device_type == DeviceType::Vxlan => {
                        vxlan.port = Some(port)
                    }
                    _ => def.tunnel.port = Some(port),
                }
            }
            "mark" | "fwmark" => {
                def.tunnel.fwmark = Some(scalar_u32(key, value)?)
            }
            "peers" => self.handle_wireguard_peers(def, value)?,
            // VXLAN keys. Accepted before `mode: vxlan` is reached,
            // their presence on a non-vxlan tunnel fails validation
            // later.
            "id" => {
                let vni = scalar_u32(key, value)?;
                if vni > VXLAN_VNI_MAX {
                    return Err(config_error(format!(
                        "{}: VXLAN 'id' (VNI) must be in range \
                        0..16777216",
                        def.id
                    )));
                }
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .vni = Some(vni);
            }
            "link" => {
                let target = scalar_str(key, value)?;
                def.vxlan_link = Some(target.clone());
                self.link_netdef(
                    def.id.as_str(),
                    target.as_str(),
                    LinkKind::VxlanLink,
                )?;
            }
            "flow-label" => {
                let label = scalar_u32(key, value)?;
                if label > VXLAN_FLOW_LABEL_MAX {
                    return Err(config_error(format!(
                        "{}: VXLAN 'flow-label' must be in range \
                        0..1048575",
                        def.id
                    )));
                }
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .flow_label = Some(label);
            }
            "type-of-service" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .tos = Some(scalar_u8(key, value)?);
            }
            "mac-learning" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .mac_learning = Some(scalar_bool(key, value)?);
            }
            "ageing" | "aging" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .ageing = Some(scalar_u32(key, value)?);
            }
            "limit" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .limit = Some(scalar_u32(key, value)?);
            }
            "arp-proxy" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .arp_proxy = Some(scalar_bool(key, value)?);
            }
            "short-circuit" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .short_circuit = Some(scalar_bool(key, value)?);
            }
            "do-not-fragment" => {
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .do_not_fragment = Some(scalar_bool(key, value)?);
            }
            "notifications" => {
                let flags = self.parse_flag_list(
                    def.id.as_str(),
                    key,
                    value,
                    &VxlanNotifications::NAMES,
                )?;
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .notifications = VxlanNotifications(flags);
            }
            "checksums" => {
                let flags = self.parse_flag_list(
                    def.id.as_str(),
                    key,
                    value,
                    &VxlanChecksums::NAMES,
                )?;
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .checksums = VxlanChecksums(flags);
            }
            "extensions" => {
                let flags = self.parse_flag_list(
                    def.id.as_str(),
                    key,
                    value,
                    &VxlanExtensions::NAMES,
                )?;
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .extensions = VxlanExtensions(flags);
            }
            "port-range" => {
                let items = as_sequence(key, value)?;
                if items.len() != 2 {
                    return Err(config_error(format!(
                        "{}: Expected exactly two values for \
                        'port-range'",
                        def.id
                    )));
                }
                let low = scalar_u16(key, &items[0])?;
                let high = scalar_u16(key, &items[1])?;
                def.vxlan
                    .get_or_insert_with(VxlanSettings::new)
                    .port_range = Some((low.min(high), low.max(high)));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn parse_flag_list(
        &mut self,
        id: &str,
        key: &str,
        value: &Value,
        names: &[(&'static str, u32)],
    ) -> Result<u32, NetplanError> {
        let items = as_sequence(key, value)?;
        let mut flags = 0u32;
        for item in items {
            let name = scalar_str(key, item)?;
            let flag = names
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .map(|(_, f)| *f)
                .ok_or_else(|| {
                    config_error(format!(
                        "{id}: invalid value '{name}' for key '{key}'"
                    ))
                })?;
            flags |= flag;
        }
        Ok(flags)
    }

    /// `key:`/`keys:` takes either a single scalar applied to both
    /// directions (or the private key for wireguard) or a mapping with
    /// `input:`, `output:`, `private:` and `private-key-flags:`.
    fn handle_tunnel_keys(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        match value {
            Value::Mapping(mapping) => {
                for (k, v) in mapping {
                    let k = entry_key(k)?;
                    match k {
                        "input" => {
                            def.tunnel.input_key =
                                Some(scalar_str(k, v)?)
                        }
                        "output" => {
                            def.tunnel.output_key =
                                Some(scalar_str(k, v)?)
                        }
                        "private" => {
                            def.tunnel.private_key =
                                Some(scalar_str(k, v)?)
                        }
                        "private-key-flags" => {
                            let flags = self.parse_flag_list(
                                def.id.as_str(),
                                k,
                                v,
                                &KeyFlags::NAMES,
                            )?;
                            def.tunnel.private_key_flags =
                                KeyFlags(flags);
                        }
                        _ => {
                            return Err(config_error(format!(
                                "{}: unknown key '{k}'",
                                def.id
                            )));
                        }
                    }
                }
            }
            _ => {
                let key = scalar_str("key", value)?;
                if def.tunnel.mode == Some(TunnelMode::Wireguard) {
                    def.tunnel.private_key = Some(key);
                } else {
                    def.tunnel.input_key = Some(key.clone());
                    def.tunnel.output_key = Some(key);
                }
            }
        }
        Ok(())
    }

    fn handle_wireguard_peers(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("peers", value)?;
        let mut peers = Vec::new();
        for item in items {
            peers.push(self.parse_wireguard_peer(def.id.as_str(), item)?);
        }
        def.wireguard_peers = peers;
        Ok(())
    }

    fn parse_wireguard_peer(
        &mut self,
        id: &str,
        value: &Value,
    ) -> Result<WireguardPeer, NetplanError> {
        let mapping = as_mapping("peers", value)?;
        let mut peer = WireguardPeer::new();
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "keys" => {
                    let keys = as_mapping(k, v)?;
                    for (kk, kv) in keys {
                        let kk = entry_key(kk)?;
                        match kk {
                            "public" => {
                                peer.public_key =
                                    Some(scalar_str(kk, kv)?)
                            }
                            "shared" => {
                                peer.preshared_key =
                                    Some(scalar_str(kk, kv)?)
                            }
                            _ => {
                                return Err(config_error(format!(
                                    "{id}: unknown key '{kk}'"
                                )));
                            }
                        }
                    }
                }
                "endpoint" => {
                    let endpoint = scalar_str(k, v)?;
                    validate_wireguard_endpoint(id, endpoint.as_str())?;
                    peer.endpoint = Some(endpoint);
                }
                "keepalive" => {
                    peer.keepalive = Some(scalar_u16(k, v)?)
                }
                "allowed-ips" => {
                    let items = as_sequence(k, v)?;
                    let mut ips = Vec::new();
                    for item in items {
                        let cidr = scalar_str(k, item)?;
                        // /0 routes the whole family through the peer,
                        // so it is allowed here.
                        Address::from_cidr_permissive(cidr.as_str())?;
                        ips.push(cidr);
                    }
                    peer.allowed_ips = ips;
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(peer)
    }
}

/// A wireguard endpoint is `host:port`, `ip4:port` or `[ip6]:port`.
fn validate_wireguard_endpoint(
    id: &str,
    endpoint: &str,
) -> Result<(), NetplanError> {
    let malformed = || {
        config_error(format!(
            "{id}: invalid endpoint address or hostname '{endpoint}'"
        ))
    };
    if let Some(rest) = endpoint.strip_prefix('[') {
        let (host, rest) = rest.split_once(']').ok_or_else(malformed)?;
        if !is_ip6_address(host) {
            return Err(malformed());
        }
        let port = rest.strip_prefix(':').ok_or_else(malformed)?;
        if !is_valid_port(port) {
            return Err(malformed());
        }
        return Ok(());
    }
    // A bare IPv6 address cannot carry a port without brackets.
    if is_ip6_address(endpoint) {
        return Err(malformed());
    }
    let (host, port) = endpoint.rsplit_once(':').ok_or_else(malformed)?;
    if host.is_empty() || !is_valid_port(port) {
        return Err(malformed());
    }
    Ok(())
}

// SPDX-License-Identifier: Apache-2.0

// Grammar handlers for the device-type specific keys: ethernets (SR-IOV
// included), wifis, modems, bridges, bonds, vlans, vrfs and
// virtual-ethernets.

use log::warn;
use serde_yaml::Value;

use super::common::{extend_path, is_passthrough_key};
use super::value::{
    as_mapping, as_sequence, entry_key, scalar_bool, scalar_str,
    scalar_u32,
};
use super::{LinkKind, Parser};
use crate::netdef::{NetDefinition, WifiAccessPoint, WifiBand, WifiMode};
use crate::validators::is_ip4_address;
use crate::{ErrorKind, NetplanError};

fn config_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::InvalidConfig, msg)
}

impl Parser {
    pub(crate) fn handle_ethernet_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        _path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "auth" => {
                def.auth =
                    Some(self.parse_auth(def.id.as_str(), value)?);
            }
            // SR-IOV virtual function pointing at its physical function.
            "link" => {
                let target = scalar_str(key, value)?;
                def.sriov_link = Some(target.clone());
                self.link_netdef(
                    def.id.as_str(),
                    target.as_str(),
                    LinkKind::SriovLink,
                )?;
            }
            "virtual-function-count" => {
                def.sriov_explicit_vf_count =
                    Some(scalar_u32(key, value)?);
            }
            "embedded-switch-mode" => {
                let mode = scalar_str(key, value)?;
                if mode != "switchdev" && mode != "legacy" {
                    return Err(config_error(format!(
                        "{}: embedded-switch-mode needs to be \
                        'switchdev' or 'legacy'",
                        def.id
                    )));
                }
                def.embedded_switch_mode = Some(mode);
            }
            "delay-virtual-functions-rebind" => {
                def.sriov_delay_virtual_functions_rebind =
                    scalar_bool(key, value)?;
            }
            "infiniband-mode" => {
                let mode = scalar_str(key, value)?;
                if mode != "datagram" && mode != "connected" {
                    return Err(config_error(format!(
                        "{}: infiniband-mode needs to be 'datagram' or \
                        'connected'",
                        def.id
                    )));
                }
                def.infiniband_mode = Some(mode);
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn handle_wifi_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "access-points" => {
                self.handle_access_points(def, value, path, key)?
            }
            "wakeonwlan" => self.handle_wowlan(def, value)?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_access_points(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
        path: &[String],
        key: &str,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping(key, value)?;
        let sub_path = extend_path(path, key);
        for (ssid, body) in mapping {
            let ssid = entry_key(ssid)?;
            if self.is_null_field_owned(&sub_path, ssid) {
                // A deleted SSID also drops an earlier definition.
                def.access_points.retain(|ap| ap.ssid != ssid);
                continue;
            }
            let ap = self.parse_access_point(
                def.id.as_str(),
                ssid,
                body,
            )?;
            // Later definitions of the same SSID win.
            def.access_points.retain(|existing| existing.ssid != ssid);
            def.access_points.push(ap);
        }
        Ok(())
    }

    fn parse_access_point(
        &mut self,
        id: &str,
        ssid: &str,
        body: &Value,
    ) -> Result<WifiAccessPoint, NetplanError> {
        let mut ap = WifiAccessPoint::new(ssid);
        if matches!(body, Value::Null) {
            return Ok(ap);
        }
        let mapping = as_mapping(ssid, body)?;
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                // Shortcut for a WPA-PSK passphrase.
                "password" => {
                    let auth = ap.auth.get_or_insert_with(
                        crate::netdef::AuthenticationSettings::new,
                    );
                    auth.password = Some(scalar_str(k, v)?);
                }
                "auth" => ap.auth = Some(self.parse_auth(id, v)?),
                "mode" => {
                    let mode = scalar_str(k, v)?;
                    ap.mode = WifiMode::parse(mode.as_str())
                        .ok_or_else(|| {
                            config_error(format!(
                                "{id}: unknown wifi mode '{mode}'"
                            ))
                        })?;
                }
                "bssid" => ap.bssid = Some(scalar_str(k, v)?),
                "band" => {
                    let band = scalar_str(k, v)?;
                    ap.band = Some(
                        WifiBand::parse(band.as_str()).ok_or_else(
                            || {
                                config_error(format!(
                                    "{id}: unknown wifi band '{band}'"
                                ))
                            },
                        )?,
                    );
                }
                "channel" => ap.channel = Some(scalar_u32(k, v)?),
                "hidden" => ap.hidden = scalar_bool(k, v)?,
                "networkmanager" => {
                    self.parse_ap_networkmanager(id, &mut ap, v)?
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(ap)
    }

    /// Per-SSID `networkmanager:` block. The connection identity keys
    /// are ignored here (the netdef level block owns them), only the
    /// `passthrough:` mapping is kept with the access point.
    fn parse_ap_networkmanager(
        &mut self,
        id: &str,
        ap: &mut WifiAccessPoint,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping("networkmanager", value)?;
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "name" | "uuid" | "stable-id" | "device" => {
                    let _ = scalar_str(k, v)?;
                }
                "passthrough" => {
                    let passthrough = as_mapping(k, v)?;
                    for (pk, pv) in passthrough {
                        let pk = entry_key(pk)?;
                        let pv = scalar_str(pk, pv)?;
                        if !is_passthrough_key(pk) {
                            warn!(
                                "{id}: ignoring passthrough key '{pk}' \
                                not in 'group.key' form"
                            );
                            continue;
                        }
                        ap.passthrough.insert(
                            pk.to_string(),
                            serde_json::Value::String(pv),
                        );
                    }
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn handle_modem_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
    ) -> Result<bool, NetplanError> {
        let params = &mut def.modem_params;
        match key {
            "apn" => params.apn = Some(scalar_str(key, value)?),
            "auto-config" => {
                params.auto_config = scalar_bool(key, value)?
            }
            "device-id" => {
                params.device_id = Some(scalar_str(key, value)?)
            }
            "network-id" => {
                params.network_id = Some(scalar_str(key, value)?)
            }
            "number" => params.number = Some(scalar_str(key, value)?),
            "password" => {
                params.password = Some(scalar_str(key, value)?)
            }
            "pin" => params.pin = Some(scalar_str(key, value)?),
            "sim-id" => params.sim_id = Some(scalar_str(key, value)?),
            "sim-operator-id" => {
                params.sim_operator_id = Some(scalar_str(key, value)?)
            }
            "username" => {
                params.username = Some(scalar_str(key, value)?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn handle_bridge_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "interfaces" => {
                let items = as_sequence(key, value)?;
                for item in items {
                    let member = scalar_str(key, item)?;
                    self.link_netdef(
                        def.id.as_str(),
                        member.as_str(),
                        LinkKind::BridgePort {
                            bridge: def.id.clone(),
                        },
                    )?;
                }
            }
            "parameters" => {
                self.handle_bridge_parameters(def, value, path, key)?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_bridge_parameters(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
        path: &[String],
        key: &str,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping(key, value)?;
        let sub_path = extend_path(path, key);
        for (k, v) in mapping {
            let k = entry_key(k)?;
            if self.is_null_field_owned(&sub_path, k) {
                continue;
            }
            match k {
                "ageing-time" | "aging-time" => {
                    def.bridge_params.ageing_time =
                        Some(scalar_str(k, v)?)
                }
                "priority" => {
                    def.bridge_params.priority = Some(scalar_u32(k, v)?)
                }
                "forward-delay" => {
                    def.bridge_params.forward_delay =
                        Some(scalar_str(k, v)?)
                }
                "hello-time" => {
                    def.bridge_params.hello_time =
                        Some(scalar_str(k, v)?)
                }
                "max-age" => {
                    def.bridge_params.max_age = Some(scalar_str(k, v)?)
                }
                "stp" => {
                    def.bridge_params.stp = Some(scalar_bool(k, v)?)
                }
                "path-cost" => {
                    let costs = as_mapping(k, v)?;
                    for (member, cost) in costs {
                        let member = entry_key(member)?;
                        let cost = scalar_u32(member, cost)?;
                        self.link_netdef(
                            def.id.as_str(),
                            member,
                            LinkKind::BridgePathCost {
                                bridge: def.id.clone(),
                                cost,
                            },
                        )?;
                    }
                }
                "port-priority" => {
                    let priorities = as_mapping(k, v)?;
                    for (member, priority) in priorities {
                        let member = entry_key(member)?;
                        let priority = scalar_u32(member, priority)?;
                        if priority > 63 {
                            return Err(config_error(format!(
                                "{}: invalid port-priority value \
                                (must be <= 63): {priority}",
                                def.id
                            )));
                        }
                        self.link_netdef(
                            def.id.as_str(),
                            member,
                            LinkKind::BridgePortPriority {
                                bridge: def.id.clone(),
                                priority,
                            },
                        )?;
                    }
                }
                _ => {
                    return Err(config_error(format!(
                        "{}: unknown key '{k}'",
                        def.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn handle_bond_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "interfaces" => {
                let items = as_sequence(key, value)?;
                for item in items {
                    let member = scalar_str(key, item)?;
                    self.link_netdef(
                        def.id.as_str(),
                        member.as_str(),
                        LinkKind::BondPort {
                            bond: def.id.clone(),
                        },
                    )?;
                }
            }
            "parameters" => {
                self.handle_bond_parameters(def, value, path, key)?
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_bond_parameters(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
        path: &[String],
        key: &str,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping(key, value)?;
        let sub_path = extend_path(path, key);
        for (k, v) in mapping {
            let k = entry_key(k)?;
            if self.is_null_field_owned(&sub_path, k) {
                continue;
            }
            let params = &mut def.bond_params;
            match k {
                "mode" => {
                    let mode = scalar_str(k, v)?;
                    params.set_mode(mode.as_str(), def.id.as_str())?;
                }
                "lacp-rate" => {
                    params.lacp_rate = Some(scalar_str(k, v)?)
                }
                "mii-monitor-interval" => {
                    params.monitor_interval = Some(scalar_str(k, v)?)
                }
                "min-links" => {
                    params.min_links = Some(scalar_u32(k, v)?)
                }
                "transmit-hash-policy" => {
                    params.transmit_hash_policy =
                        Some(scalar_str(k, v)?)
                }
                "ad-select" => {
                    params.selection_logic = Some(scalar_str(k, v)?)
                }
                "all-members-active" | "all-slaves-active" => {
                    params.all_members_active =
                        Some(scalar_bool(k, v)?)
                }
                "arp-interval" => {
                    params.arp_interval = Some(scalar_str(k, v)?)
                }
                "arp-ip-targets" => {
                    let items = as_sequence(k, v)?;
                    let mut targets = Vec::new();
                    for item in items {
                        let target = scalar_str(k, item)?;
                        if !is_ip4_address(target.as_str()) {
                            return Err(config_error(format!(
                                "{}: malformed arp-ip-targets address \
                                '{target}'",
                                def.id
                            )));
                        }
                        targets.push(target);
                    }
                    params.arp_ip_targets = targets;
                }
                "arp-validate" => {
                    params.arp_validate = Some(scalar_str(k, v)?)
                }
                "arp-all-targets" => {
                    params.arp_all_targets = Some(scalar_str(k, v)?)
                }
                "up-delay" => {
                    params.up_delay = Some(scalar_str(k, v)?)
                }
                "down-delay" => {
                    params.down_delay = Some(scalar_str(k, v)?)
                }
                "fail-over-mac-policy" => {
                    params.fail_over_mac_policy =
                        Some(scalar_str(k, v)?)
                }
                // Kept with its historic misspelling as an alias.
                "gratuitous-arp" | "gratuitious-arp" => {
                    params.gratuitous_arp = Some(scalar_u32(k, v)?)
                }
                "packets-per-member" | "packets-per-slave" => {
                    params.packets_per_member = Some(scalar_u32(k, v)?)
                }
                "primary-reselect-policy" => {
                    params.primary_reselect_policy =
                        Some(scalar_str(k, v)?)
                }
                "resend-igmp" => {
                    params.resend_igmp = Some(scalar_u32(k, v)?)
                }
                "learn-packet-interval" => {
                    params.learn_interval = Some(scalar_str(k, v)?)
                }
                "primary" => {
                    let primary = scalar_str(k, v)?;
                    params.primary_member = Some(primary.clone());
                    self.link_netdef(
                        def.id.as_str(),
                        primary.as_str(),
                        LinkKind::BondPrimary {
                            bond: def.id.clone(),
                        },
                    )?;
                }
                _ => {
                    return Err(config_error(format!(
                        "{}: unknown key '{k}'",
                        def.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn handle_vlan_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
    ) -> Result<bool, NetplanError> {
        match key {
            "id" => {
                let id = scalar_u32(key, value)?;
                if id > 4094 {
                    return Err(config_error(format!(
                        "{}: invalid id '{id}' (must be 0..4094)",
                        def.id
                    )));
                }
                def.vlan_id = Some(id);
            }
            "link" => {
                let target = scalar_str(key, value)?;
                def.vlan_link = Some(target.clone());
                self.link_netdef(
                    def.id.as_str(),
                    target.as_str(),
                    LinkKind::VlanLink,
                )?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn handle_vrf_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
    ) -> Result<bool, NetplanError> {
        match key {
            "table" => def.table = Some(scalar_u32(key, value)?),
            "interfaces" => {
                let items = as_sequence(key, value)?;
                for item in items {
                    let member = scalar_str(key, item)?;
                    self.link_netdef(
                        def.id.as_str(),
                        member.as_str(),
                        LinkKind::VrfPort {
                            vrf: def.id.clone(),
                        },
                    )?;
                }
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub(crate) fn handle_veth_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
    ) -> Result<bool, NetplanError> {
        match key {
            "peer" => {
                let peer = scalar_str(key, value)?;
                if peer == def.id {
                    return Err(config_error(format!(
                        "{}: virtual-ethernet peer cannot be itself",
                        def.id
                    )));
                }
                def.veth_peer_link = Some(peer.clone());
                self.link_netdef(
                    def.id.as_str(),
                    peer.as_str(),
                    LinkKind::VethPeer,
                )?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

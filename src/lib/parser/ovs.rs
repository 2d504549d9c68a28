// SPDX-License-Identifier: Apache-2.0

// Open vSwitch handlers: the global `network.openvswitch:` section
// (ssl, patch ports) and the per-netdef `openvswitch:` block.

use serde_yaml::Value;

use super::common::extend_path;
use super::value::{
    as_mapping, as_sequence, entry_key, scalar_bool, scalar_str,
};
use super::Parser;
use crate::netdef::NetDefinition;
use crate::types::{DeviceType, NetplanBackend};
use crate::validators::validate_ovs_target;
use crate::{ErrorKind, NetplanError};

const OVS_PROTOCOLS: [&str; 7] = [
    "OpenFlow10",
    "OpenFlow11",
    "OpenFlow12",
    "OpenFlow13",
    "OpenFlow14",
    "OpenFlow15",
    "OpenFlow16",
];

fn config_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::InvalidConfig, msg)
}

fn parse_string_map(
    key: &str,
    value: &Value,
    target: &mut serde_json::Map<String, serde_json::Value>,
) -> Result<(), NetplanError> {
    let mapping = as_mapping(key, value)?;
    for (k, v) in mapping {
        let k = entry_key(k)?;
        let v = scalar_str(k, v)?;
        target.insert(k.to_string(), serde_json::Value::String(v));
    }
    Ok(())
}

fn parse_protocols(
    id: Option<&str>,
    value: &Value,
) -> Result<Vec<String>, NetplanError> {
    let items = as_sequence("protocols", value)?;
    let mut protocols = Vec::new();
    for item in items {
        let protocol = scalar_str("protocols", item)?;
        if !OVS_PROTOCOLS.contains(&protocol.as_str()) {
            let prefix = id
                .map(|id| format!("{id}: "))
                .unwrap_or_default();
            return Err(config_error(format!(
                "{prefix}Unsupported OVS 'protocols' value: {protocol}"
            )));
        }
        protocols.push(protocol);
    }
    Ok(protocols)
}

impl Parser {
    pub(crate) fn process_global_ovs(
        &mut self,
        value: &Value,
    ) -> Result<(), NetplanError> {
        if matches!(value, Value::Null) {
            return Ok(());
        }
        let mapping = as_mapping("openvswitch", value)?;
        for (key, value) in mapping {
            let key = entry_key(key)?;
            if self.is_null_field(&["network", "openvswitch"], key) {
                continue;
            }
            match key {
                "external-ids" => {
                    let mut ids = self.global_ovs.external_ids.clone();
                    parse_string_map(key, value, &mut ids)?;
                    self.global_ovs.external_ids = ids;
                }
                "other-config" => {
                    let mut config =
                        self.global_ovs.other_config.clone();
                    parse_string_map(key, value, &mut config)?;
                    self.global_ovs.other_config = config;
                }
                "protocols" => {
                    self.global_ovs.protocols =
                        parse_protocols(None, value)?;
                }
                "ssl" => self.process_global_ovs_ssl(value)?,
                "ports" => self.process_ovs_ports(value)?,
                _ => {
                    return Err(config_error(format!(
                        "unknown key '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }

    fn process_global_ovs_ssl(
        &mut self,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping("ssl", value)?;
        for (key, value) in mapping {
            let key = entry_key(key)?;
            if self
                .is_null_field(&["network", "openvswitch", "ssl"], key)
            {
                continue;
            }
            match key {
                "ca-cert" => {
                    self.global_ovs.ssl.ca_cert =
                        Some(scalar_str(key, value)?)
                }
                "certificate" => {
                    self.global_ovs.ssl.certificate =
                        Some(scalar_str(key, value)?)
                }
                "private-key" => {
                    self.global_ovs.ssl.private_key =
                        Some(scalar_str(key, value)?)
                }
                _ => {
                    return Err(config_error(format!(
                        "unknown key '{key}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// `ports:` is a sequence of two element sequences, each declaring a
    /// pair of mutually peered patch ports.
    fn process_ovs_ports(
        &mut self,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let pairs = as_sequence("ports", value)?;
        for pair in pairs {
            let pair = as_sequence("ports", pair)?;
            if pair.len() != 2 {
                return Err(config_error(
                    "An OVS port pair must consist of exactly two \
                    ports"
                        .to_string(),
                ));
            }
            let a = scalar_str("ports", &pair[0])?;
            let b = scalar_str("ports", &pair[1])?;
            if a == b {
                return Err(config_error(format!(
                    "Open vSwitch patch ports must be of different \
                    name, got '{a}' twice"
                )));
            }
            self.define_ovs_patch_port(a.as_str(), b.as_str())?;
            self.define_ovs_patch_port(b.as_str(), a.as_str())?;
        }
        Ok(())
    }

    fn define_ovs_patch_port(
        &mut self,
        id: &str,
        peer: &str,
    ) -> Result<(), NetplanError> {
        self.define_netdef(id, DeviceType::OvsPort)?;
        let def = match self.defs.get_mut(id) {
            Some(def) => def,
            None => return Ok(()),
        };
        if let Some(existing) = def.peer_link.as_deref() {
            if existing != peer {
                return Err(NetplanError::new(
                    ErrorKind::ConfigValidation,
                    format!(
                        "Open vSwitch patch port '{id}' is already \
                        assigned to peer '{existing}'"
                    ),
                ));
            }
        }
        def.backend = NetplanBackend::Ovs;
        def.peer_link = Some(peer.to_string());
        Ok(())
    }

    /// Per-netdef `openvswitch:` block. Its mere presence moves the
    /// netdef to the OVS backend.
    pub(crate) fn handle_def_ovs(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
        path: &[String],
        key: &str,
    ) -> Result<(), NetplanError> {
        def.backend = NetplanBackend::Ovs;
        if matches!(value, Value::Null) {
            return Ok(());
        }
        let mapping = as_mapping(key, value)?;
        let sub_path = extend_path(path, key);
        for (k, v) in mapping {
            let k = entry_key(k)?;
            if self.is_null_field_owned(&sub_path, k) {
                continue;
            }
            match k {
                "external-ids" => {
                    let mut ids =
                        def.ovs_settings.external_ids.clone();
                    parse_string_map(k, v, &mut ids)?;
                    def.ovs_settings.external_ids = ids;
                }
                "other-config" => {
                    let mut config =
                        def.ovs_settings.other_config.clone();
                    parse_string_map(k, v, &mut config)?;
                    def.ovs_settings.other_config = config;
                }
                "lacp" => {
                    if def.device_type != DeviceType::Bond {
                        return Err(config_error(format!(
                            "{}: OVS 'lacp' is only valid for bonds",
                            def.id
                        )));
                    }
                    let lacp = scalar_str(k, v)?;
                    if !["active", "passive", "off"]
                        .contains(&lacp.as_str())
                    {
                        return Err(config_error(format!(
                            "{}: Value of 'lacp' needs to be 'active', \
                            'passive' or 'off'",
                            def.id
                        )));
                    }
                    def.ovs_settings.lacp = Some(lacp);
                }
                "fail-mode" => {
                    if def.device_type != DeviceType::Bridge {
                        return Err(config_error(format!(
                            "{}: OVS 'fail-mode' is only valid for \
                            bridges",
                            def.id
                        )));
                    }
                    let mode = scalar_str(k, v)?;
                    if mode != "standalone" && mode != "secure" {
                        return Err(config_error(format!(
                            "{}: Value of 'fail-mode' needs to be \
                            'standalone' or 'secure'",
                            def.id
                        )));
                    }
                    def.ovs_settings.fail_mode = Some(mode);
                }
                "mcast-snooping" => {
                    if def.device_type != DeviceType::Bridge {
                        return Err(config_error(format!(
                            "{}: OVS 'mcast-snooping' is only valid \
                            for bridges",
                            def.id
                        )));
                    }
                    def.ovs_settings.mcast_snooping =
                        Some(scalar_bool(k, v)?);
                }
                "rstp" => {
                    if def.device_type != DeviceType::Bridge {
                        return Err(config_error(format!(
                            "{}: OVS 'rstp' is only valid for bridges",
                            def.id
                        )));
                    }
                    def.ovs_settings.rstp = Some(scalar_bool(k, v)?);
                }
                "protocols" => {
                    if def.device_type != DeviceType::Bridge {
                        return Err(config_error(format!(
                            "{}: OVS 'protocols' is only valid for \
                            bridges",
                            def.id
                        )));
                    }
                    def.ovs_settings.protocols =
                        parse_protocols(Some(def.id.as_str()), v)?;
                }
                "controller" => {
                    if def.device_type != DeviceType::Bridge {
                        return Err(config_error(format!(
                            "{}: OVS 'controller' is only valid for \
                            bridges",
                            def.id
                        )));
                    }
                    self.handle_ovs_controller(def, v)?;
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

    fn handle_ovs_controller(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping("controller", value)?;
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "addresses" => {
                    let items = as_sequence(k, v)?;
                    let mut addresses = Vec::new();
                    for item in items {
                        let target = scalar_str(k, item)?;
                        validate_ovs_target(true, target.as_str())?;
                        addresses.push(target);
                    }
                    def.ovs_settings.controller.addresses = addresses;
                }
                "connection-mode" => {
                    let mode = scalar_str(k, v)?;
                    if mode != "in-band" && mode != "out-of-band" {
                        return Err(config_error(format!(
                            "{}: Value of 'connection-mode' needs to \
                            be 'in-band' or 'out-of-band'",
                            def.id
                        )));
                    }
                    def.ovs_settings.controller.connection_mode =
                        Some(mode);
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
}

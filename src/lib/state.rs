// SPDX-License-Identifier: Apache-2.0

// The validated in-memory configuration. A [State] is only ever built
// by importing a [Parser], which runs the cross-netdef finalization and
// consistency checks on the way in.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use log::warn;

use crate::netdef::{
    NetDefinition, OvsSettings, TunnelMode, ROUTE_TABLE_MAIN,
};
use crate::parser::Parser;
use crate::types::{DeviceType, NetplanBackend};
use crate::validators::{
    is_ip4_address, is_mac_address, is_wireguard_key,
};
use crate::{ErrorKind, NetplanError};

/// Validated netdef container. Iteration order is the order of first
/// definition across all parsed sources.
#[derive(Debug, Default)]
pub struct State {
    netdefs: HashMap<String, NetDefinition>,
    ordered: Vec<String>,
    backend: NetplanBackend,
    ovs_settings: OvsSettings,
    sources: BTreeSet<String>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the parser's accumulated netdefs into this state, resolving
    /// leftover references and validating every definition. The parser
    /// is reset afterwards, whether the import succeeded or not.
    pub fn import_parser_results(
        &mut self,
        parser: &mut Parser,
    ) -> Result<(), NetplanError> {
        let ret = self.import_inner(parser);
        parser.reset();
        ret
    }

    fn import_inner(
        &mut self,
        parser: &mut Parser,
    ) -> Result<(), NetplanError> {
        parser.finalize_missing()?;
        let ordered: Vec<String> = parser.ordered.clone();
        for id in &ordered {
            if let Err(e) = finalize_netdef(parser, id) {
                let dropped = parser.defs.remove(id).is_some();
                if dropped {
                    parser.ordered.retain(|existing| existing != id);
                }
                parser.consume_error(e)?;
            }
        }
        warn_default_route_conflicts(parser);
        warn_regulatory_domains(parser);
        adopt_vrf_routes(parser);

        for id in std::mem::take(&mut parser.ordered) {
            let def = match parser.defs.remove(&id) {
                Some(def) => def,
                None => continue,
            };
            if !self.netdefs.contains_key(&id) {
                self.ordered.push(id.clone());
            }
            self.netdefs.insert(id, def);
        }
        self.backend = if parser.global_backend == NetplanBackend::None
        {
            NetplanBackend::Networkd
        } else {
            parser.global_backend
        };
        if !parser.global_ovs.is_empty() {
            self.ovs_settings = parser.global_ovs.clone();
        }
        self.sources.append(&mut parser.sources);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&NetDefinition> {
        self.netdefs.get(id)
    }

    /// Netdefs in first-definition order.
    pub fn iter(&self) -> impl Iterator<Item = &NetDefinition> {
        self.ordered
            .iter()
            .filter_map(|id| self.netdefs.get(id))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// The effective global renderer.
    pub fn backend(&self) -> NetplanBackend {
        self.backend
    }

    pub fn ovs_settings(&self) -> &OvsSettings {
        &self.ovs_settings
    }

    /// Every file that contributed to this state.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.as_str())
    }

    /// Serialize the whole state as one netplan YAML document.
    pub fn dump_yaml<W: Write>(
        &self,
        writer: W,
    ) -> Result<(), NetplanError> {
        crate::emitter::emit_state(self, writer)
    }

    /// Write `etc/netplan/<filename>` below `rootdir`, containing only
    /// the netdefs originating from a file of that basename plus the
    /// ones without an origin. Root-readable only, the document may
    /// carry secrets.
    pub fn write_yaml_file<P: AsRef<Path>>(
        &self,
        filename: &str,
        rootdir: P,
    ) -> Result<(), NetplanError> {
        let dir = rootdir.as_ref().join("etc/netplan");
        std::fs::create_dir_all(&dir)?;
        let mut name = filename.to_string();
        if !name.ends_with(".yaml") {
            name.push_str(".yaml");
        }
        let path = dir.join(&name);
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .map_err(|e| {
                NetplanError::from(e)
                    .with_path(path.to_string_lossy().as_ref())
            })?;
        crate::emitter::emit_filtered(self, file, |def| {
            match def.filepath() {
                Some(filepath) => {
                    Path::new(filepath)
                        .file_name()
                        .and_then(|n| n.to_str())
                        == Some(name.as_str())
                }
                None => true,
            }
        })
    }

    /// Drop everything, keeping the object reusable.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn validation_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::ConfigValidation, msg)
}

/// Per-netdef finalization: backend defaulting, implicit match names,
/// type specific completeness checks and the backend capability rules.
fn finalize_netdef(
    parser: &mut Parser,
    id: &str,
) -> Result<(), NetplanError> {
    let backend = match parser.defs.get(id) {
        Some(def) => parser.effective_backend(def),
        None => return Ok(()),
    };
    // SR-IOV: an ethernet pointing at a PF through `link:` becomes a
    // virtual function, and the referent is marked as PF.
    let pf = parser
        .defs
        .get(id)
        .and_then(|def| def.sriov_link().map(str::to_string));
    if let Some(pf) = pf {
        if let Some(pf_def) = parser.defs.get_mut(&pf) {
            pf_def.sriov_pf_marker = true;
        }
        if let Some(def) = parser.defs.get_mut(id) {
            if def.device_type == DeviceType::Ethernet {
                def.device_type = DeviceType::SriovVf;
            }
        }
    }
    let def = match parser.defs.get_mut(id) {
        Some(def) => def,
        None => return Ok(()),
    };
    if def.backend == NetplanBackend::None {
        def.backend = backend;
    }
    def.finalize_match();

    if !def.is_sriov_pf() {
        if def.embedded_switch_mode.is_some() {
            return Err(validation_error(format!(
                "{id}: embedded-switch-mode is only valid for SR-IOV \
                PF interfaces"
            )));
        }
        if def.sriov_delay_virtual_functions_rebind {
            return Err(validation_error(format!(
                "{id}: delay-virtual-functions-rebind is only valid \
                for SR-IOV PF interfaces"
            )));
        }
    }
    if def.backend == NetplanBackend::Networkd {
        if let Some(mac) = def.set_mac.as_deref() {
            if !is_mac_address(mac) {
                return Err(validation_error(format!(
                    "{id}: networkd backend does not support the MAC \
                    option '{mac}'"
                )));
            }
        }
    }
    match def.device_type {
        DeviceType::Vlan => {
            if def.vlan_link.is_none() {
                return Err(validation_error(format!(
                    "{id}: missing 'link' property"
                )));
            }
            if def.vlan_id.is_none() {
                return Err(validation_error(format!(
                    "{id}: missing 'id' property"
                )));
            }
        }
        DeviceType::Vrf => {
            let table = def.table.ok_or_else(|| {
                validation_error(format!(
                    "{id}: missing 'table' property"
                ))
            })?;
            // Routes and rules declared on the VRF itself belong to its
            // table.
            for route in def.routes.iter_mut() {
                match route.table {
                    None => route.table = Some(table),
                    Some(t) if t != table => {
                        return Err(validation_error(format!(
                            "{id}: route table {t} does not match VRF \
                            table {table}"
                        )));
                    }
                    _ => (),
                }
            }
            for rule in def.ip_rules.iter_mut() {
                match rule.table {
                    None => rule.table = Some(table),
                    Some(t) if t != table => {
                        return Err(validation_error(format!(
                            "{id}: routing-policy table {t} does not \
                            match VRF table {table}"
                        )));
                    }
                    _ => (),
                }
            }
        }
        DeviceType::Tunnel => {
            validate_tunnel(def, id)?;
        }
        DeviceType::Vxlan => {
            let vni = def.vxlan.as_ref().and_then(|v| v.vni);
            if vni.is_none() {
                return Err(validation_error(format!(
                    "{id}: missing 'id' property (VXLAN VNI)"
                )));
            }
        }
        _ => {
            if def.vxlan.is_some() {
                return Err(validation_error(format!(
                    "{id}: VXLAN-specific options are only valid with \
                    'mode: vxlan'"
                )));
            }
        }
    }
    Ok(())
}

fn validate_tunnel(
    def: &NetDefinition,
    id: &str,
) -> Result<(), NetplanError> {
    let mode = def.tunnel.mode.ok_or_else(|| {
        validation_error(format!(
            "{id}: missing 'mode' property for tunnel"
        ))
    })?;
    if mode == TunnelMode::Wireguard {
        match def.tunnel.private_key.as_deref() {
            None => {
                if !def.tunnel.private_key_flags.contains(
                    crate::netdef::KeyFlags::NOT_REQUIRED,
                ) {
                    return Err(validation_error(format!(
                        "{id}: missing 'key' property (private key) \
                        for wireguard"
                    )));
                }
            }
            Some(key) => {
                // A path to a key file is a networkd extension.
                if key.starts_with('/') {
                    if def.backend == NetplanBackend::NetworkManager {
                        return Err(validation_error(format!(
                            "{id}: NetworkManager does not support \
                            wireguard private key files"
                        )));
                    }
                } else if !is_wireguard_key(key) {
                    return Err(validation_error(format!(
                        "{id}: invalid wireguard private key"
                    )));
                }
            }
        }
        if def.wireguard_peers.is_empty() {
            return Err(validation_error(format!(
                "{id}: at least one wireguard peer is required"
            )));
        }
        for peer in &def.wireguard_peers {
            peer.validate(id)?;
        }
        return Ok(());
    }
    if def.tunnel.remote.is_none() {
        return Err(validation_error(format!(
            "{id}: missing 'remote' property for tunnel"
        )));
    }
    if !mode.supports_io_keys()
        && (def.tunnel.input_key.is_some()
            || def.tunnel.output_key.is_some())
    {
        return Err(validation_error(format!(
            "{id}: 'input-key'/'output-key' is not allowed for this \
            tunnel type"
        )));
    }
    // Non-wireguard tunnel keys are a uint or a dotted quad.
    for key in [
        def.tunnel.input_key.as_deref(),
        def.tunnel.output_key.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        if key.parse::<u32>().is_err() && !is_ip4_address(key) {
            return Err(validation_error(format!(
                "{id}: invalid tunnel key '{key}'"
            )));
        }
    }
    if def.backend == NetplanBackend::Networkd
        && mode == TunnelMode::Isatap
    {
        return Err(validation_error(format!(
            "{id}: ISATAP tunnels are not supported by networkd"
        )));
    }
    if def.backend == NetplanBackend::NetworkManager
        && matches!(mode, TunnelMode::Gretap | TunnelMode::Ip6gretap)
    {
        return Err(validation_error(format!(
            "{id}: GRETAP tunnels are not supported by NetworkManager"
        )));
    }
    Ok(())
}

/// Routes and routing-policy entries declared under a VRF apply to
/// every member interface, carrying the VRF's table. Existing entries
/// are never duplicated so re-imports stay idempotent.
fn adopt_vrf_routes(parser: &mut Parser) {
    let vrf_ids: Vec<String> = parser
        .ordered
        .iter()
        .filter(|id| {
            parser
                .defs
                .get(id.as_str())
                .map(|def| def.device_type == DeviceType::Vrf)
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    for vrf_id in vrf_ids {
        let (routes, rules) = match parser.defs.get(&vrf_id) {
            Some(vrf) => (vrf.routes.clone(), vrf.ip_rules.clone()),
            None => continue,
        };
        if routes.is_empty() && rules.is_empty() {
            continue;
        }
        let members: Vec<String> = parser
            .ordered
            .iter()
            .filter(|id| {
                parser
                    .defs
                    .get(id.as_str())
                    .and_then(|def| def.vrf_link())
                    == Some(vrf_id.as_str())
            })
            .cloned()
            .collect();
        for member in members {
            let def = match parser.defs.get_mut(&member) {
                Some(def) => def,
                None => continue,
            };
            for route in &routes {
                if !def.routes.contains(route) {
                    def.routes.push(route.clone());
                }
            }
            for rule in &rules {
                if !def.ip_rules.contains(rule) {
                    def.ip_rules.push(rule.clone());
                }
            }
        }
    }
}

/// At most one default route (per family, table and metric) should
/// exist across the whole configuration. Conflicts are reported but tolerated,
/// routing-policy is the recommended fix.
fn warn_default_route_conflicts(parser: &Parser) {
    let mut seen: HashMap<(u8, u32, Option<u32>), String> =
        HashMap::new();
    for id in &parser.ordered {
        let def = match parser.defs.get(id) {
            Some(def) => def,
            None => continue,
        };
        let mut defaults: Vec<(u8, u32, Option<u32>)> = Vec::new();
        for route in &def.routes {
            if route.is_default_route() {
                defaults.push((
                    route.family,
                    route.table.unwrap_or(ROUTE_TABLE_MAIN),
                    route.metric,
                ));
            }
        }
        if def.gateway4.is_some() {
            defaults.push((4, ROUTE_TABLE_MAIN, None));
        }
        if def.gateway6.is_some() {
            defaults.push((6, ROUTE_TABLE_MAIN, None));
        }
        for key in defaults {
            match seen.get(&key) {
                Some(first) if first != id => {
                    let family =
                        if key.0 == 6 { "IPv6" } else { "IPv4" };
                    let metric = key
                        .2
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "default".to_string());
                    warn!(
                        "Conflicting default route declarations for \
                        {family} (table: {}, metric: {metric}), first \
                        declared in '{first}' but also in '{id}'. \
                        Please use `routing-policy` with separate \
                        tables instead.",
                        key.1
                    );
                }
                Some(_) => (),
                None => {
                    seen.insert(key, id.clone());
                }
            }
        }
    }
}

/// The regulatory domain is global kernel state, diverging values per
/// interface cannot all win.
fn warn_regulatory_domains(parser: &Parser) {
    let mut seen: Option<(&str, &str)> = None;
    for id in &parser.ordered {
        let def = match parser.defs.get(id) {
            Some(def) => def,
            None => continue,
        };
        let domain = match def.regulatory_domain.as_deref() {
            Some(domain) => domain,
            None => continue,
        };
        match seen {
            Some((first, first_domain)) if first_domain != domain => {
                warn!(
                    "Conflicting regulatory-domain settings: '{}' in \
                    '{first}' vs '{domain}' in '{id}'",
                    first_domain
                );
            }
            Some(_) => (),
            None => seen = Some((id.as_str(), domain)),
        }
    }
}

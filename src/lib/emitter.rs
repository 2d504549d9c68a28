// SPDX-License-Identifier: Apache-2.0

// Deterministic YAML serialization of a [State] or a single netdef.
// Everything is assembled into insertion-ordered `serde_yaml::Mapping`
// trees first, field order is fixed so repeated emission of the same
// state is byte identical.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::netdef::{
    Address, BondParameters, BridgeParameters, DhcpOverrides, IpRoute,
    IpRule, NetDefinition, OvsSettings, RouteType, TunnelMode,
    VxlanChecksums, VxlanExtensions, VxlanNotifications,
    WifiAccessPoint, WifiMode,
};
use crate::state::State;
use crate::types::{
    DeviceType, NetplanBackend, OptionalAddressFlags, RaMode,
    WowlanFlags,
};
use crate::{ErrorKind, NetplanError};

fn s(v: &str) -> Value {
    Value::String(v.to_string())
}

fn b(v: bool) -> Value {
    Value::Bool(v)
}

fn u(v: u64) -> Value {
    Value::Number(v.into())
}

fn insert(mapping: &mut Mapping, key: &str, value: Value) {
    mapping.insert(s(key), value);
}

/// `/etc/netplan` target of a netdef: keyfile-born connections go to a
/// uuid-keyed file, native ones to an id-keyed one.
pub(crate) fn yaml_output_filename(def: &NetDefinition) -> String {
    match def.backend_settings.uuid.as_deref() {
        Some(uuid) => format!("/etc/netplan/90-NM-{uuid}.yaml"),
        None => format!("/etc/netplan/10-netplan-{}.yaml", def.id),
    }
}

/// The backend configuration file an external renderer would produce
/// for this netdef. `None` for backends without a per-netdef file.
pub(crate) fn backend_output_filename(
    def: &NetDefinition,
) -> Option<String> {
    match def.backend {
        NetplanBackend::NetworkManager => {
            let ssid = def
                .access_points
                .first()
                .map(|ap| format!("-{}", escape_filename(&ap.ssid)))
                .unwrap_or_default();
            Some(format!(
                "/run/NetworkManager/system-connections/netplan-{}{ssid}\
                .nmconnection",
                def.id
            ))
        }
        NetplanBackend::Networkd => Some(format!(
            "/run/systemd/network/10-netplan-{}.network",
            def.id
        )),
        _ => None,
    }
}

/// Percent-escape everything outside `[A-Za-z0-9._-]`, URL style.
fn escape_filename(s: &str) -> String {
    let mut ret = String::with_capacity(s.len());
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric()
            || matches!(byte, b'.' | b'_' | b'-')
        {
            ret.push(byte as char);
        } else {
            ret.push_str(&format!("%{byte:02X}"));
        }
    }
    ret
}

/// Per-parent membership collected from the children's back links, used
/// for `interfaces:` lists and the bridge per-port mappings.
#[derive(Debug, Default)]
struct Membership {
    interfaces: HashMap<String, Vec<String>>,
    path_costs: HashMap<String, Vec<(String, u32)>>,
    port_priorities: HashMap<String, Vec<(String, u32)>>,
}

fn collect_membership<'a, I>(defs: I) -> Membership
where
    I: Iterator<Item = &'a NetDefinition>,
{
    let mut ret = Membership::default();
    for def in defs {
        for parent in [
            def.bridge_link.as_deref(),
            def.bond_link.as_deref(),
            def.vrf_link.as_deref(),
        ]
        .into_iter()
        .flatten()
        {
            ret.interfaces
                .entry(parent.to_string())
                .or_default()
                .push(def.id.clone());
        }
        if let (Some(bridge), Some(cost)) =
            (def.bridge_link.as_deref(), def.bridge_path_cost)
        {
            ret.path_costs
                .entry(bridge.to_string())
                .or_default()
                .push((def.id.clone(), cost));
        }
        if let (Some(bridge), Some(priority)) =
            (def.bridge_link.as_deref(), def.bridge_port_priority)
        {
            ret.port_priorities
                .entry(bridge.to_string())
                .or_default()
                .push((def.id.clone(), priority));
        }
    }
    ret
}

/// Serialize the whole state into one `network:` document.
pub(crate) fn emit_state<W: Write>(
    state: &State,
    writer: W,
) -> Result<(), NetplanError> {
    emit_filtered(state, writer, |_| true)
}

/// Serialize only the netdefs accepted by `filter`.
pub(crate) fn emit_filtered<W: Write, F>(
    state: &State,
    writer: W,
    filter: F,
) -> Result<(), NetplanError>
where
    F: Fn(&NetDefinition) -> bool,
{
    let membership = collect_membership(state.iter());
    let mut network = Mapping::new();
    insert(&mut network, "version", u(2));
    if state.backend() == NetplanBackend::NetworkManager {
        insert(&mut network, "renderer", s("NetworkManager"));
    }
    let global_ovs =
        global_ovs_mapping(state.ovs_settings(), state.iter());
    if !global_ovs.is_empty() {
        insert(
            &mut network,
            "openvswitch",
            Value::Mapping(global_ovs),
        );
    }
    let mut seen_sections: Vec<&str> = Vec::new();
    for device_type in DeviceType::ALL {
        let section = match device_type.section() {
            Some(section) => section,
            None => continue,
        };
        if seen_sections.contains(&section) {
            continue;
        }
        seen_sections.push(section);
        let mut group = Mapping::new();
        for def in state.iter() {
            if def.device_type.section() != Some(section)
                || !filter(def)
            {
                continue;
            }
            group.insert(
                s(def.id.as_str()),
                Value::Mapping(netdef_mapping(def, &membership)),
            );
        }
        if !group.is_empty() {
            insert(&mut network, section, Value::Mapping(group));
        }
    }
    let mut root = Mapping::new();
    insert(&mut root, "network", Value::Mapping(network));
    serde_yaml::to_writer(writer, &Value::Mapping(root)).map_err(|e| {
        NetplanError::new(ErrorKind::EmitterFailure, e.to_string())
    })
}

fn global_ovs_mapping<'a, I>(
    settings: &OvsSettings,
    defs: I,
) -> Mapping
where
    I: Iterator<Item = &'a NetDefinition>,
{
    let mut ret = Mapping::new();
    if !settings.external_ids.is_empty() {
        insert(
            &mut ret,
            "external-ids",
            json_map_to_yaml(&settings.external_ids),
        );
    }
    if !settings.other_config.is_empty() {
        insert(
            &mut ret,
            "other-config",
            json_map_to_yaml(&settings.other_config),
        );
    }
    if !settings.protocols.is_empty() {
        insert(
            &mut ret,
            "protocols",
            string_seq(&settings.protocols),
        );
    }
    if !settings.ssl.is_empty() {
        let mut ssl = Mapping::new();
        if let Some(v) = settings.ssl.ca_cert.as_deref() {
            insert(&mut ssl, "ca-cert", s(v));
        }
        if let Some(v) = settings.ssl.certificate.as_deref() {
            insert(&mut ssl, "certificate", s(v));
        }
        if let Some(v) = settings.ssl.private_key.as_deref() {
            insert(&mut ssl, "private-key", s(v));
        }
        insert(&mut ret, "ssl", Value::Mapping(ssl));
    }
    // Patch port pairs, each emitted once.
    let mut pairs: Vec<Value> = Vec::new();
    for def in defs {
        if def.device_type != DeviceType::OvsPort {
            continue;
        }
        if let Some(peer) = def.peer_link.as_deref() {
            if def.id.as_str() < peer {
                pairs.push(Value::Sequence(vec![
                    s(def.id.as_str()),
                    s(peer),
                ]));
            }
        }
    }
    if !pairs.is_empty() {
        insert(&mut ret, "ports", Value::Sequence(pairs));
    }
    ret
}

fn json_map_to_yaml(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Value {
    let mut ret = Mapping::new();
    for (k, v) in map {
        let v = match v {
            serde_json::Value::String(v) => v.clone(),
            other => other.to_string(),
        };
        insert(&mut ret, k, s(v.as_str()));
    }
    Value::Mapping(ret)
}

fn string_seq(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|i| s(i)).collect())
}

fn flag_seq(flags: u32, names: &[(&'static str, u32)]) -> Value {
    Value::Sequence(
        names
            .iter()
            .filter(|(_, f)| flags & f != 0)
            .map(|(n, _)| s(n))
            .collect(),
    )
}

fn netdef_mapping(
    def: &NetDefinition,
    membership: &Membership,
) -> Mapping {
    let mut ret = Mapping::new();
    if def.has_match || !def.matches.is_empty() {
        let mut m = Mapping::new();
        if let Some(name) = def.matches.original_name.as_deref() {
            insert(&mut m, "name", s(name));
        }
        if let Some(mac) = def.matches.mac.as_deref() {
            insert(&mut m, "macaddress", s(mac));
        }
        if let Some(driver) = def.matches.driver.as_deref() {
            let globs: Vec<&str> = driver.split('\t').collect();
            if globs.len() == 1 {
                insert(&mut m, "driver", s(globs[0]));
            } else {
                insert(
                    &mut m,
                    "driver",
                    Value::Sequence(
                        globs.iter().map(|g| s(g)).collect(),
                    ),
                );
            }
        }
        insert(&mut ret, "match", Value::Mapping(m));
    }
    if def.backend == NetplanBackend::NetworkManager {
        insert(&mut ret, "renderer", s("NetworkManager"));
    }
    if def.optional {
        insert(&mut ret, "optional", b(true));
    }
    if def.critical {
        insert(&mut ret, "critical", b(true));
    }
    if def.ignore_carrier {
        insert(&mut ret, "ignore-carrier", b(true));
    }
    if !def.addresses.is_empty() {
        let mut addresses = Vec::new();
        for address in &def.addresses {
            addresses.push(address_value(address));
        }
        insert(&mut ret, "addresses", Value::Sequence(addresses));
    }
    if !def.ip4_nameservers.is_empty()
        || !def.ip6_nameservers.is_empty()
        || !def.search_domains.is_empty()
    {
        let mut ns = Mapping::new();
        if !def.search_domains.is_empty() {
            insert(&mut ns, "search", string_seq(&def.search_domains));
        }
        let mut addresses: Vec<Value> = Vec::new();
        addresses
            .extend(def.ip4_nameservers.iter().map(|a| s(a)));
        addresses
            .extend(def.ip6_nameservers.iter().map(|a| s(a)));
        if !addresses.is_empty() {
            insert(&mut ns, "addresses", Value::Sequence(addresses));
        }
        insert(&mut ret, "nameservers", Value::Mapping(ns));
    }
    if let Some(gw) = def.gateway4.as_deref() {
        insert(&mut ret, "gateway4", s(gw));
    }
    if let Some(gw) = def.gateway6.as_deref() {
        insert(&mut ret, "gateway6", s(gw));
    }
    if let Some(dhcp4) = def.dhcp4 {
        insert(&mut ret, "dhcp4", b(dhcp4));
    }
    if let Some(dhcp6) = def.dhcp6 {
        insert(&mut ret, "dhcp6", b(dhcp6));
    }
    if let Some(identifier) = def.dhcp_identifier {
        insert(
            &mut ret,
            "dhcp-identifier",
            s(match identifier {
                crate::types::DhcpIdentifier::Duid => "duid",
                crate::types::DhcpIdentifier::Mac => "mac",
            }),
        );
    }
    if !def.dhcp4_overrides.is_default() {
        insert(
            &mut ret,
            "dhcp4-overrides",
            Value::Mapping(dhcp_overrides_mapping(
                &def.dhcp4_overrides,
            )),
        );
    }
    if !def.dhcp6_overrides.is_default() {
        insert(
            &mut ret,
            "dhcp6-overrides",
            Value::Mapping(dhcp_overrides_mapping(
                &def.dhcp6_overrides,
            )),
        );
    }
    match def.accept_ra {
        RaMode::Kernel => (),
        RaMode::Enabled => insert(&mut ret, "accept-ra", b(true)),
        RaMode::Disabled => insert(&mut ret, "accept-ra", b(false)),
    }
    if let Some(mac) = def.set_mac.as_deref() {
        insert(&mut ret, "macaddress", s(mac));
    }
    if let Some(name) = def.set_name.as_deref() {
        insert(&mut ret, "set-name", s(name));
    }
    if let Some(privacy) = def.ipv6_privacy {
        insert(&mut ret, "ipv6-privacy", b(privacy));
    }
    if let Some(mode) = def.ipv6_addr_gen_mode {
        insert(
            &mut ret,
            "ipv6-address-generation",
            s(&mode.to_string()),
        );
    }
    if let Some(token) = def.ipv6_addr_gen_token.as_deref() {
        insert(&mut ret, "ipv6-address-token", s(token));
    }
    if let Some(mtu) = def.ipv6_mtu {
        insert(&mut ret, "ipv6-mtu", u(mtu.into()));
    }
    if let Some(mtu) = def.mtu {
        insert(&mut ret, "mtu", u(mtu.into()));
    }
    if let Some(auth) = def.auth.as_ref() {
        insert(&mut ret, "auth", Value::Mapping(auth_mapping(auth)));
    }
    if let Some(mode) = def.activation_mode.as_deref() {
        insert(&mut ret, "activation-mode", s(mode));
    }
    if let Some(mode) = def.infiniband_mode.as_deref() {
        insert(&mut ret, "infiniband-mode", s(mode));
    }
    if let Some(domain) = def.regulatory_domain.as_deref() {
        insert(&mut ret, "regulatory-domain", s(domain));
    }
    if let Some(link) = def.sriov_link.as_deref() {
        insert(&mut ret, "link", s(link));
    }
    if let Some(count) = def.sriov_explicit_vf_count {
        insert(
            &mut ret,
            "virtual-function-count",
            u(count.into()),
        );
    }
    if let Some(mode) = def.embedded_switch_mode.as_deref() {
        insert(&mut ret, "embedded-switch-mode", s(mode));
    }
    if def.sriov_delay_virtual_functions_rebind {
        insert(
            &mut ret,
            "delay-virtual-functions-rebind",
            b(true),
        );
    }
    if matches!(
        def.device_type,
        DeviceType::Bridge | DeviceType::Bond | DeviceType::Vrf
    ) {
        if let Some(members) =
            membership.interfaces.get(def.id.as_str())
        {
            insert(&mut ret, "interfaces", string_seq(members));
        }
    }
    if def.device_type == DeviceType::Bond
        && !def.bond_params.is_empty()
    {
        insert(
            &mut ret,
            "parameters",
            Value::Mapping(bond_parameters_mapping(&def.bond_params)),
        );
    }
    if def.device_type == DeviceType::Bridge {
        let params = bridge_parameters_mapping(
            &def.bridge_params,
            membership.path_costs.get(def.id.as_str()),
            membership.port_priorities.get(def.id.as_str()),
        );
        if !params.is_empty() {
            insert(&mut ret, "parameters", Value::Mapping(params));
        }
    }
    if !def.routes.is_empty() {
        let routes = def.routes.iter().map(route_value).collect();
        insert(&mut ret, "routes", Value::Sequence(routes));
    }
    if !def.ip_rules.is_empty() {
        let rules = def.ip_rules.iter().map(rule_value).collect();
        insert(&mut ret, "routing-policy", Value::Sequence(rules));
    }
    if def.device_type == DeviceType::Vlan {
        if let Some(id) = def.vlan_id {
            insert(&mut ret, "id", u(id.into()));
        }
        if let Some(link) = def.vlan_link.as_deref() {
            insert(&mut ret, "link", s(link));
        }
    }
    if def.device_type == DeviceType::Vrf {
        if let Some(table) = def.table {
            insert(&mut ret, "table", u(table.into()));
        }
    }
    if def.device_type == DeviceType::Veth {
        if let Some(peer) = def.veth_peer_link.as_deref() {
            insert(&mut ret, "peer", s(peer));
        }
    }
    if def.device_type == DeviceType::Tunnel {
        emit_tunnel(&mut ret, def);
    }
    if def.device_type == DeviceType::Vxlan {
        emit_vxlan(&mut ret, def);
    }
    for (key, value) in [
        ("receive-checksum-offload", def.receive_checksum_offload),
        ("transmit-checksum-offload", def.transmit_checksum_offload),
        ("tcp-segmentation-offload", def.tcp_segmentation_offload),
        ("tcp6-segmentation-offload", def.tcp6_segmentation_offload),
        (
            "generic-segmentation-offload",
            def.generic_segmentation_offload,
        ),
        ("generic-receive-offload", def.generic_receive_offload),
        ("large-receive-offload", def.large_receive_offload),
    ] {
        if let Some(value) = value {
            insert(&mut ret, key, b(value));
        }
    }
    if let Some(wol) = def.wake_on_lan {
        insert(&mut ret, "wakeonlan", b(wol));
    }
    if !def.wowlan.is_empty() {
        insert(
            &mut ret,
            "wakeonwlan",
            flag_seq(def.wowlan.0, &WowlanFlags::NAMES),
        );
    }
    if let Some(lldp) = def.emit_lldp {
        insert(&mut ret, "emit-lldp", b(lldp));
    }
    if !def.optional_addresses.is_empty() {
        insert(
            &mut ret,
            "optional-addresses",
            flag_seq(
                def.optional_addresses.0,
                &OptionalAddressFlags::NAMES,
            ),
        );
    }
    if def.link_local != Default::default() {
        let mut families = Vec::new();
        if def.link_local.ipv4 {
            families.push(s("ipv4"));
        }
        if def.link_local.ipv6 {
            families.push(s("ipv6"));
        }
        insert(&mut ret, "link-local", Value::Sequence(families));
    }
    if def.backend == NetplanBackend::Ovs
        && !def.ovs_settings.is_empty()
    {
        insert(
            &mut ret,
            "openvswitch",
            Value::Mapping(def_ovs_mapping(&def.ovs_settings)),
        );
    }
    if def.device_type == DeviceType::Modem {
        emit_modem(&mut ret, def);
    }
    if !def.access_points.is_empty() {
        let mut aps = Mapping::new();
        for ap in &def.access_points {
            aps.insert(
                s(ap.ssid.as_str()),
                Value::Mapping(access_point_mapping(ap)),
            );
        }
        insert(&mut ret, "access-points", Value::Mapping(aps));
    }
    if !def.backend_settings.is_empty() {
        let settings = &def.backend_settings;
        let mut nm = Mapping::new();
        if let Some(uuid) = settings.uuid.as_deref() {
            insert(&mut nm, "uuid", s(uuid));
        }
        if let Some(name) = settings.name.as_deref() {
            insert(&mut nm, "name", s(name));
        }
        if let Some(stable_id) = settings.stable_id.as_deref() {
            insert(&mut nm, "stable-id", s(stable_id));
        }
        if let Some(device) = settings.device.as_deref() {
            insert(&mut nm, "device", s(device));
        }
        if !settings.passthrough.is_empty() {
            insert(
                &mut nm,
                "passthrough",
                json_map_to_yaml(&settings.passthrough),
            );
        }
        insert(&mut ret, "networkmanager", Value::Mapping(nm));
    }
    ret
}

fn address_value(address: &Address) -> Value {
    if !address.has_options() {
        return s(address.address.as_str());
    }
    let mut options = Mapping::new();
    if let Some(lifetime) = address.lifetime.as_deref() {
        insert(&mut options, "lifetime", s(lifetime));
    }
    if let Some(label) = address.label.as_deref() {
        insert(&mut options, "label", s(label));
    }
    let mut ret = Mapping::new();
    insert(
        &mut ret,
        address.address.as_str(),
        Value::Mapping(options),
    );
    Value::Mapping(ret)
}

fn dhcp_overrides_mapping(overrides: &DhcpOverrides) -> Mapping {
    let mut ret = Mapping::new();
    if !overrides.use_dns {
        insert(&mut ret, "use-dns", b(false));
    }
    if let Some(domains) = overrides.use_domains.as_deref() {
        match domains {
            "true" => insert(&mut ret, "use-domains", b(true)),
            "false" => insert(&mut ret, "use-domains", b(false)),
            other => insert(&mut ret, "use-domains", s(other)),
        }
    }
    if !overrides.use_ntp {
        insert(&mut ret, "use-ntp", b(false));
    }
    if !overrides.use_hostname {
        insert(&mut ret, "use-hostname", b(false));
    }
    if !overrides.use_mtu {
        insert(&mut ret, "use-mtu", b(false));
    }
    if !overrides.use_routes {
        insert(&mut ret, "use-routes", b(false));
    }
    if !overrides.send_hostname {
        insert(&mut ret, "send-hostname", b(false));
    }
    if let Some(hostname) = overrides.hostname.as_deref() {
        insert(&mut ret, "hostname", s(hostname));
    }
    if let Some(metric) = overrides.metric {
        insert(&mut ret, "route-metric", u(metric.into()));
    }
    ret
}

fn auth_mapping(
    auth: &crate::netdef::AuthenticationSettings,
) -> Mapping {
    let mut ret = Mapping::new();
    if let Some(kmt) = auth.key_management {
        insert(&mut ret, "key-management", s(&kmt.to_string()));
    }
    if let Some(method) = auth.eap_method {
        insert(&mut ret, "method", s(&method.to_string()));
    }
    if let Some(v) = auth.identity.as_deref() {
        insert(&mut ret, "identity", s(v));
    }
    if let Some(v) = auth.anonymous_identity.as_deref() {
        insert(&mut ret, "anonymous-identity", s(v));
    }
    if let Some(v) = auth.password.as_deref() {
        insert(&mut ret, "password", s(v));
    }
    if let Some(v) = auth.ca_certificate.as_deref() {
        insert(&mut ret, "ca-certificate", s(v));
    }
    if let Some(v) = auth.client_certificate.as_deref() {
        insert(&mut ret, "client-certificate", s(v));
    }
    if let Some(v) = auth.client_key.as_deref() {
        insert(&mut ret, "client-key", s(v));
    }
    if let Some(v) = auth.client_key_password.as_deref() {
        insert(&mut ret, "client-key-password", s(v));
    }
    if let Some(v) = auth.phase2_auth.as_deref() {
        insert(&mut ret, "phase2-auth", s(v));
    }
    if let Some(pmf) = auth.pmf_mode {
        insert(
            &mut ret,
            "pmf",
            s(match pmf {
                crate::netdef::PmfMode::Disabled => "disabled",
                crate::netdef::PmfMode::Optional => "optional",
                crate::netdef::PmfMode::Required => "required",
            }),
        );
    }
    ret
}

fn bond_parameters_mapping(params: &BondParameters) -> Mapping {
    let mut ret = Mapping::new();
    if let Some(v) = params.mode.as_deref() {
        insert(&mut ret, "mode", s(v));
    }
    if let Some(v) = params.lacp_rate.as_deref() {
        insert(&mut ret, "lacp-rate", s(v));
    }
    if let Some(v) = params.monitor_interval.as_deref() {
        insert(&mut ret, "mii-monitor-interval", s(v));
    }
    if let Some(v) = params.min_links {
        insert(&mut ret, "min-links", u(v.into()));
    }
    if let Some(v) = params.transmit_hash_policy.as_deref() {
        insert(&mut ret, "transmit-hash-policy", s(v));
    }
    if let Some(v) = params.selection_logic.as_deref() {
        insert(&mut ret, "ad-select", s(v));
    }
    if let Some(v) = params.all_members_active {
        insert(&mut ret, "all-members-active", b(v));
    }
    if let Some(v) = params.arp_interval.as_deref() {
        insert(&mut ret, "arp-interval", s(v));
    }
    if !params.arp_ip_targets.is_empty() {
        insert(
            &mut ret,
            "arp-ip-targets",
            string_seq(&params.arp_ip_targets),
        );
    }
    if let Some(v) = params.arp_validate.as_deref() {
        insert(&mut ret, "arp-validate", s(v));
    }
    if let Some(v) = params.arp_all_targets.as_deref() {
        insert(&mut ret, "arp-all-targets", s(v));
    }
    if let Some(v) = params.up_delay.as_deref() {
        insert(&mut ret, "up-delay", s(v));
    }
    if let Some(v) = params.down_delay.as_deref() {
        insert(&mut ret, "down-delay", s(v));
    }
    if let Some(v) = params.fail_over_mac_policy.as_deref() {
        insert(&mut ret, "fail-over-mac-policy", s(v));
    }
    if let Some(v) = params.gratuitous_arp {
        insert(&mut ret, "gratuitous-arp", u(v.into()));
    }
    if let Some(v) = params.packets_per_member {
        insert(&mut ret, "packets-per-member", u(v.into()));
    }
    if let Some(v) = params.primary_reselect_policy.as_deref() {
        insert(&mut ret, "primary-reselect-policy", s(v));
    }
    if let Some(v) = params.resend_igmp {
        insert(&mut ret, "resend-igmp", u(v.into()));
    }
    if let Some(v) = params.learn_interval.as_deref() {
        insert(&mut ret, "learn-packet-interval", s(v));
    }
    if let Some(v) = params.primary_member.as_deref() {
        insert(&mut ret, "primary", s(v));
    }
    ret
}

fn bridge_parameters_mapping(
    params: &BridgeParameters,
    path_costs: Option<&Vec<(String, u32)>>,
    port_priorities: Option<&Vec<(String, u32)>>,
) -> Mapping {
    let mut ret = Mapping::new();
    if let Some(v) = params.ageing_time.as_deref() {
        insert(&mut ret, "ageing-time", s(v));
    }
    if let Some(v) = params.priority {
        insert(&mut ret, "priority", u(v.into()));
    }
    if let Some(v) = params.forward_delay.as_deref() {
        insert(&mut ret, "forward-delay", s(v));
    }
    if let Some(v) = params.hello_time.as_deref() {
        insert(&mut ret, "hello-time", s(v));
    }
    if let Some(v) = params.max_age.as_deref() {
        insert(&mut ret, "max-age", s(v));
    }
    if let Some(costs) = path_costs {
        let mut m = Mapping::new();
        for (member, cost) in costs {
            insert(&mut m, member, u((*cost).into()));
        }
        insert(&mut ret, "path-cost", Value::Mapping(m));
    }
    if let Some(priorities) = port_priorities {
        let mut m = Mapping::new();
        for (member, priority) in priorities {
            insert(&mut m, member, u((*priority).into()));
        }
        insert(&mut ret, "port-priority", Value::Mapping(m));
    }
    if let Some(v) = params.stp {
        insert(&mut ret, "stp", b(v));
    }
    ret
}

fn route_value(route: &IpRoute) -> Value {
    let mut ret = Mapping::new();
    if let Some(to) = route.to.as_deref() {
        insert(&mut ret, "to", s(to));
    }
    if let Some(via) = route.via.as_deref() {
        insert(&mut ret, "via", s(via));
    }
    if let Some(from) = route.from.as_deref() {
        insert(&mut ret, "from", s(from));
    }
    if route.rtype != RouteType::default() {
        insert(&mut ret, "type", s(&route.rtype.to_string()));
    }
    if let Some(scope) = route.scope {
        insert(&mut ret, "scope", s(&scope.to_string()));
    }
    if let Some(metric) = route.metric {
        insert(&mut ret, "metric", u(metric.into()));
    }
    if let Some(table) = route.table {
        insert(&mut ret, "table", u(table.into()));
    }
    if let Some(mtu) = route.mtu {
        insert(&mut ret, "mtu", u(mtu.into()));
    }
    if let Some(v) = route.congestion_window {
        insert(&mut ret, "congestion-window", u(v.into()));
    }
    if let Some(v) = route.advertised_receive_window {
        insert(&mut ret, "advertised-receive-window", u(v.into()));
    }
    if let Some(onlink) = route.onlink {
        insert(&mut ret, "on-link", b(onlink));
    }
    Value::Mapping(ret)
}

fn rule_value(rule: &IpRule) -> Value {
    let mut ret = Mapping::new();
    if let Some(from) = rule.from.as_deref() {
        insert(&mut ret, "from", s(from));
    }
    if let Some(to) = rule.to.as_deref() {
        insert(&mut ret, "to", s(to));
    }
    if let Some(priority) = rule.priority {
        insert(&mut ret, "priority", u(priority.into()));
    }
    if let Some(table) = rule.table {
        insert(&mut ret, "table", u(table.into()));
    }
    if let Some(fwmark) = rule.fwmark {
        insert(&mut ret, "mark", u(fwmark.into()));
    }
    if let Some(tos) = rule.tos {
        insert(&mut ret, "type-of-service", u(tos.into()));
    }
    Value::Mapping(ret)
}

fn emit_tunnel(ret: &mut Mapping, def: &NetDefinition) {
    let tunnel = &def.tunnel;
    if let Some(mode) = tunnel.mode {
        insert(ret, "mode", s(&mode.to_string()));
    }
    if let Some(local) = tunnel.local.as_deref() {
        insert(ret, "local", s(local));
    }
    if let Some(remote) = tunnel.remote.as_deref() {
        insert(ret, "remote", s(remote));
    }
    if let Some(ttl) = tunnel.ttl {
        insert(ret, "ttl", u(ttl.into()));
    }
    let has_keys = tunnel.input_key.is_some()
        || tunnel.output_key.is_some()
        || tunnel.private_key.is_some()
        || !tunnel.private_key_flags.is_empty();
    if has_keys {
        let mut keys = Mapping::new();
        if let Some(v) = tunnel.input_key.as_deref() {
            insert(&mut keys, "input", s(v));
        }
        if let Some(v) = tunnel.output_key.as_deref() {
            insert(&mut keys, "output", s(v));
        }
        if let Some(v) = tunnel.private_key.as_deref() {
            insert(&mut keys, "private", s(v));
        }
        if !tunnel.private_key_flags.is_empty() {
            insert(
                &mut keys,
                "private-key-flags",
                flag_seq(
                    tunnel.private_key_flags.0,
                    &crate::netdef::KeyFlags::NAMES,
                ),
            );
        }
        insert(ret, "keys", Value::Mapping(keys));
    }
    if let Some(port) = tunnel.port {
        insert(ret, "port", u(port.into()));
    }
    if let Some(fwmark) = tunnel.fwmark {
        insert(ret, "mark", u(fwmark.into()));
    }
    if tunnel.mode == Some(TunnelMode::Wireguard)
        && !def.wireguard_peers.is_empty()
    {
        let mut peers = Vec::new();
        for peer in &def.wireguard_peers {
            let mut m = Mapping::new();
            let mut keys = Mapping::new();
            if let Some(v) = peer.public_key.as_deref() {
                insert(&mut keys, "public", s(v));
            }
            if let Some(v) = peer.preshared_key.as_deref() {
                insert(&mut keys, "shared", s(v));
            }
            if !keys.is_empty() {
                insert(&mut m, "keys", Value::Mapping(keys));
            }
            if let Some(endpoint) = peer.endpoint.as_deref() {
                insert(&mut m, "endpoint", s(endpoint));
            }
            if let Some(keepalive) = peer.keepalive {
                insert(&mut m, "keepalive", u(keepalive.into()));
            }
            if !peer.allowed_ips.is_empty() {
                insert(
                    &mut m,
                    "allowed-ips",
                    string_seq(&peer.allowed_ips),
                );
            }
            peers.push(Value::Mapping(m));
        }
        insert(ret, "peers", Value::Sequence(peers));
    }
}

fn emit_vxlan(ret: &mut Mapping, def: &NetDefinition) {
    insert(ret, "mode", s("vxlan"));
    let vxlan = match def.vxlan.as_ref() {
        Some(vxlan) => vxlan,
        None => return,
    };
    if let Some(vni) = vxlan.vni {
        insert(ret, "id", u(vni.into()));
    }
    if let Some(link) = def.vxlan_link.as_deref() {
        insert(ret, "link", s(link));
    }
    if let Some(local) = def.tunnel.local.as_deref() {
        insert(ret, "local", s(local));
    }
    if let Some(remote) = def.tunnel.remote.as_deref() {
        insert(ret, "remote", s(remote));
    }
    if let Some(ttl) = vxlan.ttl {
        insert(ret, "ttl", u(ttl.into()));
    }
    if let Some(tos) = vxlan.tos {
        insert(ret, "type-of-service", u(tos.into()));
    }
    if let Some(label) = vxlan.flow_label {
        insert(ret, "flow-label", u(label.into()));
    }
    if let Some(v) = vxlan.mac_learning {
        insert(ret, "mac-learning", b(v));
    }
    if let Some(v) = vxlan.ageing {
        insert(ret, "ageing", u(v.into()));
    }
    if let Some(v) = vxlan.limit {
        insert(ret, "limit", u(v.into()));
    }
    if let Some(v) = vxlan.arp_proxy {
        insert(ret, "arp-proxy", b(v));
    }
    if let Some(v) = vxlan.short_circuit {
        insert(ret, "short-circuit", b(v));
    }
    if let Some(v) = vxlan.do_not_fragment {
        insert(ret, "do-not-fragment", b(v));
    }
    if let Some(port) = vxlan.port {
        insert(ret, "port", u(port.into()));
    }
    if let Some((low, high)) = vxlan.port_range {
        insert(
            ret,
            "port-range",
            Value::Sequence(vec![u(low.into()), u(high.into())]),
        );
    }
    if !vxlan.notifications.is_empty() {
        insert(
            ret,
            "notifications",
            flag_seq(
                vxlan.notifications.0,
                &VxlanNotifications::NAMES,
            ),
        );
    }
    if !vxlan.checksums.is_empty() {
        insert(
            ret,
            "checksums",
            flag_seq(vxlan.checksums.0, &VxlanChecksums::NAMES),
        );
    }
    if !vxlan.extensions.is_empty() {
        insert(
            ret,
            "extensions",
            flag_seq(vxlan.extensions.0, &VxlanExtensions::NAMES),
        );
    }
}

fn def_ovs_mapping(settings: &OvsSettings) -> Mapping {
    let mut ret = Mapping::new();
    if !settings.external_ids.is_empty() {
        insert(
            &mut ret,
            "external-ids",
            json_map_to_yaml(&settings.external_ids),
        );
    }
    if !settings.other_config.is_empty() {
        insert(
            &mut ret,
            "other-config",
            json_map_to_yaml(&settings.other_config),
        );
    }
    if let Some(lacp) = settings.lacp.as_deref() {
        insert(&mut ret, "lacp", s(lacp));
    }
    if let Some(mode) = settings.fail_mode.as_deref() {
        insert(&mut ret, "fail-mode", s(mode));
    }
    if let Some(v) = settings.mcast_snooping {
        insert(&mut ret, "mcast-snooping", b(v));
    }
    if let Some(v) = settings.rstp {
        insert(&mut ret, "rstp", b(v));
    }
    if !settings.protocols.is_empty() {
        insert(
            &mut ret,
            "protocols",
            string_seq(&settings.protocols),
        );
    }
    if !settings.controller.is_empty() {
        let mut controller = Mapping::new();
        if !settings.controller.addresses.is_empty() {
            insert(
                &mut controller,
                "addresses",
                string_seq(&settings.controller.addresses),
            );
        }
        if let Some(mode) =
            settings.controller.connection_mode.as_deref()
        {
            insert(&mut controller, "connection-mode", s(mode));
        }
        insert(&mut ret, "controller", Value::Mapping(controller));
    }
    ret
}

fn emit_modem(ret: &mut Mapping, def: &NetDefinition) {
    let params = &def.modem_params;
    if let Some(v) = params.apn.as_deref() {
        insert(ret, "apn", s(v));
    }
    if params.auto_config {
        insert(ret, "auto-config", b(true));
    }
    if let Some(v) = params.device_id.as_deref() {
        insert(ret, "device-id", s(v));
    }
    if let Some(v) = params.network_id.as_deref() {
        insert(ret, "network-id", s(v));
    }
    if let Some(v) = params.number.as_deref() {
        insert(ret, "number", s(v));
    }
    if let Some(v) = params.password.as_deref() {
        insert(ret, "password", s(v));
    }
    if let Some(v) = params.pin.as_deref() {
        insert(ret, "pin", s(v));
    }
    if let Some(v) = params.sim_id.as_deref() {
        insert(ret, "sim-id", s(v));
    }
    if let Some(v) = params.sim_operator_id.as_deref() {
        insert(ret, "sim-operator-id", s(v));
    }
    if let Some(v) = params.username.as_deref() {
        insert(ret, "username", s(v));
    }
}

fn access_point_mapping(ap: &WifiAccessPoint) -> Mapping {
    let mut ret = Mapping::new();
    if ap.mode != WifiMode::Infrastructure {
        insert(&mut ret, "mode", s(&ap.mode.to_string()));
    }
    if let Some(bssid) = ap.bssid.as_deref() {
        insert(&mut ret, "bssid", s(bssid));
    }
    if let Some(band) = ap.band {
        insert(&mut ret, "band", s(&band.to_string()));
    }
    if let Some(channel) = ap.channel {
        insert(&mut ret, "channel", u(channel.into()));
    }
    if ap.hidden {
        insert(&mut ret, "hidden", b(true));
    }
    if let Some(auth) = ap.auth.as_ref() {
        if auth.is_psk_only() {
            if let Some(password) = auth.password.as_deref() {
                insert(&mut ret, "password", s(password));
            }
        } else {
            insert(
                &mut ret,
                "auth",
                Value::Mapping(auth_mapping(auth)),
            );
        }
    }
    if !ap.passthrough.is_empty() {
        let mut nm = Mapping::new();
        insert(
            &mut nm,
            "passthrough",
            json_map_to_yaml(&ap.passthrough),
        );
        insert(&mut ret, "networkmanager", Value::Mapping(nm));
    }
    ret
}

/// Write a single netdef below `rootdir`, to its
/// [yaml_output_filename] relative location.
pub(crate) fn write_netdef_yaml(
    def: &NetDefinition,
    rootdir: &Path,
) -> Result<(), NetplanError> {
    let relative = yaml_output_filename(def);
    let relative = relative.trim_start_matches('/');
    let path = rootdir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let membership = Membership::default();
    let mut group = Mapping::new();
    group.insert(
        s(def.id.as_str()),
        Value::Mapping(netdef_mapping(def, &membership)),
    );
    let mut network = Mapping::new();
    insert(&mut network, "version", u(2));
    let section = def
        .device_type
        .section()
        .unwrap_or("ethernets");
    insert(&mut network, section, Value::Mapping(group));
    let mut root = Mapping::new();
    insert(&mut root, "network", Value::Mapping(network));
    let file = std::fs::File::create(&path).map_err(|e| {
        NetplanError::from(e)
            .with_path(path.to_string_lossy().as_ref())
    })?;
    serde_yaml::to_writer(file, &Value::Mapping(root)).map_err(|e| {
        NetplanError::new(ErrorKind::EmitterFailure, e.to_string())
    })
}

// SPDX-License-Identifier: Apache-2.0

// Reverse parsing of NetworkManager keyfiles into netdefs. Whatever a
// typed netdef field can carry is absorbed (and consumed), the
// remainder survives as `group.key` passthrough entries so a re-emitted
// connection is lossless.

use std::path::Path;

use log::warn;

use super::{parse_bool, split_list, KeyFile};
use crate::netdef::{
    Address, AuthenticationSettings, EapMethod, IpRoute,
    KeyManagementType, NetDefinition, TunnelMode, WifiAccessPoint,
    WifiBand, WifiMode, WireguardPeer,
};
use crate::parser::{LinkKind, Parser};
use crate::types::{AddrGenMode, DeviceType, NetplanBackend};
use crate::validators::is_wireguard_key;
use crate::{ErrorKind, NetplanError};

const WIFI_GROUPS: [&str; 5] = [
    "wifi",
    "802-11-wireless",
    "wifi-security",
    "802-11-wireless-security",
    "802-1x",
];

fn config_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::InvalidConfig, msg)
}

/// NM connection.type to device type. Unknown types fall back to a
/// passthrough-only netdef.
fn device_type_for(conn_type: &str) -> DeviceType {
    match conn_type {
        "ethernet" | "802-3-ethernet" => DeviceType::Ethernet,
        "wifi" | "802-11-wireless" => DeviceType::Wifi,
        "gsm" | "cdma" => DeviceType::Modem,
        "bridge" => DeviceType::Bridge,
        "bond" => DeviceType::Bond,
        "vlan" => DeviceType::Vlan,
        "vrf" => DeviceType::Vrf,
        "ip-tunnel" | "wireguard" => DeviceType::Tunnel,
        "dummy" => DeviceType::Dummy,
        "veth" => DeviceType::Veth,
        _ => DeviceType::NmPassthrough,
    }
}

/// NMSettingIPTunnelMode numbering.
fn tunnel_mode_for(value: &str) -> Option<TunnelMode> {
    match value {
        "1" | "ipip" => Some(TunnelMode::Ipip),
        "2" | "gre" => Some(TunnelMode::Gre),
        "3" | "sit" => Some(TunnelMode::Sit),
        "4" | "isatap" => Some(TunnelMode::Isatap),
        "5" | "vti" => Some(TunnelMode::Vti),
        "6" | "ip6ip6" => Some(TunnelMode::Ip6ip6),
        "7" | "ipip6" => Some(TunnelMode::Ipip6),
        "8" | "ip6gre" => Some(TunnelMode::Ip6gre),
        "9" | "vti6" => Some(TunnelMode::Vti6),
        "10" | "gretap" => Some(TunnelMode::Gretap),
        "11" | "ip6gretap" => Some(TunnelMode::Ip6gretap),
        _ => None,
    }
}

impl Parser {
    pub fn load_keyfile<P: AsRef<Path>>(
        &mut self,
        filename: P,
    ) -> Result<(), NetplanError> {
        let filename = filename.as_ref();
        let name = filename.to_string_lossy().to_string();
        let content = std::fs::read_to_string(filename).map_err(|e| {
            NetplanError::from(e).with_path(name.as_str())
        })?;
        self.load_keyfile_str(name.as_str(), content.as_str())
    }

    /// Parse one NetworkManager keyfile into a netdef backed by the
    /// NetworkManager renderer.
    pub fn load_keyfile_str(
        &mut self,
        filename: &str,
        content: &str,
    ) -> Result<(), NetplanError> {
        let mut kf = KeyFile::parse(content)
            .map_err(|e| e.with_path(filename))?;
        let uuid = kf.remove("connection", "uuid").ok_or_else(|| {
            config_error(
                "keyfile is missing connection.uuid".to_string(),
            )
            .with_path(filename)
        })?;
        uuid::Uuid::parse_str(uuid.as_str()).map_err(|_| {
            config_error(format!(
                "keyfile has malformed connection.uuid '{uuid}'"
            ))
            .with_path(filename)
        })?;
        let conn_type =
            kf.remove("connection", "type").ok_or_else(|| {
                config_error(
                    "keyfile is missing connection.type".to_string(),
                )
                .with_path(filename)
            })?;
        let ssid = kf
            .get("wifi", "ssid")
            .or_else(|| kf.get("802-11-wireless", "ssid"))
            .map(str::to_string);
        let ifname = kf.remove("connection", "interface-name");
        let device_type = device_type_for(conn_type.as_str());
        let id = netdef_id_for(
            filename,
            uuid.as_str(),
            ssid.as_deref(),
            ifname.as_deref(),
            device_type,
        );

        self.sources.insert(filename.to_string());
        self.define_netdef(id.as_str(), device_type)?;
        let mut def = match self.defs.remove(id.as_str()) {
            Some(def) => def,
            None => NetDefinition::new(id.as_str(), device_type),
        };
        def.backend = NetplanBackend::NetworkManager;
        def.filepath = Some(filename.to_string());
        def.backend_settings.uuid = Some(uuid);
        def.backend_settings.name = kf.remove("connection", "id");
        def.backend_settings.stable_id =
            kf.remove("connection", "stable-id");
        if let Some(ifname) = ifname {
            // Virtual devices are named by their netdef id, physical
            // ones get a rename.
            if !device_type.is_virtual() {
                def.set_name = Some(ifname);
            }
        }

        let result = self.absorb_keyfile(
            &mut def,
            &mut kf,
            conn_type.as_str(),
            ssid.as_deref(),
        );
        if result.is_ok() {
            self.absorb_passthrough(&mut def, kf, ssid.as_deref());
        }
        self.defs.insert(id, def);
        result.map_err(|e| e.with_path(filename))
    }

    fn absorb_keyfile(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
        conn_type: &str,
        ssid: Option<&str>,
    ) -> Result<(), NetplanError> {
        self.absorb_ip_group(def, kf, 4)?;
        self.absorb_ip_group(def, kf, 6)?;
        for group in ["ethernet", "802-3-ethernet"] {
            self.absorb_link_group(def, kf, group);
        }
        match def.device_type {
            DeviceType::Wifi => {
                self.absorb_wifi(def, kf, ssid)?;
            }
            DeviceType::Modem => self.absorb_gsm(def, kf),
            DeviceType::Vlan => self.absorb_vlan(def, kf)?,
            DeviceType::Bridge => self.absorb_bridge(def, kf),
            DeviceType::Bond => self.absorb_bond(def, kf),
            DeviceType::Vrf => {
                if let Some(table) = kf.remove("vrf", "table") {
                    match table.parse() {
                        Ok(table) => def.table = Some(table),
                        Err(_) => {
                            warn!(
                                "ignoring invalid vrf.table '{table}'"
                            );
                        }
                    }
                }
            }
            DeviceType::Tunnel => {
                if conn_type == "wireguard" {
                    self.absorb_wireguard(def, kf);
                } else {
                    self.absorb_ip_tunnel(def, kf);
                }
            }
            _ => (),
        }
        // Wired 802.1x, wifi keeps it with the access point instead.
        if def.device_type != DeviceType::Wifi && kf.has_group("802-1x")
        {
            def.auth = Some(absorb_dot1x(kf));
        }
        Ok(())
    }

    fn absorb_ip_group(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
        family: u8,
    ) -> Result<(), NetplanError> {
        let group = if family == 4 { "ipv4" } else { "ipv6" };
        if let Some(method) = kf.remove(group, "method") {
            match (family, method.as_str()) {
                (4, "auto") => def.dhcp4 = Some(true),
                (4, "link-local") => def.link_local.ipv4 = true,
                (6, "auto") | (6, "dhcp") => def.dhcp6 = Some(true),
                (6, "ignore") | (6, "disabled") => {
                    def.link_local.ipv6 = false
                }
                (_, "manual") => (),
                _ => {
                    // Unhandled methods survive as passthrough.
                    kf.groups
                        .iter_mut()
                        .find(|g| g.name == group)
                        .map(|g| {
                            g.entries.insert(
                                0,
                                ("method".to_string(), method.clone()),
                            )
                        });
                }
            }
        }
        // address1..addressN, each `ip/prefix[,gateway]`.
        let mut n = 1;
        while let Some(value) = kf.remove(group, &format!("address{n}"))
        {
            let (cidr, gateway) = match value.split_once(',') {
                Some((cidr, gateway)) => (cidr, Some(gateway)),
                None => (value.as_str(), None),
            };
            match Address::from_cidr(cidr) {
                Ok(address) => def.addresses.push(address),
                Err(_) => {
                    warn!("ignoring invalid address '{cidr}'");
                }
            }
            if let Some(gateway) = gateway {
                if family == 4 {
                    def.gateway4 = Some(gateway.to_string());
                } else {
                    def.gateway6 = Some(gateway.to_string());
                }
            }
            n += 1;
        }
        if let Some(gateway) = kf.remove(group, "gateway") {
            if family == 4 {
                def.gateway4 = Some(gateway);
            } else {
                def.gateway6 = Some(gateway);
            }
        }
        if let Some(dns) = kf.remove(group, "dns") {
            let servers = split_list(dns.as_str());
            if family == 4 {
                def.ip4_nameservers.extend(servers);
            } else {
                def.ip6_nameservers.extend(servers);
            }
        }
        if let Some(search) = kf.remove(group, "dns-search") {
            def.search_domains.extend(split_list(search.as_str()));
        }
        let mut n = 1;
        while let Some(value) = kf.remove(group, &format!("route{n}")) {
            let options = kf.remove(group, &format!("route{n}_options"));
            match parse_keyfile_route(
                family,
                value.as_str(),
                options.as_deref(),
            ) {
                Ok(route) => def.routes.push(route),
                Err(e) => {
                    warn!("ignoring invalid route '{value}': {e}");
                }
            }
            n += 1;
        }
        // DHCP behavior toggles.
        let overrides = if family == 4 {
            &mut def.dhcp4_overrides
        } else {
            &mut def.dhcp6_overrides
        };
        if let Some(v) = kf.remove(group, "ignore-auto-dns") {
            if let Some(v) = parse_bool(v.as_str()) {
                overrides.use_dns = !v;
            }
        }
        if let Some(v) = kf.remove(group, "ignore-auto-routes") {
            if let Some(v) = parse_bool(v.as_str()) {
                overrides.use_routes = !v;
            }
        }
        if let Some(v) = kf.remove(group, "route-metric") {
            if let Ok(v) = v.parse() {
                overrides.metric = Some(v);
            }
        }
        if let Some(v) = kf.remove(group, "dhcp-hostname") {
            overrides.hostname = Some(v);
        }
        if let Some(v) = kf.remove(group, "dhcp-send-hostname") {
            if let Some(v) = parse_bool(v.as_str()) {
                overrides.send_hostname = v;
            }
        }
        if family == 6 {
            if let Some(v) = kf.remove(group, "addr-gen-mode") {
                match v.as_str() {
                    "0" | "eui64" => {
                        def.ipv6_addr_gen_mode = Some(AddrGenMode::Eui64)
                    }
                    "1" | "stable-privacy" => {
                        def.ipv6_addr_gen_mode =
                            Some(AddrGenMode::StablePrivacy)
                    }
                    _ => warn!(
                        "ignoring invalid ipv6.addr-gen-mode '{v}'"
                    ),
                }
            }
            if let Some(v) = kf.remove(group, "token") {
                def.ipv6_addr_gen_token = Some(v);
            }
            if let Some(v) = kf.remove(group, "ip6-privacy") {
                match v.as_str() {
                    "2" => def.ipv6_privacy = Some(true),
                    "0" => def.ipv6_privacy = Some(false),
                    _ => warn!(
                        "ignoring invalid ipv6.ip6-privacy '{v}'"
                    ),
                }
            }
        }
        Ok(())
    }

    /// MTU, MAC settings and wake-on-lan of the wired/wireless link
    /// groups.
    fn absorb_link_group(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
        group: &str,
    ) {
        if let Some(mtu) = kf.remove(group, "mtu") {
            match mtu.parse() {
                Ok(mtu) => def.mtu = Some(mtu),
                Err(_) => warn!("ignoring invalid {group}.mtu '{mtu}'"),
            }
        }
        if let Some(mac) = kf.remove(group, "cloned-mac-address") {
            def.set_mac = Some(mac);
        }
        if let Some(mac) = kf.remove(group, "mac-address") {
            def.matches.mac = Some(mac);
            def.has_match = true;
        }
        if let Some(wol) = kf.get(group, "wake-on-lan") {
            // NM's magic-packet bit is the only form netplan models.
            // Other combinations stay passthrough.
            match wol.parse::<u32>() {
                Ok(v) if v & crate::types::WolFlags::MAGIC != 0 => {
                    def.wake_on_lan = Some(true);
                    kf.remove(group, "wake-on-lan");
                }
                Ok(0) => {
                    def.wake_on_lan = Some(false);
                    kf.remove(group, "wake-on-lan");
                }
                _ => (),
            }
        }
    }

    fn absorb_wifi(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
        ssid: Option<&str>,
    ) -> Result<(), NetplanError> {
        let ssid = ssid.ok_or_else(|| {
            config_error(format!(
                "{}: wifi keyfile is missing the SSID",
                def.id
            ))
        })?;
        let mut ap = WifiAccessPoint::new(ssid);
        for group in ["wifi", "802-11-wireless"] {
            kf.remove(group, "ssid");
            self.absorb_link_group(def, kf, group);
            if let Some(mode) = kf.remove(group, "mode") {
                ap.mode = WifiMode::parse(mode.as_str())
                    .unwrap_or_default();
            }
            if let Some(band) = kf.remove(group, "band") {
                ap.band = match band.as_str() {
                    "a" => Some(WifiBand::Band5G),
                    "bg" => Some(WifiBand::Band24G),
                    _ => {
                        warn!("ignoring invalid wifi band '{band}'");
                        None
                    }
                };
            }
            if let Some(channel) = kf.remove(group, "channel") {
                match channel.parse() {
                    Ok(channel) => ap.channel = Some(channel),
                    Err(_) => warn!(
                        "ignoring invalid wifi channel '{channel}'"
                    ),
                }
            }
            if let Some(hidden) = kf.remove(group, "hidden") {
                ap.hidden =
                    parse_bool(hidden.as_str()).unwrap_or(false);
            }
        }
        let mut auth = AuthenticationSettings::new();
        for group in ["wifi-security", "802-11-wireless-security"] {
            if let Some(kmt) = kf.remove(group, "key-mgmt") {
                auth.key_management = Some(match kmt.as_str() {
                    "none" => KeyManagementType::None,
                    "wpa-psk" => KeyManagementType::Psk,
                    "wpa-eap" => KeyManagementType::Eap,
                    "wpa-eap-suite-b-192" => {
                        KeyManagementType::EapSuiteB192
                    }
                    "sae" => KeyManagementType::Sae,
                    "ieee8021x" => KeyManagementType::Dot1x,
                    _ => {
                        warn!("unknown key-mgmt '{kmt}'");
                        KeyManagementType::None
                    }
                });
            }
            if let Some(psk) = kf.remove(group, "psk") {
                auth.password = Some(psk);
            }
        }
        if kf.has_group("802-1x") {
            let dot1x = absorb_dot1x(kf);
            auth.eap_method = dot1x.eap_method;
            auth.identity = dot1x.identity;
            auth.anonymous_identity = dot1x.anonymous_identity;
            if auth.password.is_none() {
                auth.password = dot1x.password;
            }
            auth.ca_certificate = dot1x.ca_certificate;
            auth.client_certificate = dot1x.client_certificate;
            auth.client_key = dot1x.client_key;
            auth.client_key_password = dot1x.client_key_password;
            auth.phase2_auth = dot1x.phase2_auth;
        }
        if auth != AuthenticationSettings::new() {
            ap.auth = Some(auth);
        }
        def.access_points.push(ap);
        Ok(())
    }

    fn absorb_gsm(&mut self, def: &mut NetDefinition, kf: &mut KeyFile) {
        let params = &mut def.modem_params;
        params.apn = kf.remove("gsm", "apn");
        if let Some(v) = kf.remove("gsm", "auto-config") {
            params.auto_config =
                parse_bool(v.as_str()).unwrap_or(false);
        }
        params.device_id = kf.remove("gsm", "device-id");
        params.network_id = kf.remove("gsm", "network-id");
        params.number = kf
            .remove("gsm", "number")
            .or_else(|| kf.remove("cdma", "number"));
        params.password = kf
            .remove("gsm", "password")
            .or_else(|| kf.remove("cdma", "password"));
        params.pin = kf.remove("gsm", "pin");
        params.sim_id = kf.remove("gsm", "sim-id");
        params.sim_operator_id = kf.remove("gsm", "sim-operator-id");
        params.username = kf
            .remove("gsm", "username")
            .or_else(|| kf.remove("cdma", "username"));
    }

    fn absorb_vlan(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
    ) -> Result<(), NetplanError> {
        if let Some(id) = kf.remove("vlan", "id") {
            match id.parse() {
                Ok(id) if id <= 4094 => def.vlan_id = Some(id),
                _ => warn!("ignoring invalid vlan.id '{id}'"),
            }
        }
        if let Some(parent) = kf.remove("vlan", "parent") {
            def.vlan_link = Some(parent.clone());
            let id = def.id.clone();
            self.link_netdef(
                id.as_str(),
                parent.as_str(),
                LinkKind::VlanLink,
            )?;
        }
        Ok(())
    }

    fn absorb_bridge(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
    ) {
        let params = &mut def.bridge_params;
        if let Some(stp) = kf.remove("bridge", "stp") {
            params.stp = parse_bool(stp.as_str());
        }
        if let Some(priority) = kf.remove("bridge", "priority") {
            match priority.parse() {
                Ok(priority) => params.priority = Some(priority),
                Err(_) => warn!(
                    "ignoring invalid bridge.priority '{priority}'"
                ),
            }
        }
        params.forward_delay = kf.remove("bridge", "forward-delay");
        params.hello_time = kf.remove("bridge", "hello-time");
        params.max_age = kf.remove("bridge", "max-age");
        params.ageing_time = kf.remove("bridge", "ageing-time");
    }

    fn absorb_bond(&mut self, def: &mut NetDefinition, kf: &mut KeyFile) {
        let id = def.id.clone();
        let params = &mut def.bond_params;
        if let Some(mode) = kf.get("bond", "mode") {
            let mode = mode.to_string();
            if params.set_mode(mode.as_str(), id.as_str()).is_ok() {
                kf.remove("bond", "mode");
            } else {
                warn!("ignoring unknown bond mode '{mode}'");
            }
        }
        params.lacp_rate = kf.remove("bond", "lacp_rate");
        params.monitor_interval = kf.remove("bond", "miimon");
        if let Some(v) = kf.remove("bond", "min_links") {
            params.min_links = v.parse().ok();
        }
        params.transmit_hash_policy =
            kf.remove("bond", "xmit_hash_policy");
        params.selection_logic = kf.remove("bond", "ad_select");
        if let Some(v) = kf.remove("bond", "all_slaves_active") {
            params.all_members_active = parse_bool(v.as_str());
        }
        params.arp_interval = kf.remove("bond", "arp_interval");
        if let Some(v) = kf.remove("bond", "arp_ip_target") {
            params.arp_ip_targets = v
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        params.arp_validate = kf.remove("bond", "arp_validate");
        params.arp_all_targets = kf.remove("bond", "arp_all_targets");
        params.up_delay = kf.remove("bond", "updelay");
        params.down_delay = kf.remove("bond", "downdelay");
        params.fail_over_mac_policy = kf.remove("bond", "fail_over_mac");
        if let Some(v) = kf.remove("bond", "num_grat_arp") {
            params.gratuitous_arp = v.parse().ok();
        }
        if let Some(v) = kf.remove("bond", "packets_per_slave") {
            params.packets_per_member = v.parse().ok();
        }
        params.primary_reselect_policy =
            kf.remove("bond", "primary_reselect");
        if let Some(v) = kf.remove("bond", "resend_igmp") {
            params.resend_igmp = v.parse().ok();
        }
        params.learn_interval = kf.remove("bond", "lp_interval");
        params.primary_member = kf.remove("bond", "primary");
    }

    fn absorb_ip_tunnel(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
    ) {
        if let Some(mode) = kf.get("ip-tunnel", "mode") {
            match tunnel_mode_for(mode) {
                Some(mode) => {
                    def.tunnel.mode = Some(mode);
                    kf.remove("ip-tunnel", "mode");
                }
                None => {
                    warn!("unsupported ip-tunnel mode '{mode}'");
                }
            }
        }
        def.tunnel.local = kf.remove("ip-tunnel", "local");
        def.tunnel.remote = kf.remove("ip-tunnel", "remote");
        if let Some(ttl) = kf.remove("ip-tunnel", "ttl") {
            def.tunnel.ttl = ttl.parse().ok();
        }
        def.tunnel.input_key = kf.remove("ip-tunnel", "input-key");
        def.tunnel.output_key = kf.remove("ip-tunnel", "output-key");
    }

    fn absorb_wireguard(
        &mut self,
        def: &mut NetDefinition,
        kf: &mut KeyFile,
    ) {
        def.tunnel.mode = Some(TunnelMode::Wireguard);
        def.tunnel.private_key = kf.remove("wireguard", "private-key");
        if let Some(port) = kf.remove("wireguard", "listen-port") {
            def.tunnel.port = port.parse().ok();
        }
        if let Some(fwmark) = kf.remove("wireguard", "fwmark") {
            def.tunnel.fwmark = fwmark.parse().ok();
        }
        // Peers live in `[wireguard-peer.<public key>]` groups.
        let peer_groups: Vec<String> = kf
            .groups
            .iter()
            .filter(|g| g.name.starts_with("wireguard-peer."))
            .map(|g| g.name.clone())
            .collect();
        for group in peer_groups {
            let public_key = group
                .strip_prefix("wireguard-peer.")
                .unwrap_or_default()
                .to_string();
            if !is_wireguard_key(public_key.as_str()) {
                warn!(
                    "ignoring wireguard peer with invalid public key \
                    '{public_key}'"
                );
                kf.remove_group(group.as_str());
                continue;
            }
            let mut peer = WireguardPeer::new();
            peer.public_key = Some(public_key);
            peer.endpoint = kf.remove(group.as_str(), "endpoint");
            peer.preshared_key =
                kf.remove(group.as_str(), "preshared-key");
            if let Some(v) =
                kf.remove(group.as_str(), "persistent-keepalive")
            {
                peer.keepalive = v.parse().ok();
            }
            if let Some(ips) = kf.remove(group.as_str(), "allowed-ips")
            {
                peer.allowed_ips = split_list(ips.as_str());
            }
            def.wireguard_peers.push(peer);
        }
    }

    /// Whatever absorption left over becomes `group.key` passthrough:
    /// wifi related groups travel with the access point, everything
    /// else with the netdef's backend settings.
    fn absorb_passthrough(
        &mut self,
        def: &mut NetDefinition,
        kf: KeyFile,
        ssid: Option<&str>,
    ) {
        for group in kf.groups {
            let wifi_owned = def.device_type == DeviceType::Wifi
                && (WIFI_GROUPS.contains(&group.name.as_str())
                    || group.name.starts_with("wifi-")
                    || group.name.starts_with("802-11-wireless"));
            let target = if wifi_owned {
                match def
                    .access_points
                    .iter_mut()
                    .find(|ap| Some(ap.ssid.as_str()) == ssid)
                {
                    Some(ap) => &mut ap.passthrough,
                    None => &mut def.backend_settings.passthrough,
                }
            } else {
                &mut def.backend_settings.passthrough
            };
            if group.entries.is_empty() {
                // Keep empty groups alive with a placeholder key so
                // re-emission restores them.
                target.insert(
                    format!("{}._", group.name),
                    serde_json::Value::String(String::new()),
                );
                continue;
            }
            for (key, value) in group.entries {
                target.insert(
                    format!("{}.{key}", group.name),
                    serde_json::Value::String(value),
                );
            }
        }
    }
}

/// Consume the typed keys of an `[802-1x]` group. Keys with values
/// netplan cannot model stay in the keyfile for passthrough.
fn absorb_dot1x(kf: &mut KeyFile) -> AuthenticationSettings {
    let mut auth = AuthenticationSettings::new();
    if let Some(eap) = kf.get("802-1x", "eap").map(str::to_string) {
        // NM allows a list of methods, netplan models the first one.
        let first = split_list(eap.as_str()).into_iter().next();
        match first.as_deref().and_then(EapMethod::parse) {
            Some(method) => {
                auth.eap_method = Some(method);
                kf.remove("802-1x", "eap");
            }
            None => {
                warn!("unsupported 802-1x.eap '{eap}'");
            }
        }
    }
    auth.identity = kf.remove("802-1x", "identity");
    auth.anonymous_identity = kf.remove("802-1x", "anonymous-identity");
    auth.password = kf.remove("802-1x", "password");
    auth.ca_certificate = kf.remove("802-1x", "ca-cert");
    auth.client_certificate = kf.remove("802-1x", "client-cert");
    auth.client_key = kf.remove("802-1x", "private-key");
    auth.client_key_password =
        kf.remove("802-1x", "private-key-password");
    auth.phase2_auth = kf.remove("802-1x", "phase2-auth");
    auth
}

/// Derive the netdef id. A basename of the form
/// `netplan-<id>[-<ssid>].nmconnection` round-trips the id; otherwise
/// a virtual device is identified by its `connection.interface-name`,
/// and anything else becomes `NM-<uuid>`.
fn netdef_id_for(
    filename: &str,
    uuid: &str,
    ssid: Option<&str>,
    ifname: Option<&str>,
    device_type: DeviceType,
) -> String {
    let basename = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if let Some(stem) = basename
        .strip_suffix(".nmconnection")
        .and_then(|s| s.strip_prefix("netplan-"))
    {
        if let Some(ssid) = ssid {
            if let Some(id) =
                stem.strip_suffix(&format!("-{ssid}"))
            {
                return id.to_string();
            }
        }
        return stem.to_string();
    }
    if device_type.is_virtual() {
        if let Some(ifname) = ifname {
            return ifname.to_string();
        }
    }
    format!("NM-{uuid}")
}

/// `routeN=dest[,via[,metric]]` plus `routeN_options=k=v,k=v`.
fn parse_keyfile_route(
    family: u8,
    value: &str,
    options: Option<&str>,
) -> Result<IpRoute, NetplanError> {
    let mut route = IpRoute::new();
    route.family = family;
    let mut fields = value.split(',');
    route.to = Some(
        fields
            .next()
            .filter(|to| !to.is_empty())
            .ok_or_else(|| {
                config_error("route is missing a destination".to_string())
            })?
            .to_string(),
    );
    if let Some(via) = fields.next().filter(|via| !via.is_empty()) {
        route.via = Some(via.to_string());
    }
    if let Some(metric) = fields.next().filter(|m| !m.is_empty()) {
        route.metric = Some(metric.parse().map_err(|_| {
            config_error(format!("invalid route metric '{metric}'"))
        })?);
    }
    if let Some(options) = options {
        for option in options.split(',') {
            let (key, value) = match option.split_once('=') {
                Some(kv) => kv,
                None => continue,
            };
            match key.trim() {
                "table" => route.table = value.parse().ok(),
                "onlink" => route.onlink = parse_bool(value),
                "mtu" => route.mtu = value.parse().ok(),
                "cwnd" => route.congestion_window = value.parse().ok(),
                _ => warn!("ignoring route option '{key}'"),
            }
        }
    }
    Ok(route)
}

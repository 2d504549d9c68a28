// SPDX-License-Identifier: Apache-2.0

// Handlers for the keys shared by every device type: addressing, DNS,
// routes, match/set-name, NetworkManager settings and the assorted
// boolean toggles.

use log::warn;
use serde_yaml::Value;

use super::value::{
    as_mapping, as_sequence, entry_key, scalar_bool, scalar_str, scalar_u32,
};
use super::Parser;
use crate::netdef::{
    Address, AuthenticationSettings, DhcpOverrides, EapMethod, IpRoute,
    IpRule, KeyManagementType, NetDefinition, PmfMode, RouteScope,
    RouteType,
};
use crate::types::{
    AddrGenMode, DhcpIdentifier, NetplanBackend, OptionalAddressFlags,
    RaMode, WowlanFlags,
};
use crate::validators::{is_ip4_address, is_ip6_address, is_mac_address};
use crate::{ErrorKind, NetplanError};

// MAC policy strings NetworkManager understands in place of a literal
// address.
pub(crate) const NM_MAC_OPTIONS: [&str; 4] =
    ["permanent", "random", "stable", "preserve"];

fn config_error(msg: String) -> NetplanError {
    NetplanError::new(ErrorKind::InvalidConfig, msg)
}

/// Passthrough entries address a keyfile location, so the key must be
/// `group.key` with both parts non-empty.
pub(crate) fn is_passthrough_key(key: &str) -> bool {
    matches!(
        key.split_once('.'),
        Some((group, rest)) if !group.is_empty() && !rest.is_empty()
    )
}

/// IP family of a plain or CIDR address, `None` when unparseable.
pub(crate) fn addr_family(s: &str) -> Option<u8> {
    let addr = s.split('/').next().unwrap_or(s);
    if is_ip4_address(addr) {
        Some(4)
    } else if is_ip6_address(addr) {
        Some(6)
    } else {
        None
    }
}

impl Parser {
    pub(crate) fn handle_common_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        path: &[String],
    ) -> Result<bool, NetplanError> {
        match key {
            "renderer" => {
                let renderer = scalar_str(key, value)?;
                def.backend = NetplanBackend::from_renderer(
                    renderer.as_str(),
                )
                .ok_or_else(|| {
                    config_error(format!(
                        "{}: unknown renderer '{renderer}'",
                        def.id
                    ))
                })?;
            }
            "dhcp4" => def.dhcp4 = Some(scalar_bool(key, value)?),
            "dhcp6" => def.dhcp6 = Some(scalar_bool(key, value)?),
            "dhcp-identifier" => {
                let v = scalar_str(key, value)?;
                def.dhcp_identifier = Some(match v.as_str() {
                    "duid" => DhcpIdentifier::Duid,
                    "mac" => DhcpIdentifier::Mac,
                    _ => {
                        return Err(config_error(format!(
                            "{}: invalid dhcp-identifier '{v}'",
                            def.id
                        )));
                    }
                });
            }
            "dhcp4-overrides" => {
                let mut overrides = def.dhcp4_overrides.clone();
                self.handle_dhcp_overrides(
                    &mut overrides,
                    value,
                    path,
                    key,
                )?;
                def.dhcp4_overrides = overrides;
            }
            "dhcp6-overrides" => {
                let mut overrides = def.dhcp6_overrides.clone();
                self.handle_dhcp_overrides(
                    &mut overrides,
                    value,
                    path,
                    key,
                )?;
                def.dhcp6_overrides = overrides;
            }
            "accept-ra" => {
                def.accept_ra = if scalar_bool(key, value)? {
                    RaMode::Enabled
                } else {
                    RaMode::Disabled
                };
            }
            "addresses" => self.handle_addresses(def, value)?,
            "gateway4" => {
                let gw = scalar_str(key, value)?;
                if !is_ip4_address(gw.as_str()) {
                    return Err(config_error(format!(
                        "{}: invalid IPv4 address '{gw}'",
                        def.id
                    )));
                }
                warn!(
                    "`gateway4` has been deprecated, use default routes \
                    instead."
                );
                def.gateway4 = Some(gw);
            }
            "gateway6" => {
                let gw = scalar_str(key, value)?;
                if !is_ip6_address(gw.as_str()) {
                    return Err(config_error(format!(
                        "{}: invalid IPv6 address '{gw}'",
                        def.id
                    )));
                }
                warn!(
                    "`gateway6` has been deprecated, use default routes \
                    instead."
                );
                def.gateway6 = Some(gw);
            }
            "nameservers" => {
                self.handle_nameservers(def, value, path, key)?
            }
            "routes" => self.handle_routes(def, value)?,
            "routing-policy" => self.handle_ip_rules(def, value)?,
            "mtu" => def.mtu = Some(scalar_u32(key, value)?),
            "ipv6-mtu" => def.ipv6_mtu = Some(scalar_u32(key, value)?),
            "ipv6-privacy" => {
                def.ipv6_privacy = Some(scalar_bool(key, value)?)
            }
            "ipv6-address-generation" => {
                let v = scalar_str(key, value)?;
                if def.ipv6_addr_gen_token.is_some() {
                    return Err(config_error(format!(
                        "{}: ipv6-address-generation and \
                        ipv6-address-token are mutually exclusive",
                        def.id
                    )));
                }
                def.ipv6_addr_gen_mode = Some(match v.as_str() {
                    "eui64" => AddrGenMode::Eui64,
                    "stable-privacy" => AddrGenMode::StablePrivacy,
                    _ => {
                        return Err(config_error(format!(
                            "{}: unknown ipv6-address-generation '{v}'",
                            def.id
                        )));
                    }
                });
            }
            "ipv6-address-token" => {
                let token = scalar_str(key, value)?;
                if def.ipv6_addr_gen_mode.is_some() {
                    return Err(config_error(format!(
                        "{}: ipv6-address-generation and \
                        ipv6-address-token are mutually exclusive",
                        def.id
                    )));
                }
                if !is_ip6_address(token.trim_start_matches("::")) {
                    return Err(config_error(format!(
                        "{}: invalid ipv6-address-token '{token}'",
                        def.id
                    )));
                }
                def.ipv6_addr_gen_token = Some(token);
            }
            "link-local" => self.handle_link_local(def, value)?,
            "critical" => def.critical = scalar_bool(key, value)?,
            "optional" => def.optional = scalar_bool(key, value)?,
            "optional-addresses" => {
                self.handle_optional_addresses(def, value)?
            }
            "activation-mode" => {
                let v = scalar_str(key, value)?;
                if v != "manual" && v != "off" {
                    return Err(config_error(format!(
                        "{}: Value of 'activation-mode' needs to be \
                        'manual' or 'off'",
                        def.id
                    )));
                }
                def.activation_mode = Some(v);
            }
            "macaddress" => {
                let mac = scalar_str(key, value)?;
                if !is_mac_address(mac.as_str())
                    && !NM_MAC_OPTIONS.contains(&mac.as_str())
                {
                    return Err(config_error(format!(
                        "{}: invalid MAC address '{mac}', must be \
                        XX:XX:XX:XX:XX:XX",
                        def.id
                    )));
                }
                def.set_mac = Some(mac);
            }
            "ignore-carrier" => {
                def.ignore_carrier = scalar_bool(key, value)?
            }
            "networkmanager" => {
                self.handle_networkmanager(def, value, path, key)?
            }
            "openvswitch" => self.handle_def_ovs(def, value, path, key)?,
            // Keys below only make sense on physical devices.
            "match" if def.device_type.is_physical() => {
                self.handle_match(def, value, path, key)?
            }
            "set-name" if def.device_type.is_physical() => {
                def.set_name = Some(scalar_str(key, value)?)
            }
            "wakeonlan" if def.device_type.is_physical() => {
                def.wake_on_lan = Some(scalar_bool(key, value)?)
            }
            "emit-lldp" if def.device_type.is_physical() => {
                def.emit_lldp = Some(scalar_bool(key, value)?)
            }
            "regulatory-domain" if def.device_type.is_physical() => {
                def.regulatory_domain = Some(scalar_str(key, value)?)
            }
            "receive-checksum-offload"
                if def.device_type.is_physical() =>
            {
                def.receive_checksum_offload =
                    Some(scalar_bool(key, value)?)
            }
            "transmit-checksum-offload"
                if def.device_type.is_physical() =>
            {
                def.transmit_checksum_offload =
                    Some(scalar_bool(key, value)?)
            }
            "tcp-segmentation-offload"
                if def.device_type.is_physical() =>
            {
                def.tcp_segmentation_offload =
                    Some(scalar_bool(key, value)?)
            }
            "tcp6-segmentation-offload"
                if def.device_type.is_physical() =>
            {
                def.tcp6_segmentation_offload =
                    Some(scalar_bool(key, value)?)
            }
            "generic-segmentation-offload"
                if def.device_type.is_physical() =>
            {
                def.generic_segmentation_offload =
                    Some(scalar_bool(key, value)?)
            }
            "generic-receive-offload"
                if def.device_type.is_physical() =>
            {
                def.generic_receive_offload =
                    Some(scalar_bool(key, value)?)
            }
            "large-receive-offload"
                if def.device_type.is_physical() =>
            {
                def.large_receive_offload =
                    Some(scalar_bool(key, value)?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn handle_match(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
        path: &[String],
        key: &str,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping(key, value)?;
        def.has_match = true;
        let sub_path = extend_path(path, key);
        for (k, v) in mapping {
            let k = entry_key(k)?;
            if self.is_null_field_owned(&sub_path, k) {
                continue;
            }
            match k {
                "name" => {
                    def.matches.original_name = Some(scalar_str(k, v)?)
                }
                "macaddress" => {
                    let mac = scalar_str(k, v)?;
                    if !is_mac_address(mac.as_str()) {
                        return Err(config_error(format!(
                            "{}: invalid MAC address '{mac}', must be \
                            XX:XX:XX:XX:XX:XX",
                            def.id
                        )));
                    }
                    def.matches.mac = Some(mac);
                }
                "driver" => {
                    def.matches.driver =
                        Some(self.parse_driver_globs(def.id.as_str(), v)?)
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

    /// `driver:` accepts a single glob or a sequence of globs joined by
    /// tab. A single glob must not contain whitespace.
    fn parse_driver_globs(
        &mut self,
        id: &str,
        value: &Value,
    ) -> Result<String, NetplanError> {
        match value {
            Value::Sequence(items) => {
                let mut globs = Vec::new();
                for item in items {
                    let glob = scalar_str("driver", item)?;
                    if glob.contains(char::is_whitespace) {
                        return Err(config_error(format!(
                            "{id}: A 'driver' glob cannot contain \
                            whitespace"
                        )));
                    }
                    globs.push(glob);
                }
                Ok(globs.join("\t"))
            }
            _ => {
                let glob = scalar_str("driver", value)?;
                if glob.contains(char::is_whitespace) {
                    return Err(config_error(format!(
                        "{id}: A 'driver' glob cannot contain whitespace"
                    )));
                }
                Ok(glob)
            }
        }
    }

    fn handle_addresses(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("addresses", value)?;
        // Sequences overwrite across documents instead of appending.
        let mut addresses: Vec<Address> = Vec::new();
        for item in items {
            let address = match item {
                Value::Mapping(mapping) => {
                    let mut entries = mapping.iter();
                    let (cidr, options) =
                        match (entries.next(), entries.next()) {
                            (Some(entry), None) => entry,
                            _ => {
                                return Err(config_error(format!(
                                    "{}: expected a single address \
                                    with options",
                                    def.id
                                )));
                            }
                        };
                    let cidr = entry_key(cidr)?;
                    let mut address = Address::from_cidr(cidr)?;
                    self.parse_address_options(
                        def.id.as_str(),
                        &mut address,
                        options,
                    )?;
                    address
                }
                _ => {
                    let cidr = scalar_str("addresses", item)?;
                    Address::from_cidr(cidr.as_str())?
                }
            };
            // Duplicate appends within the same pass are dropped.
            if !addresses.iter().any(|a| a.address == address.address) {
                addresses.push(address);
            }
        }
        def.addresses = addresses;
        Ok(())
    }

    fn parse_address_options(
        &mut self,
        id: &str,
        address: &mut Address,
        options: &Value,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping("address options", options)?;
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "lifetime" => {
                    let lifetime = scalar_str(k, v)?;
                    if lifetime != "0" && lifetime != "forever" {
                        return Err(config_error(format!(
                            "{id}: invalid lifetime value '{lifetime}', \
                            must be 'forever' or 0"
                        )));
                    }
                    address.lifetime = Some(lifetime);
                }
                "label" => {
                    let label = scalar_str(k, v)?;
                    if address.family != 4 {
                        return Err(config_error(format!(
                            "{id}: address labels are IPv4 only"
                        )));
                    }
                    if label.len() > 15 {
                        return Err(config_error(format!(
                            "{id}: address label '{label}' exceeds \
                            15 bytes"
                        )));
                    }
                    address.label = Some(label);
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

    fn handle_nameservers(
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
                "search" => {
                    let items = as_sequence(k, v)?;
                    let mut domains = Vec::new();
                    for item in items {
                        domains.push(scalar_str(k, item)?);
                    }
                    def.search_domains = domains;
                }
                "addresses" => {
                    let items = as_sequence(k, v)?;
                    let mut v4 = Vec::new();
                    let mut v6 = Vec::new();
                    for item in items {
                        let addr = scalar_str(k, item)?;
                        if is_ip4_address(addr.as_str()) {
                            v4.push(addr);
                        } else if is_ip6_address(addr.as_str()) {
                            v6.push(addr);
                        } else {
                            return Err(config_error(format!(
                                "{}: malformed nameserver address \
                                '{addr}'",
                                def.id
                            )));
                        }
                    }
                    def.ip4_nameservers = v4;
                    def.ip6_nameservers = v6;
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

    fn handle_routes(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("routes", value)?;
        let mut routes = Vec::new();
        for item in items {
            let route = self.parse_route(def.id.as_str(), item)?;
            route.validate(def.id.as_str())?;
            routes.push(route);
        }
        def.routes = routes;
        Ok(())
    }

    fn parse_route(
        &mut self,
        id: &str,
        value: &Value,
    ) -> Result<IpRoute, NetplanError> {
        let mapping = as_mapping("routes", value)?;
        let mut route = IpRoute::new();
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "to" => {
                    let to = scalar_str(k, v)?;
                    if to != "default" {
                        let family =
                            addr_family(to.as_str()).ok_or_else(|| {
                                config_error(format!(
                                    "{id}: malformed route destination \
                                    '{to}'"
                                ))
                            })?;
                        set_route_family(&mut route, family, id)?;
                    }
                    route.to = Some(to);
                }
                "via" => {
                    let via = scalar_str(k, v)?;
                    let family =
                        addr_family(via.as_str()).ok_or_else(|| {
                            config_error(format!(
                                "{id}: malformed gateway address '{via}'"
                            ))
                        })?;
                    set_route_family(&mut route, family, id)?;
                    route.via = Some(via);
                }
                "from" => {
                    let from = scalar_str(k, v)?;
                    let family =
                        addr_family(from.as_str()).ok_or_else(|| {
                            config_error(format!(
                                "{id}: malformed route source '{from}'"
                            ))
                        })?;
                    set_route_family(&mut route, family, id)?;
                    route.from = Some(from);
                }
                "metric" => route.metric = Some(scalar_u32(k, v)?),
                "table" => route.table = Some(scalar_u32(k, v)?),
                "mtu" => route.mtu = Some(scalar_u32(k, v)?),
                "congestion-window" => {
                    route.congestion_window = Some(scalar_u32(k, v)?)
                }
                "advertised-receive-window" => {
                    route.advertised_receive_window =
                        Some(scalar_u32(k, v)?)
                }
                "on-link" => route.onlink = Some(scalar_bool(k, v)?),
                "scope" => {
                    let scope = scalar_str(k, v)?;
                    route.scope = Some(
                        RouteScope::parse(scope.as_str()).ok_or_else(
                            || {
                                config_error(format!(
                                    "{id}: invalid route scope '{scope}'"
                                ))
                            },
                        )?,
                    );
                }
                "type" => {
                    let rtype = scalar_str(k, v)?;
                    route.rtype = RouteType::parse(rtype.as_str())
                        .ok_or_else(|| {
                            config_error(format!(
                                "{id}: invalid route type '{rtype}'"
                            ))
                        })?;
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(route)
    }

    fn handle_ip_rules(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("routing-policy", value)?;
        let mut rules = Vec::new();
        for item in items {
            let rule = self.parse_ip_rule(def.id.as_str(), item)?;
            rule.validate(def.id.as_str())?;
            rules.push(rule);
        }
        def.ip_rules = rules;
        Ok(())
    }

    fn parse_ip_rule(
        &mut self,
        id: &str,
        value: &Value,
    ) -> Result<IpRule, NetplanError> {
        let mapping = as_mapping("routing-policy", value)?;
        let mut rule = IpRule::new();
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "from" => {
                    let from = scalar_str(k, v)?;
                    let family =
                        addr_family(from.as_str()).ok_or_else(|| {
                            config_error(format!(
                                "{id}: malformed address '{from}'"
                            ))
                        })?;
                    set_rule_family(&mut rule, family, id)?;
                    rule.from = Some(from);
                }
                "to" => {
                    let to = scalar_str(k, v)?;
                    let family =
                        addr_family(to.as_str()).ok_or_else(|| {
                            config_error(format!(
                                "{id}: malformed address '{to}'"
                            ))
                        })?;
                    set_rule_family(&mut rule, family, id)?;
                    rule.to = Some(to);
                }
                "priority" => rule.priority = Some(scalar_u32(k, v)?),
                "table" => rule.table = Some(scalar_u32(k, v)?),
                "mark" | "fwmark" => {
                    rule.fwmark = Some(scalar_u32(k, v)?)
                }
                "type-of-service" => {
                    rule.tos = Some(super::value::scalar_u8(k, v)?)
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(rule)
    }

    fn handle_dhcp_overrides(
        &mut self,
        overrides: &mut DhcpOverrides,
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
                "use-dns" => overrides.use_dns = scalar_bool(k, v)?,
                "use-ntp" => overrides.use_ntp = scalar_bool(k, v)?,
                "use-hostname" => {
                    overrides.use_hostname = scalar_bool(k, v)?
                }
                "use-mtu" => overrides.use_mtu = scalar_bool(k, v)?,
                "use-routes" => overrides.use_routes = scalar_bool(k, v)?,
                // `use-domains` is tri-valued: bool or the string
                // `route`.
                "use-domains" => {
                    let domains = scalar_str(k, v)?;
                    match domains.as_str() {
                        "true" | "false" | "route" => {
                            overrides.use_domains = Some(domains)
                        }
                        _ => {
                            return Err(config_error(format!(
                                "invalid use-domains value '{domains}'"
                            )));
                        }
                    }
                }
                "send-hostname" => {
                    overrides.send_hostname = scalar_bool(k, v)?
                }
                "hostname" => {
                    overrides.hostname = Some(scalar_str(k, v)?)
                }
                "route-metric" => {
                    overrides.metric = Some(scalar_u32(k, v)?)
                }
                _ => {
                    return Err(config_error(format!(
                        "unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(())
    }

    fn handle_link_local(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("link-local", value)?;
        def.link_local.ipv4 = false;
        def.link_local.ipv6 = false;
        for item in items {
            let family = scalar_str("link-local", item)?;
            match family.as_str() {
                "ipv4" => def.link_local.ipv4 = true,
                "ipv6" => def.link_local.ipv6 = true,
                _ => {
                    return Err(config_error(format!(
                        "{}: invalid link-local value '{family}'",
                        def.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn handle_optional_addresses(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("optional-addresses", value)?;
        let mut flags = 0u32;
        for item in items {
            let name = scalar_str("optional-addresses", item)?;
            let flag = OptionalAddressFlags::NAMES
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .map(|(_, f)| *f)
                .ok_or_else(|| {
                    config_error(format!(
                        "{}: invalid optional-addresses value '{name}'",
                        def.id
                    ))
                })?;
            flags |= flag;
        }
        def.optional_addresses = OptionalAddressFlags(flags);
        Ok(())
    }

    pub(crate) fn handle_wowlan(
        &mut self,
        def: &mut NetDefinition,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let items = as_sequence("wakeonwlan", value)?;
        let mut flags = 0u32;
        for item in items {
            let name = scalar_str("wakeonwlan", item)?;
            let flag = WowlanFlags::NAMES
                .iter()
                .find(|(n, _)| *n == name.as_str())
                .map(|(_, f)| *f)
                .ok_or_else(|| {
                    config_error(format!(
                        "{}: invalid wowlan value '{name}'",
                        def.id
                    ))
                })?;
            flags |= flag;
        }
        def.wowlan = WowlanFlags(flags);
        Ok(())
    }

    fn handle_networkmanager(
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
                "name" => {
                    def.backend_settings.name = Some(scalar_str(k, v)?)
                }
                "uuid" => {
                    def.backend_settings.uuid = Some(scalar_str(k, v)?)
                }
                "stable-id" => {
                    def.backend_settings.stable_id =
                        Some(scalar_str(k, v)?)
                }
                "device" => {
                    def.backend_settings.device = Some(scalar_str(k, v)?)
                }
                "passthrough" => {
                    let passthrough = as_mapping(k, v)?;
                    for (pk, pv) in passthrough {
                        let pk = entry_key(pk)?;
                        let pv = scalar_str(pk, pv)?;
                        if !is_passthrough_key(pk) {
                            warn!(
                                "{}: ignoring passthrough key '{pk}' \
                                not in 'group.key' form",
                                def.id
                            );
                            continue;
                        }
                        def.backend_settings.passthrough.insert(
                            pk.to_string(),
                            serde_json::Value::String(pv),
                        );
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

    /// `auth:` block, shared by wired 802.1x and wifi access points.
    pub(crate) fn parse_auth(
        &mut self,
        id: &str,
        value: &Value,
    ) -> Result<AuthenticationSettings, NetplanError> {
        let mapping = as_mapping("auth", value)?;
        let mut auth = AuthenticationSettings::new();
        for (k, v) in mapping {
            let k = entry_key(k)?;
            match k {
                "key-management" => {
                    let kmt = scalar_str(k, v)?;
                    auth.key_management = Some(
                        KeyManagementType::parse(kmt.as_str())
                            .ok_or_else(|| {
                                config_error(format!(
                                    "{id}: unknown key management type \
                                    '{kmt}'"
                                ))
                            })?,
                    );
                }
                "method" => {
                    let method = scalar_str(k, v)?;
                    auth.eap_method = Some(
                        EapMethod::parse(method.as_str()).ok_or_else(
                            || {
                                config_error(format!(
                                    "{id}: unknown EAP method '{method}'"
                                ))
                            },
                        )?,
                    );
                }
                "identity" => auth.identity = Some(scalar_str(k, v)?),
                "anonymous-identity" => {
                    auth.anonymous_identity = Some(scalar_str(k, v)?)
                }
                "password" => auth.password = Some(scalar_str(k, v)?),
                "ca-certificate" => {
                    auth.ca_certificate = Some(scalar_str(k, v)?)
                }
                "client-certificate" => {
                    auth.client_certificate = Some(scalar_str(k, v)?)
                }
                "client-key" => {
                    auth.client_key = Some(scalar_str(k, v)?)
                }
                "client-key-password" => {
                    auth.client_key_password = Some(scalar_str(k, v)?)
                }
                "phase2-auth" => {
                    auth.phase2_auth = Some(scalar_str(k, v)?)
                }
                "pmf" => {
                    let pmf = scalar_str(k, v)?;
                    auth.pmf_mode = Some(match pmf.as_str() {
                        "disabled" => PmfMode::Disabled,
                        "optional" => PmfMode::Optional,
                        "required" => PmfMode::Required,
                        _ => {
                            return Err(config_error(format!(
                                "{id}: invalid pmf mode '{pmf}'"
                            )));
                        }
                    });
                }
                _ => {
                    return Err(config_error(format!(
                        "{id}: unknown key '{k}'"
                    )));
                }
            }
        }
        Ok(auth)
    }
}

pub(crate) fn set_route_family(
    route: &mut IpRoute,
    family: u8,
    id: &str,
) -> Result<(), NetplanError> {
    if route.family != 0 && route.family != family {
        return Err(config_error(format!(
            "{id}: route IP family mismatch"
        )));
    }
    route.family = family;
    Ok(())
}

pub(crate) fn set_rule_family(
    rule: &mut IpRule,
    family: u8,
    id: &str,
) -> Result<(), NetplanError> {
    if rule.family != 0 && rule.family != family {
        return Err(config_error(format!(
            "{id}: routing-policy IP family mismatch"
        )));
    }
    rule.family = family;
    Ok(())
}

pub(crate) fn extend_path(path: &[String], key: &str) -> Vec<String> {
    let mut ret = path.to_vec();
    ret.push(key.to_string());
    ret
}

// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};
use crate::{RouteScope, RouteType};

#[test]
fn test_route_full() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: 10.10.0.0/16
          via: 192.168.14.20
          metric: 100
          table: 76
          mtu: 1380
          on-link: true
"#,
    );
    let route = &state.get("eth0").unwrap().routes[0];
    assert_eq!(route.to.as_deref(), Some("10.10.0.0/16"));
    assert_eq!(route.via.as_deref(), Some("192.168.14.20"));
    assert_eq!(route.metric, Some(100));
    assert_eq!(route.table, Some(76));
    assert_eq!(route.mtu, Some(1380));
    assert_eq!(route.onlink, Some(true));
    assert_eq!(route.family, 4);
    assert_eq!(route.rtype, RouteType::Unicast);
}

#[test]
fn test_default_route() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: default
          via: 192.168.14.1
"#,
    );
    let route = &state.get("eth0").unwrap().routes[0];
    assert!(route.is_default_route());
    assert_eq!(route.effective_scope(), RouteScope::Global);
}

#[test]
fn test_route_scope_and_type() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: 10.10.10.0/24
          scope: link
        - to: 192.168.1.20/32
          type: local
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.routes[0].scope, Some(RouteScope::Link));
    assert_eq!(def.routes[1].rtype, RouteType::Local);
    assert_eq!(def.routes[1].effective_scope(), RouteScope::Host);
}

#[test]
fn test_global_unicast_needs_via() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: 10.10.0.0/16
          scope: global
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: global unicast route must have both 'to' and 'via' set"
    );
}

#[test]
fn test_host_scope_needs_to() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - via: 10.10.10.1
          scope: host
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: route of scope 'host' is missing the 'to' property"
    );
}

#[test]
fn test_route_family_mismatch() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: 10.10.0.0/16
          via: "2001:db8::1"
"#,
    );
    assert_eq!(e.msg(), "eth0: route IP family mismatch");
}

#[test]
fn test_malformed_gateway() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: 10.10.0.0/16
          via: nonsense
"#,
    );
    assert_eq!(e.msg(), "eth0: malformed gateway address 'nonsense'");
}

#[test]
fn test_routing_policy() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routing-policy:
        - from: 10.0.0.0/8
          table: 100
          priority: 50
          mark: 7
          type-of-service: 16
"#,
    );
    let rule = &state.get("eth0").unwrap().ip_rules[0];
    assert_eq!(rule.from.as_deref(), Some("10.0.0.0/8"));
    assert_eq!(rule.table, Some(100));
    assert_eq!(rule.priority, Some(50));
    assert_eq!(rule.fwmark, Some(7));
    assert_eq!(rule.tos, Some(16));
    assert_eq!(rule.family, 4);
}

#[test]
fn test_routing_policy_needs_from_or_to() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routing-policy:
        - table: 100
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: routing-policy entry needs 'from' or 'to' set"
    );
}

#[test]
fn test_deprecated_gateways() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      gateway4: 192.168.14.1
      gateway6: "2001:db8::1"
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.gateway4.as_deref(), Some("192.168.14.1"));
    assert_eq!(def.gateway6.as_deref(), Some("2001:db8::1"));
}

#[test]
fn test_conflicting_default_gateways_are_tolerated() {
    // Two netdefs declaring the same (family, table, metric) default
    // route produce a warning, never an error.
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      gateway4: 192.168.14.1
    eth1:
      gateway4: 192.168.14.2
"#,
    );
    assert!(state.get("eth0").is_some());
    assert!(state.get("eth1").is_some());
}

#[test]
fn test_default_routes_may_differ_by_metric() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      routes:
        - to: default
          via: 10.0.0.1
          metric: 100
    eth1:
      routes:
        - to: default
          via: 10.0.0.2
          metric: 200
"#,
    );
    assert_eq!(state.get("eth0").unwrap().routes[0].metric, Some(100));
    assert_eq!(state.get("eth1").unwrap().routes[0].metric, Some(200));
}

#[test]
fn test_gateway4_must_be_ipv4() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      gateway4: "2001:db8::1"
"#,
    );
    assert_eq!(e.msg(), "eth0: invalid IPv4 address '2001:db8::1'");
}

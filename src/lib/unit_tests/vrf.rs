// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};

#[test]
fn test_vrf_basic() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  vrfs:
    vrf20:
      table: 20
      interfaces: [eth0]
"#,
    );
    assert_eq!(state.get("vrf20").unwrap().table, Some(20));
    assert_eq!(state.get("eth0").unwrap().vrf_link(), Some("vrf20"));
}

#[test]
fn test_vrf_missing_table() {
    let e = parse_err(
        r#"
network:
  version: 2
  vrfs:
    vrf20: {}
"#,
    );
    assert_eq!(e.msg(), "vrf20: missing 'table' property");
}

#[test]
fn test_vrf_routes_inherit_table() {
    let state = parse_str(
        r#"
network:
  version: 2
  vrfs:
    vrf20:
      table: 20
      routes:
        - to: default
          via: 10.10.10.3
      routing-policy:
        - from: 10.10.10.42
"#,
    );
    let vrf = state.get("vrf20").unwrap();
    assert_eq!(vrf.routes[0].table, Some(20));
    assert_eq!(vrf.ip_rules[0].table, Some(20));
}

#[test]
fn test_vrf_routes_apply_to_members() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  vrfs:
    vrf20:
      table: 20
      interfaces: [eth0]
      routes:
        - to: default
          via: 10.10.10.3
      routing-policy:
        - from: 10.10.10.42
"#,
    );
    // Member interfaces pick up the VRF's routes and rules with its
    // table filled in.
    let eth0 = state.get("eth0").unwrap();
    assert_eq!(eth0.routes.len(), 1);
    assert_eq!(eth0.routes[0].via.as_deref(), Some("10.10.10.3"));
    assert_eq!(eth0.routes[0].table, Some(20));
    assert_eq!(eth0.ip_rules.len(), 1);
    assert_eq!(eth0.ip_rules[0].table, Some(20));
    // The VRF keeps its own copy.
    assert_eq!(state.get("vrf20").unwrap().routes.len(), 1);
}

#[test]
fn test_vrf_route_table_mismatch() {
    let e = parse_err(
        r#"
network:
  version: 2
  vrfs:
    vrf20:
      table: 20
      routes:
        - to: default
          via: 10.10.10.3
          table: 21
"#,
    );
    assert_eq!(
        e.msg(),
        "vrf20: route table 21 does not match VRF table 20"
    );
}

#[test]
fn test_vrf_rule_table_mismatch() {
    let e = parse_err(
        r#"
network:
  version: 2
  vrfs:
    vrf20:
      table: 20
      routing-policy:
        - from: 10.10.10.42
          table: 30
"#,
    );
    assert_eq!(
        e.msg(),
        "vrf20: routing-policy table 30 does not match VRF table 20"
    );
}

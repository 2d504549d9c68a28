// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};
use crate::ErrorKind;

#[test]
fn test_bridge_members() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
    eth1: {}
  bridges:
    br0:
      interfaces: [eth0, eth1]
      dhcp4: true
"#,
    );
    assert_eq!(state.get("eth0").unwrap().bridge_link(), Some("br0"));
    assert_eq!(state.get("eth1").unwrap().bridge_link(), Some("br0"));
    assert!(state.get("br0").unwrap().dhcp4());
}

#[test]
fn test_bridge_forward_declared_members() {
    // The bridge may name its ports before they are defined.
    let state = parse_str(
        r#"
network:
  version: 2
  bridges:
    br0:
      interfaces: [eth0]
  ethernets:
    eth0: {}
"#,
    );
    assert_eq!(state.get("eth0").unwrap().bridge_link(), Some("br0"));
}

#[test]
fn test_bridge_parameters() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  bridges:
    br0:
      interfaces: [eth0]
      parameters:
        ageing-time: 50
        priority: 1000
        forward-delay: 12
        hello-time: 6
        max-age: 24
        stp: false
        path-cost:
          eth0: 70
        port-priority:
          eth0: 14
"#,
    );
    let br = state.get("br0").unwrap();
    assert_eq!(br.bridge_params.ageing_time.as_deref(), Some("50"));
    assert_eq!(br.bridge_params.priority, Some(1000));
    assert_eq!(br.bridge_params.stp, Some(false));
    let port = state.get("eth0").unwrap();
    assert_eq!(port.bridge_path_cost, Some(70));
    assert_eq!(port.bridge_port_priority, Some(14));
}

#[test]
fn test_bridge_port_priority_range() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  bridges:
    br0:
      interfaces: [eth0]
      parameters:
        port-priority:
          eth0: 64
"#,
    );
    assert_eq!(
        e.msg(),
        "br0: invalid port-priority value (must be <= 63): 64"
    );
}

#[test]
fn test_member_cannot_join_two_parents() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  bridges:
    br0:
      interfaces: [eth0]
    br1:
      interfaces: [eth0]
"#,
    );
    assert_eq!(e.kind(), ErrorKind::ConfigValidation);
    assert_eq!(
        e.msg(),
        "interface 'eth0' is already assigned to 'br0' and cannot be \
        a port of bridge 'br1'"
    );
}

#[test]
fn test_missing_member_rejected() {
    let e = parse_err(
        r#"
network:
  version: 2
  bridges:
    br0:
      interfaces: [eth_missing]
"#,
    );
    assert_eq!(e.kind(), ErrorKind::ConfigValidation);
    assert_eq!(e.msg(), "br0: interface 'eth_missing' is not defined");
}

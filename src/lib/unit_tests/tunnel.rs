// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};
use crate::{DeviceType, KeyFlags, TunnelMode};

// 44 chars of base64, good enough for the shape check.
const WG_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

#[test]
fn test_ipip_tunnel() {
    let state = parse_str(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: ipip
      local: 10.10.10.10
      remote: 20.20.20.20
      ttl: 64
"#,
    );
    let def = state.get("tun0").unwrap();
    assert_eq!(def.device_type(), DeviceType::Tunnel);
    assert_eq!(def.tunnel.mode, Some(TunnelMode::Ipip));
    assert_eq!(def.tunnel.local.as_deref(), Some("10.10.10.10"));
    assert_eq!(def.tunnel.remote.as_deref(), Some("20.20.20.20"));
    assert_eq!(def.tunnel.ttl, Some(64));
}

#[test]
fn test_tunnel_missing_mode() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      remote: 20.20.20.20
"#,
    );
    assert_eq!(e.msg(), "tun0: missing 'mode' property for tunnel");
}

#[test]
fn test_tunnel_missing_remote() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: sit
      local: 10.10.10.10
"#,
    );
    assert_eq!(e.msg(), "tun0: missing 'remote' property for tunnel");
}

#[test]
fn test_tunnel_unknown_mode() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: ipsec
"#,
    );
    assert_eq!(e.msg(), "tun0: tunnel mode 'ipsec' is not supported");
}

#[test]
fn test_tunnel_malformed_local() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: gre
      local: not-an-ip
"#,
    );
    assert_eq!(e.msg(), "tun0: malformed local address 'not-an-ip'");
}

#[test]
fn test_tunnel_ttl_range() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: gre
      ttl: 256
"#,
    );
    assert_eq!(e.msg(), "tun0: invalid ttl value '256'");
}

#[test]
fn test_gre_scalar_key_sets_both_directions() {
    let state = parse_str(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: gre
      local: 10.10.10.10
      remote: 20.20.20.20
      key: 1.2.3.4
"#,
    );
    let def = state.get("tun0").unwrap();
    assert_eq!(def.tunnel.input_key.as_deref(), Some("1.2.3.4"));
    assert_eq!(def.tunnel.output_key.as_deref(), Some("1.2.3.4"));
}

#[test]
fn test_tunnel_key_must_be_uint_or_quad() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: gre
      local: 10.10.10.10
      remote: 20.20.20.20
      key: not-a-key
"#,
    );
    assert_eq!(e.msg(), "tun0: invalid tunnel key 'not-a-key'");
}

#[test]
fn test_tunnel_key_accepts_uint() {
    let state = parse_str(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: gre
      local: 10.10.10.10
      remote: 20.20.20.20
      keys:
        input: 1234
        output: 5678
"#,
    );
    let def = state.get("tun0").unwrap();
    assert_eq!(def.tunnel.input_key.as_deref(), Some("1234"));
    assert_eq!(def.tunnel.output_key.as_deref(), Some("5678"));
}

#[test]
fn test_io_keys_rejected_for_ipip() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: ipip
      local: 10.10.10.10
      remote: 20.20.20.20
      keys:
        input: 1234
        output: 5678
"#,
    );
    assert_eq!(
        e.msg(),
        "tun0: 'input-key'/'output-key' is not allowed for this \
        tunnel type"
    );
}

#[test]
fn test_isatap_rejected_on_networkd() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    tun0:
      mode: isatap
      local: 10.10.10.10
      remote: 20.20.20.20
"#,
    );
    assert_eq!(e.msg(), "tun0: ISATAP tunnels are not supported by networkd");
}

#[test]
fn test_gretap_rejected_on_nm() {
    let e = parse_err(
        r#"
network:
  version: 2
  renderer: NetworkManager
  tunnels:
    tun0:
      mode: gretap
      local: 10.10.10.10
      remote: 20.20.20.20
"#,
    );
    assert_eq!(
        e.msg(),
        "tun0: GRETAP tunnels are not supported by NetworkManager"
    );
}

#[test]
fn test_wireguard_full() {
    let state = parse_str(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
      port: 51820
      mark: 42
      peers:
        - keys:
            public: {WG_KEY}
            shared: {WG_KEY}
          endpoint: 1.2.3.4:51821
          keepalive: 23
          allowed-ips: [0.0.0.0/0, "2001:fe:ad:de:ad:be:ef:1/24"]
"#
    ));
    let def = state.get("wg0").unwrap();
    assert_eq!(def.tunnel.mode, Some(TunnelMode::Wireguard));
    assert_eq!(def.tunnel.private_key.as_deref(), Some(WG_KEY));
    assert_eq!(def.tunnel.port, Some(51820));
    assert_eq!(def.tunnel.fwmark, Some(42));
    let peer = &def.wireguard_peers[0];
    assert_eq!(peer.public_key.as_deref(), Some(WG_KEY));
    assert_eq!(peer.preshared_key.as_deref(), Some(WG_KEY));
    assert_eq!(peer.endpoint.as_deref(), Some("1.2.3.4:51821"));
    assert_eq!(peer.keepalive, Some(23));
    assert_eq!(peer.allowed_ips.len(), 2);
}

#[test]
fn test_wireguard_missing_private_key() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      peers:
        - keys:
            public: {WG_KEY}
          allowed-ips: [10.10.0.0/16]
"#
    ));
    assert_eq!(
        e.msg(),
        "wg0: missing 'key' property (private key) for wireguard"
    );
}

#[test]
fn test_wireguard_key_not_required_flag() {
    let state = parse_str(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      keys:
        private-key-flags: [not-required]
      peers:
        - keys:
            public: {WG_KEY}
          allowed-ips: [10.10.0.0/16]
"#
    ));
    let def = state.get("wg0").unwrap();
    assert!(def.tunnel.private_key.is_none());
    assert!(def
        .tunnel
        .private_key_flags
        .contains(KeyFlags::NOT_REQUIRED));
}

#[test]
fn test_wireguard_invalid_private_key() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: not-a-key
      peers:
        - keys:
            public: {WG_KEY}
          allowed-ips: [10.10.0.0/16]
"#
    ));
    assert_eq!(e.msg(), "wg0: invalid wireguard private key");
}

#[test]
fn test_wireguard_key_file_rejected_on_nm() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  renderer: NetworkManager
  tunnels:
    wg0:
      mode: wireguard
      key: /etc/wireguard/wg0.key
      peers:
        - keys:
            public: {WG_KEY}
          allowed-ips: [10.10.0.0/16]
"#
    ));
    assert_eq!(
        e.msg(),
        "wg0: NetworkManager does not support wireguard private key files"
    );
}

#[test]
fn test_wireguard_needs_peers() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
"#
    ));
    assert_eq!(e.msg(), "wg0: at least one wireguard peer is required");
}

#[test]
fn test_wireguard_peer_missing_public_key() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
      peers:
        - allowed-ips: [10.10.0.0/16]
"#
    ));
    assert_eq!(e.msg(), "wg0: a wireguard peer is missing its public key");
}

#[test]
fn test_wireguard_peer_needs_allowed_ips() {
    let e = parse_err(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
      peers:
        - keys:
            public: {WG_KEY}
"#
    ));
    assert_eq!(
        e.msg(),
        "wg0: wireguard peer needs to have at least one address \
        configured in allowed-ips"
    );
}

#[test]
fn test_wireguard_bad_endpoints() {
    for endpoint in [
        "2001:db8::1",
        "[2001:db8::1]51820",
        ":51820",
        "1.2.3.4:0",
    ] {
        let e = parse_err(&format!(
            r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
      peers:
        - keys:
            public: {WG_KEY}
          endpoint: "{endpoint}"
          allowed-ips: [10.10.0.0/16]
"#
        ));
        assert_eq!(
            e.msg(),
            format!(
                "wg0: invalid endpoint address or hostname '{endpoint}'"
            )
        );
    }
}

#[test]
fn test_wireguard_ip6_endpoint() {
    let state = parse_str(&format!(
        r#"
network:
  version: 2
  tunnels:
    wg0:
      mode: wireguard
      key: {WG_KEY}
      peers:
        - keys:
            public: {WG_KEY}
          endpoint: "[2001:db8::1]:51820"
          allowed-ips: [10.10.0.0/16]
"#
    ));
    let peer = &state.get("wg0").unwrap().wireguard_peers[0];
    assert_eq!(peer.endpoint.as_deref(), Some("[2001:db8::1]:51820"));
}

#[test]
fn test_vxlan_basic() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  tunnels:
    vx10:
      mode: vxlan
      id: 10
      link: eth0
      remote: 224.0.0.5
      mac-learning: true
      port-range: [4100, 4000]
"#,
    );
    let def = state.get("vx10").unwrap();
    assert_eq!(def.device_type(), DeviceType::Vxlan);
    assert_eq!(def.vxlan_link(), Some("eth0"));
    let vxlan = def.vxlan.as_ref().unwrap();
    assert_eq!(vxlan.vni, Some(10));
    assert_eq!(vxlan.mac_learning, Some(true));
    // Normalized low before high.
    assert_eq!(vxlan.port_range, Some((4000, 4100)));
    assert_eq!(def.tunnel.remote.as_deref(), Some("224.0.0.5"));
}

#[test]
fn test_vxlan_missing_vni() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
  tunnels:
    vx10:
      mode: vxlan
      link: eth0
"#,
    );
    assert_eq!(e.msg(), "vx10: missing 'id' property (VXLAN VNI)");
}

#[test]
fn test_vxlan_vni_range() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    vx10:
      mode: vxlan
      id: 16777217
"#,
    );
    assert_eq!(
        e.msg(),
        "vx10: VXLAN 'id' (VNI) must be in range 0..16777216"
    );
}

#[test]
fn test_vxlan_flow_label_range() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    vx10:
      mode: vxlan
      id: 10
      flow-label: 1048576
"#,
    );
    assert_eq!(
        e.msg(),
        "vx10: VXLAN 'flow-label' must be in range 0..1048575"
    );
}

#[test]
fn test_vxlan_port_range_needs_two_values() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    vx10:
      mode: vxlan
      id: 10
      port-range: [4000]
"#,
    );
    assert_eq!(e.msg(), "vx10: Expected exactly two values for 'port-range'");
}

#[test]
fn test_vxlan_invalid_flag_value() {
    let e = parse_err(
        r#"
network:
  version: 2
  tunnels:
    vx10:
      mode: vxlan
      id: 10
      notifications: [l4-miss]
"#,
    );
    assert_eq!(
        e.msg(),
        "vx10: invalid value 'l4-miss' for key 'notifications'"
    );
}

#[test]
fn test_vxlan_ttl_routed_after_retype() {
    // Before `mode: vxlan` is seen the ttl lands on the generic tunnel
    // settings, after it on the vxlan block.
    let state = parse_str(
        r#"
network:
  version: 2
  tunnels:
    vx10:
      mode: vxlan
      id: 10
      ttl: 5
"#,
    );
    let def = state.get("vx10").unwrap();
    assert_eq!(def.vxlan.as_ref().unwrap().ttl, Some(5));
    assert!(def.tunnel.ttl.is_none());
}

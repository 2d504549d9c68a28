// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};
use crate::{
    DeviceType, ErrorKind, NetplanBackend, Parser, RaMode, State,
};

#[test]
fn test_ethernet_basic() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
      dhcp6: false
      mtu: 9000
      wakeonlan: true
      macaddress: "00:11:22:33:44:55"
      addresses:
        - 192.168.14.2/24
        - "2001:db8::2/64"
      nameservers:
        search: [lab, home]
        addresses: [8.8.8.8, "2001:4860:4860::8888"]
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.device_type(), DeviceType::Ethernet);
    assert_eq!(def.backend(), NetplanBackend::Networkd);
    assert!(def.dhcp4());
    assert!(!def.dhcp6());
    assert_eq!(def.mtu, Some(9000));
    assert_eq!(def.wake_on_lan, Some(true));
    assert_eq!(def.macaddress(), Some("00:11:22:33:44:55"));
    assert_eq!(def.addresses.len(), 2);
    assert_eq!(def.addresses[0].address, "192.168.14.2/24");
    assert_eq!(def.addresses[0].family, 4);
    assert_eq!(def.addresses[1].family, 6);
    assert_eq!(def.ip4_nameservers, vec!["8.8.8.8".to_string()]);
    assert_eq!(
        def.ip6_nameservers,
        vec!["2001:4860:4860::8888".to_string()]
    );
    assert_eq!(
        def.search_domains,
        vec!["lab".to_string(), "home".to_string()]
    );
}

#[test]
fn test_physical_without_match_matches_own_id() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eno1:
      dhcp4: true
"#,
    );
    let def = state.get("eno1").unwrap();
    assert_eq!(def.match_interface_name(), Some("eno1"));
}

#[test]
fn test_match_block() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    lom:
      match:
        name: "en*"
        macaddress: "00:11:22:33:44:55"
      set-name: lom1
"#,
    );
    let def = state.get("lom").unwrap();
    assert!(def.has_match);
    assert_eq!(def.match_interface_name(), Some("en*"));
    assert_eq!(def.matches.mac.as_deref(), Some("00:11:22:33:44:55"));
    assert_eq!(def.set_name(), Some("lom1"));
}

#[test]
fn test_match_driver_glob_list() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    wans:
      match:
        driver: [e1000e, virtio_net]
"#,
    );
    let def = state.get("wans").unwrap();
    assert_eq!(
        def.matches.driver.as_deref(),
        Some("e1000e\tvirtio_net")
    );
}

#[test]
fn test_match_driver_whitespace_rejected() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    wans:
      match:
        driver: "e1000e virtio"
"#,
    );
    assert_eq!(e.kind(), ErrorKind::InvalidConfig);
    assert_eq!(e.msg(), "wans: A 'driver' glob cannot contain whitespace");
}

#[test]
fn test_unknown_key_rejected() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      dhpc4: true
"#,
    );
    assert_eq!(e.kind(), ErrorKind::InvalidConfig);
    assert_eq!(e.msg(), "eth0: unknown key 'dhpc4'");
    assert_eq!(e.filepath(), Some("10-test.yaml"));
}

#[test]
fn test_unsupported_version() {
    let e = parse_err(
        r#"
network:
  version: 3
  ethernets:
    eth0: {}
"#,
    );
    assert_eq!(e.msg(), "Only version 2 is supported, got 3");
}

#[test]
fn test_unknown_root_key() {
    let e = parse_err("networks:\n  version: 2\n");
    assert_eq!(e.msg(), "unknown key 'networks'");
}

#[test]
fn test_address_options() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses:
        - 10.0.0.15/24:
            lifetime: 0
            label: "maas"
        - 10.0.0.16/24
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.addresses[0].lifetime.as_deref(), Some("0"));
    assert_eq!(def.addresses[0].label.as_deref(), Some("maas"));
    assert!(def.addresses[1].lifetime.is_none());
}

#[test]
fn test_address_invalid_lifetime() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses:
        - 10.0.0.15/24:
            lifetime: 2h
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: invalid lifetime value '2h', must be 'forever' or 0"
    );
}

#[test]
fn test_address_zero_prefix_rejected() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses: [192.168.1.5/0]
"#,
    );
    assert_eq!(
        e.msg(),
        "invalid prefix length in address '192.168.1.5/0'"
    );
}

#[test]
fn test_duplicate_address_dropped() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses: [10.0.0.1/24, 10.0.0.1/24, 10.0.0.2/24]
"#,
    );
    assert_eq!(state.get("eth0").unwrap().addresses.len(), 2);
}

#[test]
fn test_sequences_overwrite_across_documents() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses: [10.0.0.1/24]
"#,
        )
        .unwrap();
    parser
        .load_yaml_str(
            "20-b.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses: [172.16.0.1/16]
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let def = state.get("eth0").unwrap();
    assert_eq!(def.addresses.len(), 1);
    assert_eq!(def.addresses[0].address, "172.16.0.1/16");
    // The origin stays with the first definition.
    assert_eq!(def.filepath(), Some("10-a.yaml"));
}

#[test]
fn test_accept_ra_and_link_local() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      accept-ra: false
      link-local: [ipv4]
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.accept_ra, RaMode::Disabled);
    assert!(def.link_local_ipv4());
    assert!(!def.link_local_ipv6());
}

#[test]
fn test_dhcp_overrides() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
      dhcp4-overrides:
        use-dns: false
        use-domains: route
        route-metric: 200
        hostname: myhost
"#,
    );
    let def = state.get("eth0").unwrap();
    assert!(!def.dhcp4_overrides.use_dns);
    assert_eq!(
        def.dhcp4_overrides.use_domains.as_deref(),
        Some("route")
    );
    assert_eq!(def.dhcp4_overrides.metric, Some(200));
    assert_eq!(def.dhcp4_overrides.hostname.as_deref(), Some("myhost"));
    assert!(def.dhcp6_overrides.is_default());
}

#[test]
fn test_offload_toggles() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      receive-checksum-offload: true
      large-receive-offload: false
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.receive_checksum_offload, Some(true));
    assert_eq!(def.large_receive_offload, Some(false));
    assert_eq!(def.tcp_segmentation_offload, None);
}

#[test]
fn test_networkd_rejects_mac_policy() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      macaddress: random
"#,
    );
    assert_eq!(e.kind(), ErrorKind::ConfigValidation);
    assert_eq!(
        e.msg(),
        "eth0: networkd backend does not support the MAC option 'random'"
    );
}

#[test]
fn test_nm_accepts_mac_policy() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      renderer: NetworkManager
      macaddress: random
"#,
    );
    let def = state.get("eth0").unwrap();
    assert_eq!(def.backend(), NetplanBackend::NetworkManager);
    assert_eq!(def.macaddress(), Some("random"));
}

#[test]
fn test_sriov_vf_and_pf() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    enp1:
      virtual-function-count: 8
      embedded-switch-mode: switchdev
    enp1s16f1:
      link: enp1
"#,
    );
    let pf = state.get("enp1").unwrap();
    assert!(pf.is_sriov_pf());
    assert_eq!(pf.sriov_explicit_vf_count, Some(8));
    assert_eq!(pf.embedded_switch_mode.as_deref(), Some("switchdev"));
    let vf = state.get("enp1s16f1").unwrap();
    assert_eq!(vf.device_type(), DeviceType::SriovVf);
    assert_eq!(vf.sriov_link(), Some("enp1"));
}

#[test]
fn test_embedded_switch_mode_needs_pf() {
    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      embedded-switch-mode: legacy
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: embedded-switch-mode is only valid for SR-IOV PF interfaces"
    );
}

#[test]
fn test_wired_auth() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      auth:
        key-management: 802.1x
        method: ttls
        identity: cert@example.com
        anonymous-identity: "@example.com"
        password: secret
"#,
    );
    let auth = state.get("eth0").unwrap().auth.as_ref().unwrap();
    assert_eq!(
        auth.key_management,
        Some(crate::KeyManagementType::Dot1x)
    );
    assert_eq!(auth.eap_method, Some(crate::EapMethod::Ttls));
    assert_eq!(auth.identity.as_deref(), Some("cert@example.com"));
    assert_eq!(auth.password.as_deref(), Some("secret"));
}

#[test]
fn test_activation_mode_values() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      activation-mode: manual
"#,
    );
    assert_eq!(
        state.get("eth0").unwrap().activation_mode.as_deref(),
        Some("manual")
    );

    let e = parse_err(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      activation-mode: sometimes
"#,
    );
    assert_eq!(
        e.msg(),
        "eth0: Value of 'activation-mode' needs to be 'manual' or 'off'"
    );
}

#[test]
fn test_passthrough_keys_need_group_key_form() {
    let state = parse_str(
        r#"
network:
  version: 2
  renderer: NetworkManager
  ethernets:
    eth0:
      networkmanager:
        uuid: 87749f1d-334f-40b2-98d4-55db58965f5f
        passthrough:
          connection.permissions: user:joe
          bogus: dropped
"#,
    );
    let passthrough =
        &state.get("eth0").unwrap().backend_settings.passthrough;
    assert_eq!(
        passthrough.get("connection.permissions"),
        Some(&serde_json::Value::String("user:joe".to_string()))
    );
    // A key without a group prefix cannot address a keyfile location.
    assert!(passthrough.get("bogus").is_none());
    assert_eq!(passthrough.len(), 1);
}

#[test]
fn test_empty_document_is_fine() {
    let mut parser = Parser::new();
    parser.load_yaml_str("10-empty.yaml", "").unwrap();
    parser.load_yaml_str("20-null.yaml", "network:\n").unwrap();
    assert!(parser.is_empty());
}

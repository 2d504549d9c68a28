// SPDX-License-Identifier: Apache-2.0

use std::os::unix::fs::PermissionsExt;

use super::testlib::{dump, parse_keyfile, parse_str, scratch_dir};
use crate::{Parser, State};

#[test]
fn test_dump_simple_ethernet() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
"#,
    );
    assert_eq!(
        dump(&state),
        "network:\n\
        \x20 version: 2\n\
        \x20 ethernets:\n\
        \x20   eth0:\n\
        \x20     match:\n\
        \x20       name: eth0\n\
        \x20     dhcp4: true\n"
    );
}

#[test]
fn test_dump_global_renderer() {
    let state = parse_str(
        r#"
network:
  version: 2
  renderer: NetworkManager
  ethernets:
    eth0:
      dhcp4: true
"#,
    );
    assert_eq!(
        dump(&state),
        "network:\n\
        \x20 version: 2\n\
        \x20 renderer: NetworkManager\n\
        \x20 ethernets:\n\
        \x20   eth0:\n\
        \x20     match:\n\
        \x20       name: eth0\n\
        \x20     renderer: NetworkManager\n\
        \x20     dhcp4: true\n"
    );
}

#[test]
fn test_dump_is_deterministic() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
    eth1:
      addresses: [10.0.0.2/24]
  bridges:
    br0:
      interfaces: [eth0, eth1]
      parameters:
        stp: false
        path-cost:
          eth0: 70
"#,
    );
    assert_eq!(dump(&state), dump(&state));
}

#[test]
fn test_dump_parse_dump_round_trip() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      addresses: [10.0.0.2/24, "2001:db8::2/64"]
      nameservers:
        search: [lab, home]
        addresses: [8.8.8.8]
      routes:
        - to: default
          via: 10.0.0.1
  bridges:
    br0:
      interfaces: [eth0]
      parameters:
        stp: false
        path-cost:
          eth0: 70
  vlans:
    br0.100:
      id: 100
      link: br0
"#,
    );
    let first = dump(&state);
    let mut parser = Parser::new();
    parser.load_yaml_str("10-test.yaml", first.as_str()).unwrap();
    let mut reparsed = State::new();
    reparsed.import_parser_results(&mut parser).unwrap();
    assert_eq!(dump(&reparsed), first);
}

#[test]
fn test_default_output_filename() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
"#,
    );
    assert_eq!(
        state.get("eth0").unwrap().default_output_filename(),
        "/etc/netplan/10-netplan-eth0.yaml"
    );
}

#[test]
fn test_keyfile_output_filename_keyed_by_uuid() {
    let state = parse_keyfile(
        "netplan-eth0.nmconnection",
        r#"[connection]
uuid=626dd384-8b3d-3690-9511-192b2c79b3fd
type=ethernet
"#,
    );
    assert_eq!(
        state.get("eth0").unwrap().default_output_filename(),
        "/etc/netplan/90-NM-626dd384-8b3d-3690-9511-192b2c79b3fd.yaml"
    );
}

#[test]
fn test_backend_output_filename_networkd() {
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0: {}
"#,
    );
    assert_eq!(
        state.get("eth0").unwrap().backend_output_filename(),
        Some("/run/systemd/network/10-netplan-eth0.network".to_string())
    );
}

#[test]
fn test_backend_output_filename_nm_escapes_ssid() {
    let state = parse_str(
        r#"
network:
  version: 2
  renderer: NetworkManager
  wifis:
    wl0:
      access-points:
        "Joe's Home": {}
"#,
    );
    assert_eq!(
        state.get("wl0").unwrap().backend_output_filename(),
        Some(
            "/run/NetworkManager/system-connections/\
            netplan-wl0-Joe%27s%20Home.nmconnection"
                .to_string()
        )
    );
}

#[test]
fn test_write_yaml_file_filters_by_origin() {
    let rootdir = scratch_dir("write-filter");
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth0: {}\n",
        )
        .unwrap();
    parser
        .load_yaml_str(
            "20-b.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth1: {}\n",
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    state.write_yaml_file("10-a", &rootdir).unwrap();

    let path = rootdir.join("etc/netplan/10-a.yaml");
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("eth0:"));
    assert!(!written.contains("eth1:"));
    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    std::fs::remove_dir_all(&rootdir).unwrap();
}

#[test]
fn test_write_netdef_yaml() {
    let rootdir = scratch_dir("write-netdef");
    let state = parse_str(
        r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
"#,
    );
    state.get("eth0").unwrap().write_yaml(&rootdir).unwrap();
    let written = std::fs::read_to_string(
        rootdir.join("etc/netplan/10-netplan-eth0.yaml"),
    )
    .unwrap();
    assert!(written.contains("dhcp4: true"));
    std::fs::remove_dir_all(&rootdir).unwrap();
}

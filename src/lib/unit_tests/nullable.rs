// SPDX-License-Identifier: Apache-2.0

use std::io::Cursor;

use crate::{NetplanBackend, Parser, State};

#[test]
fn test_null_netdef_is_deleted() {
    let mut parser = Parser::new();
    parser
        .load_nullable_fields(Cursor::new(
            "network:\n  ethernets:\n    eth0:\n",
        ))
        .unwrap();
    parser
        .load_yaml_str(
            "10-test.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
    eth1:
      dhcp4: true
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    assert!(state.get("eth0").is_none());
    assert!(state.get("eth1").is_some());
}

#[test]
fn test_null_single_key_is_skipped() {
    let mut parser = Parser::new();
    parser
        .load_nullable_fields(Cursor::new(
            "network:\n  ethernets:\n    eth0:\n      dhcp4:\n",
        ))
        .unwrap();
    parser
        .load_yaml_str(
            "10-test.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
      addresses: [1.2.3.4/24]
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let def = state.get("eth0").unwrap();
    assert!(!def.dhcp4());
    assert_eq!(def.addresses.len(), 1);
}

#[test]
fn test_empty_nullable_document() {
    let mut parser = Parser::new();
    parser.load_nullable_fields(Cursor::new("")).unwrap();
    parser
        .load_nullable_overrides(Cursor::new(""), "10-test.yaml")
        .unwrap();
}

#[test]
fn test_override_pins_netdef_to_basename() {
    let mut parser = Parser::new();
    parser
        .load_nullable_overrides(
            Cursor::new("network:\n  ethernets:\n    eth0: {}\n"),
            "10-a.yaml",
        )
        .unwrap();
    // A definition from any other file is ignored.
    parser
        .load_yaml_str(
            "20-b.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      dhcp4: true
"#,
        )
        .unwrap();
    // The owning basename wins, regardless of directory.
    parser
        .load_yaml_str(
            "/etc/netplan/10-a.yaml",
            r#"
network:
  version: 2
  ethernets:
    eth0:
      mtu: 9000
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let def = state.get("eth0").unwrap();
    assert!(!def.dhcp4());
    assert_eq!(def.mtu, Some(9000));
}

#[test]
fn test_override_pins_global_renderer() {
    let mut parser = Parser::new();
    parser
        .load_nullable_overrides(
            Cursor::new("network:\n  renderer: NetworkManager\n"),
            "90-nm.yaml",
        )
        .unwrap();
    parser
        .load_yaml_str(
            "10-a.yaml",
            r#"
network:
  version: 2
  renderer: NetworkManager
  ethernets:
    eth0: {}
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    // The renderer of 10-a.yaml is not authoritative, the default
    // backend applies.
    assert_eq!(
        state.get("eth0").unwrap().backend(),
        NetplanBackend::Networkd
    );
}

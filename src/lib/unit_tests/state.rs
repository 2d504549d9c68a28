// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_str, scratch_dir};
use crate::{NetplanBackend, Parser, State};

#[test]
fn test_import_resets_the_parser() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-test.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth0: {}\n",
        )
        .unwrap();
    assert!(!parser.is_empty());
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    assert!(parser.is_empty());
    assert_eq!(state.len(), 1);
}

#[test]
fn test_default_backend_is_networkd() {
    let state = parse_str(
        "network:\n  version: 2\n  ethernets:\n    eth0: {}\n",
    );
    assert_eq!(state.backend(), NetplanBackend::Networkd);
    assert_eq!(
        state.get("eth0").unwrap().backend(),
        NetplanBackend::Networkd
    );
}

#[test]
fn test_global_renderer_applies_to_netdefs() {
    let state = parse_str(
        "network:\n  version: 2\n  renderer: NetworkManager\n  \
        ethernets:\n    eth0: {}\n",
    );
    assert_eq!(state.backend(), NetplanBackend::NetworkManager);
    assert_eq!(
        state.get("eth0").unwrap().backend(),
        NetplanBackend::NetworkManager
    );
}

#[test]
fn test_netdef_renderer_overrides_global() {
    let state = parse_str(
        r#"
network:
  version: 2
  renderer: NetworkManager
  ethernets:
    eth0:
      renderer: networkd
"#,
    );
    assert_eq!(state.backend(), NetplanBackend::NetworkManager);
    assert_eq!(
        state.get("eth0").unwrap().backend(),
        NetplanBackend::Networkd
    );
}

#[test]
fn test_iteration_keeps_first_definition_order() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            "network:\n  version: 2\n  ethernets:\n    zz0: {}\n    \
            aa0: {}\n",
        )
        .unwrap();
    parser
        .load_yaml_str(
            "20-b.yaml",
            "network:\n  version: 2\n  ethernets:\n    mm0: {}\n    \
            aa0:\n      mtu: 9000\n",
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let ids: Vec<&str> = state.iter().map(|def| def.id()).collect();
    assert_eq!(ids, vec!["zz0", "aa0", "mm0"]);
}

#[test]
fn test_later_files_merge_into_existing_netdefs() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth0:\n      \
            dhcp4: true\n",
        )
        .unwrap();
    parser
        .load_yaml_str(
            "20-b.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth0:\n      \
            mtu: 9000\n",
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let def = state.get("eth0").unwrap();
    assert!(def.dhcp4());
    assert_eq!(def.mtu, Some(9000));
    // The original file stays the origin.
    assert_eq!(def.filepath(), Some("10-a.yaml"));
}

#[test]
fn test_sources_are_tracked() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            "network:\n  version: 2\n  ethernets:\n    eth0: {}\n",
        )
        .unwrap();
    parser
        .load_yaml_str("20-b.yaml", "network:\n  version: 2\n")
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let sources: Vec<&str> = state.sources().collect();
    assert_eq!(sources, vec!["10-a.yaml", "20-b.yaml"]);
}

#[test]
fn test_hierarchy_shadowing() {
    let rootdir = scratch_dir("hierarchy");
    for (dir, content) in [
        (
            "usr/lib/netplan",
            "network:\n  version: 2\n  ethernets:\n    vendor0: {}\n",
        ),
        (
            "etc/netplan",
            "network:\n  version: 2\n  ethernets:\n    admin0: {}\n",
        ),
    ] {
        let dir = rootdir.join(dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("10-config.yaml"), content).unwrap();
    }
    // A second vendor file with a unique basename survives.
    std::fs::write(
        rootdir.join("usr/lib/netplan/20-extra.yaml"),
        "network:\n  version: 2\n  ethernets:\n    extra0: {}\n",
    )
    .unwrap();

    let mut parser = Parser::new();
    parser.load_yaml_hierarchy(&rootdir).unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    // etc/ shadows the same basename in usr/lib/.
    assert!(state.get("vendor0").is_none());
    assert!(state.get("admin0").is_some());
    assert!(state.get("extra0").is_some());
    std::fs::remove_dir_all(&rootdir).unwrap();
}

#[test]
fn test_state_reset() {
    let mut state = parse_str(
        "network:\n  version: 2\n  ethernets:\n    eth0: {}\n",
    );
    state.reset();
    assert!(state.is_empty());
    assert!(state.get("eth0").is_none());
}

// SPDX-License-Identifier: Apache-2.0

use super::testlib::{parse_err, parse_str};
use crate::{Parser, State, WifiBand, WifiMode, WowlanFlags};

#[test]
fn test_access_point_basic() {
    let state = parse_str(
        r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        "Joe's Home":
          password: "s0s3kr1t"
          bssid: 00:11:22:33:44:55
          band: 2.4GHz
          channel: 11
      dhcp4: true
"#,
    );
    let def = state.get("wl0").unwrap();
    let ap = &def.access_points[0];
    assert_eq!(ap.ssid, "Joe's Home");
    assert_eq!(ap.mode, WifiMode::Infrastructure);
    assert_eq!(ap.bssid.as_deref(), Some("00:11:22:33:44:55"));
    assert_eq!(ap.band, Some(WifiBand::Band24G));
    assert_eq!(ap.channel, Some(11));
    assert!(!ap.hidden);
    // `password:` is a shortcut for a WPA-PSK passphrase.
    let auth = ap.auth.as_ref().unwrap();
    assert_eq!(auth.password.as_deref(), Some("s0s3kr1t"));
}

#[test]
fn test_access_point_ap_mode() {
    let state = parse_str(
        r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        homenet:
          mode: ap
          band: 5G
          hidden: true
"#,
    );
    let ap = &state.get("wl0").unwrap().access_points[0];
    assert_eq!(ap.mode, WifiMode::Ap);
    assert_eq!(ap.band, Some(WifiBand::Band5G));
    assert!(ap.hidden);
}

#[test]
fn test_access_point_empty_body() {
    let state = parse_str(
        r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        opennet: {}
        othernet:
"#,
    );
    let def = state.get("wl0").unwrap();
    assert_eq!(def.access_points.len(), 2);
    assert!(def.access_points[0].auth.is_none());
}

#[test]
fn test_unknown_wifi_mode() {
    let e = parse_err(
        r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        homenet:
          mode: mesh
"#,
    );
    assert_eq!(e.msg(), "wl0: unknown wifi mode 'mesh'");
}

#[test]
fn test_unknown_wifi_band() {
    let e = parse_err(
        r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        homenet:
          band: 60GHz
"#,
    );
    assert_eq!(e.msg(), "wl0: unknown wifi band '60GHz'");
}

#[test]
fn test_later_ssid_definition_wins() {
    let mut parser = Parser::new();
    parser
        .load_yaml_str(
            "10-a.yaml",
            r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        homenet:
          channel: 1
"#,
        )
        .unwrap();
    parser
        .load_yaml_str(
            "20-b.yaml",
            r#"
network:
  version: 2
  wifis:
    wl0:
      access-points:
        homenet:
          channel: 13
"#,
        )
        .unwrap();
    let mut state = State::new();
    state.import_parser_results(&mut parser).unwrap();
    let def = state.get("wl0").unwrap();
    assert_eq!(def.access_points.len(), 1);
    assert_eq!(def.access_points[0].channel, Some(13));
}

#[test]
fn test_ap_networkmanager_passthrough() {
    let state = parse_str(
        r#"
network:
  version: 2
  renderer: NetworkManager
  wifis:
    wl0:
      access-points:
        homenet:
          networkmanager:
            name: myid with spaces
            uuid: 87749f1d-334f-40b2-98d4-55db58965f5f
            passthrough:
              wifi-security.leap-username: joe
              groupless: dropped
"#,
    );
    let ap = &state.get("wl0").unwrap().access_points[0];
    // Identity keys belong to the netdef level block, only passthrough
    // data sticks to the SSID.
    assert_eq!(
        ap.passthrough.get("wifi-security.leap-username"),
        Some(&serde_json::Value::String("joe".to_string()))
    );
    // Keys not in 'group.key' form are dropped with a warning.
    assert!(ap.passthrough.get("groupless").is_none());
}

#[test]
fn test_wakeonwlan_flags() {
    let state = parse_str(
        r#"
network:
  version: 2
  wifis:
    wl0:
      wakeonwlan: [magic_pkt, disconnect]
      access-points:
        homenet: {}
"#,
    );
    let def = state.get("wl0").unwrap();
    assert!(def.wowlan.contains(WowlanFlags::MAGIC));
    assert!(def.wowlan.contains(WowlanFlags::DISCONNECT));
    assert!(!def.wowlan.contains(WowlanFlags::TCP));
}

#[test]
fn test_invalid_wakeonwlan_value() {
    let e = parse_err(
        r#"
network:
  version: 2
  wifis:
    wl0:
      wakeonwlan: [magic]
"#,
    );
    assert_eq!(e.msg(), "wl0: invalid wowlan value 'magic'");
}

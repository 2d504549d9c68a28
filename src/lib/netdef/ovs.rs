// SPDX-License-Identifier: Apache-2.0

// Open vSwitch layering. The same settings block serves both as the
// per-netdef `openvswitch:` mapping and (with `ports:` and `ssl:`) as
// the global `network.openvswitch:` section.

use serde_json::Map;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct OvsController {
    pub addresses: Vec<String>,
    pub connection_mode: Option<String>,
}

impl OvsController {
    pub(crate) fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.connection_mode.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct OvsSsl {
    pub ca_cert: Option<String>,
    pub certificate: Option<String>,
    pub private_key: Option<String>,
}

impl OvsSsl {
    pub(crate) fn is_empty(&self) -> bool {
        self.ca_cert.is_none()
            && self.certificate.is_none()
            && self.private_key.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct OvsSettings {
    /// Insertion ordered so re-emission is stable.
    pub external_ids: Map<String, serde_json::Value>,
    pub other_config: Map<String, serde_json::Value>,
    /// Bonds only: `active`, `passive` or `off`.
    pub lacp: Option<String>,
    /// Bridges only: `standalone` or `secure`.
    pub fail_mode: Option<String>,
    pub mcast_snooping: Option<bool>,
    pub rstp: Option<bool>,
    pub protocols: Vec<String>,
    pub controller: OvsController,
    /// Global section only.
    pub ssl: OvsSsl,
}

impl OvsSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

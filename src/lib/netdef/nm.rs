// SPDX-License-Identifier: Apache-2.0

use serde_json::Map;

/// NetworkManager specific settings of a netdef, including the verbatim
/// `"group.key"` passthrough map that round-trips keyfile entries the
/// schema does not model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct NetworkManagerSettings {
    /// `connection.id` of the keyfile.
    pub name: Option<String>,
    pub uuid: Option<String>,
    pub stable_id: Option<String>,
    /// `connection.interface-name`.
    pub device: Option<String>,
    /// Insertion ordered so entries re-emit in the order they were read.
    pub passthrough: Map<String, serde_json::Value>,
}

impl NetworkManagerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.uuid.is_none()
            && self.stable_id.is_none()
            && self.device.is_none()
            && self.passthrough.is_empty()
    }
}

// SPDX-License-Identifier: Apache-2.0

/// `parameters:` block of a bridge netdef. The per-port `path-cost` and
/// `port-priority` sub-mappings are stored on the member netdefs
/// themselves, see `NetDefinition::bridge_path_cost`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct BridgeParameters {
    pub ageing_time: Option<String>,
    pub priority: Option<u32>,
    pub forward_delay: Option<String>,
    pub hello_time: Option<String>,
    pub max_age: Option<String>,
    pub stp: Option<bool>,
}

impl BridgeParameters {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

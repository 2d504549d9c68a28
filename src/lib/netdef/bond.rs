// SPDX-License-Identifier: Apache-2.0

use crate::{ErrorKind, NetplanError};

pub(crate) const BOND_MODES: [&str; 7] = [
    "balance-rr",
    "active-backup",
    "balance-xor",
    "broadcast",
    "802.3ad",
    "balance-tlb",
    "balance-alb",
];

/// `parameters:` block of a bond netdef. Interval style values keep the
/// original scalar (plain milliseconds or a time suffix) since both
/// backends accept either form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct BondParameters {
    pub mode: Option<String>,
    pub lacp_rate: Option<String>,
    pub monitor_interval: Option<String>,
    pub min_links: Option<u32>,
    pub transmit_hash_policy: Option<String>,
    /// `ad-select`
    pub selection_logic: Option<String>,
    pub all_members_active: Option<bool>,
    pub arp_interval: Option<String>,
    pub arp_ip_targets: Vec<String>,
    pub arp_validate: Option<String>,
    pub arp_all_targets: Option<String>,
    pub up_delay: Option<String>,
    pub down_delay: Option<String>,
    pub fail_over_mac_policy: Option<String>,
    pub gratuitous_arp: Option<u32>,
    pub packets_per_member: Option<u32>,
    pub primary_reselect_policy: Option<String>,
    pub resend_igmp: Option<u32>,
    pub learn_interval: Option<String>,
    /// Primary member, resolved against the bond's port list.
    pub primary_member: Option<String>,
}

impl BondParameters {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub(crate) fn set_mode(
        &mut self,
        mode: &str,
        netdef_id: &str,
    ) -> Result<(), NetplanError> {
        if !BOND_MODES.contains(&mode) {
            return Err(NetplanError::new(
                ErrorKind::InvalidConfig,
                format!("{netdef_id}: unknown bond mode '{mode}'"),
            ));
        }
        self.mode = Some(mode.to_string());
        Ok(())
    }
}

// SPDX-License-Identifier: Apache-2.0

/// `dhcp4-overrides:` / `dhcp6-overrides:` block. All of these default
/// to "use what the lease offers".
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct DhcpOverrides {
    pub use_dns: bool,
    pub use_domains: Option<String>,
    pub use_ntp: bool,
    pub use_hostname: bool,
    pub use_mtu: bool,
    pub use_routes: bool,
    pub send_hostname: bool,
    pub hostname: Option<String>,
    pub metric: Option<u32>,
}

impl Default for DhcpOverrides {
    fn default() -> Self {
        Self {
            use_dns: true,
            use_domains: None,
            use_ntp: true,
            use_hostname: true,
            use_mtu: true,
            use_routes: true,
            send_hostname: true,
            hostname: None,
            metric: None,
        }
    }
}

impl DhcpOverrides {
    pub(crate) fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

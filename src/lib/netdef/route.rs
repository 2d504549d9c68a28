// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::validators::is_ip4_address;
use crate::{ErrorKind, NetplanError};

/// Kernel main routing table.
pub const ROUTE_TABLE_MAIN: u32 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum RouteType {
    Unicast,
    Anycast,
    Blackhole,
    Broadcast,
    Local,
    Multicast,
    Nat,
    Prohibit,
    Throw,
    Unreachable,
    Xresolve,
}

impl Default for RouteType {
    fn default() -> Self {
        Self::Unicast
    }
}

impl RouteType {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        serde_yaml::from_str(s).ok()
    }
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", s.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteScope {
    Global,
    Link,
    Host,
}

impl Default for RouteScope {
    fn default() -> Self {
        Self::Global
    }
}

impl RouteScope {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "global" => Some(Self::Global),
            "link" => Some(Self::Link),
            "host" => Some(Self::Host),
            _ => None,
        }
    }
}

impl std::fmt::Display for RouteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Global => "global",
                Self::Link => "link",
                Self::Host => "host",
            }
        )
    }
}

/// One entry of a netdef's `routes:` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct IpRoute {
    /// 4 or 6, inferred from `to`/`via`/`from`; 0 while undecided.
    pub family: u8,
    pub rtype: RouteType,
    /// `None` means "derive per the scope defaulting rules".
    pub scope: Option<RouteScope>,
    pub table: Option<u32>,
    pub metric: Option<u32>,
    /// Destination, `default` is accepted as an alias of `0.0.0.0/0` /
    /// `::/0`.
    pub to: Option<String>,
    pub via: Option<String>,
    pub from: Option<String>,
    pub mtu: Option<u32>,
    pub congestion_window: Option<u32>,
    pub advertised_receive_window: Option<u32>,
    pub onlink: Option<bool>,
}

impl IpRoute {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_default_route(&self) -> bool {
        matches!(
            self.to.as_deref(),
            Some("default") | Some("0.0.0.0/0") | Some("::/0")
        )
    }

    /// Effective scope with the kernel defaulting rules applied:
    /// `local`/`nat` → host; gateway-less `unicast` and
    /// `broadcast`/`multicast`/`anycast` → link; otherwise global.
    pub fn effective_scope(&self) -> RouteScope {
        if let Some(scope) = self.scope {
            return scope;
        }
        match self.rtype {
            RouteType::Local | RouteType::Nat => RouteScope::Host,
            RouteType::Unicast if self.via.is_none() => RouteScope::Link,
            RouteType::Broadcast
            | RouteType::Multicast
            | RouteType::Anycast => RouteScope::Link,
            _ => RouteScope::Global,
        }
    }

    pub(crate) fn validate(
        &self,
        netdef_id: &str,
    ) -> Result<(), NetplanError> {
        let scope = self.effective_scope();
        if self.to.is_none()
            && matches!(scope, RouteScope::Link | RouteScope::Host)
        {
            return Err(NetplanError::new(
                ErrorKind::ConfigValidation,
                format!(
                    "{netdef_id}: route of scope '{scope}' is missing \
                    the 'to' property"
                ),
            ));
        }
        if scope == RouteScope::Global
            && self.rtype == RouteType::Unicast
            && (self.to.is_none() || self.via.is_none())
        {
            return Err(NetplanError::new(
                ErrorKind::ConfigValidation,
                format!(
                    "{netdef_id}: global unicast route must have both \
                    'to' and 'via' set"
                ),
            ));
        }
        if let (Some(via), 4) = (self.via.as_deref(), self.family) {
            if self.rtype == RouteType::Unicast
                && scope == RouteScope::Global
                && !is_ip4_address(via)
            {
                return Err(NetplanError::new(
                    ErrorKind::ConfigValidation,
                    format!("{netdef_id}: invalid gateway address '{via}'"),
                ));
            }
        }
        Ok(())
    }
}

/// One entry of a netdef's `routing-policy:` sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct IpRule {
    /// 4 or 6, inferred from `from`/`to`; 0 while undecided.
    pub family: u8,
    pub priority: Option<u32>,
    pub table: Option<u32>,
    pub fwmark: Option<u32>,
    pub tos: Option<u8>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl IpRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn validate(
        &self,
        netdef_id: &str,
    ) -> Result<(), NetplanError> {
        if self.from.is_none() && self.to.is_none() {
            return Err(NetplanError::new(
                ErrorKind::ConfigValidation,
                format!(
                    "{netdef_id}: routing-policy entry needs 'from' or \
                    'to' set"
                ),
            ));
        }
        Ok(())
    }
}

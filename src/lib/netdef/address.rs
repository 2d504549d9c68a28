// SPDX-License-Identifier: Apache-2.0

use crate::{
    validators::{is_ip4_address, is_ip6_address},
    ErrorKind, NetplanError,
};

/// A static CIDR address assigned to an interface, optionally carrying
/// per-address options (`lifetime`, `label`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct Address {
    /// `addr/prefixlen` exactly as written in YAML.
    pub address: String,
    /// 4 or 6, inferred from the syntactic shape.
    pub family: u8,
    pub lifetime: Option<String>,
    pub label: Option<String>,
}

impl Address {
    /// Parse `A.B.C.D/NN` or `H:…:H/NN`. Prefix 0 is forbidden for
    /// static interface addresses (but allowed for wireguard
    /// `allowed-ips`, see [Address::from_cidr_permissive]).
    pub(crate) fn from_cidr(s: &str) -> Result<Self, NetplanError> {
        let ret = Self::from_cidr_permissive(s)?;
        let prefix_len: u8 = s
            .split_once('/')
            .and_then(|(_, p)| p.parse().ok())
            .unwrap_or(0);
        if prefix_len == 0 {
            return Err(NetplanError::new(
                ErrorKind::InvalidConfig,
                format!("invalid prefix length in address '{s}'"),
            ));
        }
        Ok(ret)
    }

    /// Same as [Address::from_cidr] but accepting prefix length 0.
    pub(crate) fn from_cidr_permissive(s: &str) -> Result<Self, NetplanError> {
        let err = |msg: &str| {
            NetplanError::new(ErrorKind::InvalidConfig, format!("{msg} '{s}'"))
        };
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| err("address is missing /prefixlength:"))?;
        let prefix_len: u8 = prefix
            .parse()
            .map_err(|_| err("invalid prefix length in address"))?;
        let family = if is_ip4_address(addr) {
            if prefix_len > 32 {
                return Err(err("invalid prefix length in address"));
            }
            4
        } else if is_ip6_address(addr) {
            if prefix_len > 128 {
                return Err(err("invalid prefix length in address"));
            }
            6
        } else {
            return Err(err("malformed address, must be X.X.X.X/NN or X:X:X:X:X:X:X:X/NN:"));
        };
        Ok(Self {
            address: s.to_string(),
            family,
            lifetime: None,
            label: None,
        })
    }

    pub(crate) fn has_options(&self) -> bool {
        self.lifetime.is_some() || self.label.is_some()
    }
}

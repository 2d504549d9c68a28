// SPDX-License-Identifier: Apache-2.0

// Pure string predicates shared by the YAML and keyfile parsers.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::{ErrorKind, NetplanError};

pub fn is_ip4_address(s: &str) -> bool {
    Ipv4Addr::from_str(s).is_ok()
}

pub fn is_ip6_address(s: &str) -> bool {
    Ipv6Addr::from_str(s).is_ok()
}

/// Colon separated hex MAC, either the 6 byte Ethernet form or the
/// 20 byte InfiniBand form.
pub fn is_mac_address(s: &str) -> bool {
    let octets: Vec<&str> = s.split(':').collect();
    if octets.len() != 6 && octets.len() != 20 {
        return false;
    }
    octets
        .iter()
        .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
}

/// RFC 1123 hostname: dot separated labels of `[a-z0-9]([a-z0-9-]*
/// [a-z0-9])?`, case insensitive, 63 bytes per label, 253 bytes total.
pub fn is_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }
    let s = s.strip_suffix('.').unwrap_or(s);
    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

/// A wireguard private, public or preshared key: 32 bytes of base64,
/// which is exactly 44 characters ending in `=`.
pub fn is_wireguard_key(s: &str) -> bool {
    s.len() == 44
        && s.ends_with('=')
        && s[..43].chars().all(|c| {
            c.is_ascii_alphanumeric() || c == '+' || c == '/'
        })
}

fn is_ovs_host(host: &str) -> bool {
    // Bracketed IPv6 may carry a zone suffix.
    if let Some(inner) = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
    {
        let addr = inner.split('%').next().unwrap_or(inner);
        return is_ip6_address(addr);
    }
    is_ip4_address(host) || is_ip6_address(host)
}

pub(crate) fn is_valid_port(s: &str) -> bool {
    matches!(u16::from_str(s), Ok(p) if p > 0)
}

/// Validate an Open vSwitch controller or manager target of the form
/// `proto:host[:port]` (active) or `proto:[port][:host]` (passive).
/// `unix:`/`punix:` targets carry a socket path instead of a host.
pub fn validate_ovs_target(
    host_first: bool,
    target: &str,
) -> Result<(), NetplanError> {
    let err = || {
        NetplanError::new(
            ErrorKind::ConfigValidation,
            format!("invalid OVS target '{target}'"),
        )
    };
    let (proto, rest) = target.split_once(':').ok_or_else(err)?;
    match proto {
        "unix" | "punix" => {
            if rest.is_empty() {
                return Err(err());
            }
            return Ok(());
        }
        "tcp" | "ssl" | "ptcp" | "pssl" => (),
        _ => return Err(err()),
    }
    if rest.is_empty() {
        return Err(err());
    }
    let (host, port) = if host_first {
        // proto:host[:port], port defaults to 6653
        if rest.starts_with('[') {
            let close = rest.find(']').ok_or_else(err)?;
            let host = &rest[..=close];
            match rest[close + 1..].strip_prefix(':') {
                Some(port) => (Some(host), Some(port)),
                None if rest[close + 1..].is_empty() => (Some(host), None),
                None => return Err(err()),
            }
        } else if is_ip6_address(rest) {
            // Unbracketed IPv6 can only be the whole target.
            (Some(rest), None)
        } else {
            match rest.rsplit_once(':') {
                Some((h, p)) => (Some(h), Some(p)),
                None => (Some(rest), None),
            }
        }
    } else {
        // proto:[port][:host]
        match rest.split_once(':') {
            Some((p, h)) if !p.is_empty() => (Some(h), Some(p)),
            Some((_, h)) => (Some(h), None),
            None => {
                if is_valid_port(rest) {
                    (None, Some(rest))
                } else {
                    (Some(rest), None)
                }
            }
        }
    };
    if let Some(port) = port {
        if !is_valid_port(port) {
            return Err(err());
        }
    }
    if let Some(host) = host {
        if !host.is_empty() && !is_ovs_host(host) {
            return Err(err());
        }
    }
    Ok(())
}

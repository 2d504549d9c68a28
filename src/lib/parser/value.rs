// SPDX-License-Identifier: Apache-2.0

// Node-kind assertions and scalar coercions over `serde_yaml::Value`,
// shared by every grammar handler.

use serde_yaml::{Mapping, Sequence, Value};

use crate::{ErrorKind, NetplanError};

fn bad_node(key: &str, expected: &str) -> NetplanError {
    NetplanError::new(
        ErrorKind::InvalidConfig,
        format!("expected {expected} for key '{key}'"),
    )
}

pub(crate) fn as_mapping<'a>(
    key: &str,
    value: &'a Value,
) -> Result<&'a Mapping, NetplanError> {
    value.as_mapping().ok_or_else(|| bad_node(key, "mapping"))
}

pub(crate) fn as_sequence<'a>(
    key: &str,
    value: &'a Value,
) -> Result<&'a Sequence, NetplanError> {
    value.as_sequence().ok_or_else(|| bad_node(key, "sequence"))
}

/// Mapping keys must be plain string scalars.
pub(crate) fn entry_key(key: &Value) -> Result<&str, NetplanError> {
    key.as_str().ok_or_else(|| {
        NetplanError::new(
            ErrorKind::InvalidConfig,
            "mapping keys must be scalars".to_string(),
        )
    })
}

/// Scalar as string; numbers and booleans keep their YAML rendering.
pub(crate) fn scalar_str(
    key: &str,
    value: &Value,
) -> Result<String, NetplanError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(bad_node(key, "scalar")),
    }
}

/// GLib-style boolean: `true/false`, `yes/no`, `on/off`, `y/n`, `1/0`.
pub(crate) fn scalar_bool(
    key: &str,
    value: &Value,
) -> Result<bool, NetplanError> {
    if let Value::Bool(b) = value {
        return Ok(*b);
    }
    let s = scalar_str(key, value)?;
    match s.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "y" | "1" => Ok(true),
        "false" | "off" | "no" | "n" | "0" => Ok(false),
        _ => Err(NetplanError::new(
            ErrorKind::InvalidConfig,
            format!("invalid boolean value '{s}' for key '{key}'"),
        )),
    }
}

pub(crate) fn scalar_u64(
    key: &str,
    value: &Value,
) -> Result<u64, NetplanError> {
    let s = scalar_str(key, value)?;
    s.parse::<u64>().map_err(|_| {
        NetplanError::new(
            ErrorKind::InvalidConfig,
            format!("invalid unsigned int value '{s}' for key '{key}'"),
        )
    })
}

pub(crate) fn scalar_u32(
    key: &str,
    value: &Value,
) -> Result<u32, NetplanError> {
    let v = scalar_u64(key, value)?;
    u32::try_from(v).map_err(|_| {
        NetplanError::new(
            ErrorKind::InvalidConfig,
            format!("value '{v}' for key '{key}' exceeds 32 bits"),
        )
    })
}

pub(crate) fn scalar_u16(
    key: &str,
    value: &Value,
) -> Result<u16, NetplanError> {
    let v = scalar_u64(key, value)?;
    u16::try_from(v).map_err(|_| {
        NetplanError::new(
            ErrorKind::InvalidConfig,
            format!("value '{v}' for key '{key}' exceeds 16 bits"),
        )
    })
}

pub(crate) fn scalar_u8(
    key: &str,
    value: &Value,
) -> Result<u8, NetplanError> {
    let v = scalar_u64(key, value)?;
    u8::try_from(v).map_err(|_| {
        NetplanError::new(
            ErrorKind::InvalidConfig,
            format!("value '{v}' for key '{key}' exceeds 8 bits"),
        )
    })
}

/// Tab-join a key path the way null-field entries are stored:
/// `["network", "ethernets", "eth0"]` → `"\tnetwork\tethernets\teth0"`.
pub(crate) fn join_path(components: &[&str]) -> String {
    let mut ret = String::new();
    for c in components {
        ret.push('\t');
        ret.push_str(c);
    }
    ret
}

pub(crate) fn is_yaml_null(value: &Value) -> bool {
    matches!(value, Value::Null)
}

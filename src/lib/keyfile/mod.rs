// SPDX-License-Identifier: Apache-2.0

// A small ordered reader for GLib style keyfiles, as written by
// NetworkManager under `system-connections/`. Order is preserved so
// whatever is not absorbed into typed netdef fields can be re-emitted
// as passthrough in the original sequence.

mod parse;

use crate::{ErrorKind, NetplanError};

#[derive(Debug, Clone, Default)]
pub(crate) struct KeyFileGroup {
    pub(crate) name: String,
    /// Key/value pairs in file order.
    pub(crate) entries: Vec<(String, String)>,
}

impl KeyFileGroup {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }
}

/// An ordered `[group] key=value` document.
#[derive(Debug, Clone, Default)]
pub(crate) struct KeyFile {
    pub(crate) groups: Vec<KeyFileGroup>,
}

impl KeyFile {
    pub(crate) fn parse(content: &str) -> Result<Self, NetplanError> {
        let mut ret = Self::default();
        for (lineno, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty()
                || trimmed.starts_with('#')
                || trimmed.starts_with(';')
            {
                continue;
            }
            if let Some(group) = trimmed
                .strip_prefix('[')
                .and_then(|g| g.strip_suffix(']'))
            {
                ret.groups.push(KeyFileGroup {
                    name: group.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }
            let (key, value) =
                trimmed.split_once('=').ok_or_else(|| {
                    NetplanError::new(
                        ErrorKind::FormatInvalidYaml,
                        format!(
                            "invalid keyfile line {}: '{trimmed}'",
                            lineno + 1
                        ),
                    )
                })?;
            let group = ret.groups.last_mut().ok_or_else(|| {
                NetplanError::new(
                    ErrorKind::FormatInvalidYaml,
                    format!(
                        "keyfile line {} appears before any group",
                        lineno + 1
                    ),
                )
            })?;
            group.entries.push((
                key.trim().to_string(),
                value.trim().to_string(),
            ));
        }
        Ok(ret)
    }

    pub(crate) fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .and_then(|g| g.get(key))
    }

    /// Consume a key, removing it from the remainder that would be
    /// passed through.
    pub(crate) fn remove(
        &mut self,
        group: &str,
        key: &str,
    ) -> Option<String> {
        self.groups
            .iter_mut()
            .find(|g| g.name == group)
            .and_then(|g| g.remove(key))
    }

    pub(crate) fn remove_group(&mut self, group: &str) {
        self.groups.retain(|g| g.name != group);
    }

    pub(crate) fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.name == group)
    }
}

/// NetworkManager semicolon separated list values, with a trailing
/// separator tolerated.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

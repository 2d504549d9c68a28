// SPDX-License-Identifier: Apache-2.0

// The three tier configuration hierarchy: `/usr/lib/netplan` (vendor),
// `/etc/netplan` (admin) and `/run/netplan` (runtime). Files sharing a
// basename shadow each other with run > etc > usr/lib, the surviving
// set is processed in lexicographic basename order.

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::Parser;
use crate::NetplanError;

// Lowest to highest priority.
const CONFIG_DIRS: [&str; 3] =
    ["usr/lib/netplan", "etc/netplan", "run/netplan"];

impl Parser {
    /// Load every `*.yaml` below `rootdir` following the shadowing
    /// rules. Missing directories are fine, unreadable files are not.
    pub fn load_yaml_hierarchy<P: AsRef<Path>>(
        &mut self,
        rootdir: P,
    ) -> Result<(), NetplanError> {
        let rootdir = rootdir.as_ref();
        // BTreeMap keyed by basename gives both shadowing and the
        // lexicographic processing order.
        let mut files: BTreeMap<String, PathBuf> = BTreeMap::new();
        for dir in CONFIG_DIRS {
            let dir = rootdir.join(dir);
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(_) => continue,
            };
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(_) => continue,
                };
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str())
                    != Some("yaml")
                {
                    continue;
                }
                let basename = match path
                    .file_name()
                    .and_then(|n| n.to_str())
                {
                    Some(basename) => basename.to_string(),
                    None => continue,
                };
                if let Some(shadowed) =
                    files.insert(basename, path.clone())
                {
                    debug!(
                        "{} is shadowed by {}",
                        shadowed.display(),
                        path.display()
                    );
                }
            }
        }
        for path in files.values() {
            check_file_permissions(path);
            self.load_yaml(path)?;
        }
        Ok(())
    }
}

/// Netplan YAML regularly carries secrets (wifi passphrases, wireguard
/// keys), so world readable configuration gets a warning.
fn check_file_permissions(path: &Path) {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return,
    };
    if metadata.permissions().mode() & 0o077 != 0 {
        warn!(
            "Permissions for {} are too open. Netplan configuration \
            should NOT be accessible by others.",
            path.display()
        );
    }
}

// SPDX-License-Identifier: Apache-2.0

// Multi-document driver: loads YAML sources, walks the `network:`
// envelope and dispatches every mapping entry to the grammar handler
// owning its key. Unknown keys fail loudly, null-field paths are
// skipped silently.

use std::io::Read;
use std::path::Path;

use serde_yaml::Value;

use super::value::{
    as_mapping, entry_key, is_yaml_null, join_path, scalar_u32,
};
use super::Parser;
use crate::error::refine_yaml_message;
use crate::netdef::NetDefinition;
use crate::types::{DeviceType, NetplanBackend};
use crate::{ErrorKind, NetplanError};

pub(crate) const DEVICE_SECTIONS: [(&str, DeviceType); 11] = [
    ("ethernets", DeviceType::Ethernet),
    ("wifis", DeviceType::Wifi),
    ("modems", DeviceType::Modem),
    ("bridges", DeviceType::Bridge),
    ("bonds", DeviceType::Bond),
    ("vlans", DeviceType::Vlan),
    ("vrfs", DeviceType::Vrf),
    ("tunnels", DeviceType::Tunnel),
    ("dummy-devices", DeviceType::Dummy),
    ("virtual-ethernets", DeviceType::Veth),
    ("nm-devices", DeviceType::NmPassthrough),
];

impl Parser {
    pub fn load_yaml<P: AsRef<Path>>(
        &mut self,
        filename: P,
    ) -> Result<(), NetplanError> {
        let filename = filename.as_ref();
        let name = filename.to_string_lossy().to_string();
        let content = std::fs::read_to_string(filename).map_err(|e| {
            NetplanError::from(e).with_path(name.as_str())
        })?;
        self.load_yaml_str(name.as_str(), content.as_str())
    }

    pub fn load_yaml_from_reader<R: Read>(
        &mut self,
        name: &str,
        mut reader: R,
    ) -> Result<(), NetplanError> {
        let mut content = String::new();
        reader.read_to_string(&mut content).map_err(|e| {
            NetplanError::from(e).with_path(name)
        })?;
        self.load_yaml_str(name, content.as_str())
    }

    /// Parse one YAML document into the accumulated, still unvalidated
    /// parser state.
    pub fn load_yaml_str(
        &mut self,
        filename: &str,
        content: &str,
    ) -> Result<(), NetplanError> {
        let doc: Value = serde_yaml::from_str(content)
            .map_err(|e| yaml_syntax_error(filename, content, e))?;
        self.sources.insert(filename.to_string());
        self.current_file = Some(filename.to_string());
        let ret = self.process_document(&doc);
        self.current_file = None;
        ret.map_err(|e| e.with_path(filename))
    }

    fn process_document(&mut self, doc: &Value) -> Result<(), NetplanError> {
        if is_yaml_null(doc) {
            // Empty file, nothing to do.
            return Ok(());
        }
        let root = as_mapping("document root", doc)?;
        for (key, value) in root {
            let key = entry_key(key)?;
            match key {
                "network" => self.process_network(value)?,
                _ => {
                    return Err(NetplanError::new(
                        ErrorKind::InvalidConfig,
                        format!("unknown key '{key}'"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn process_network(&mut self, value: &Value) -> Result<(), NetplanError> {
        if is_yaml_null(value) {
            return Ok(());
        }
        let network = as_mapping("network", value)?;
        for (key, value) in network {
            let key = entry_key(key)?;
            if self.is_null_field(&["network"], key) {
                continue;
            }
            match key {
                "version" => {
                    let version = scalar_u32(key, value)?;
                    if version != 2 {
                        return Err(NetplanError::new(
                            ErrorKind::InvalidConfig,
                            format!(
                                "Only version 2 is supported, got {version}"
                            ),
                        ));
                    }
                }
                "renderer" => {
                    if self.skip_by_override(&["network", "renderer"]) {
                        continue;
                    }
                    self.set_global_renderer(key, value)?;
                }
                "openvswitch" => self.process_global_ovs(value)?,
                _ => {
                    let device_type = DEVICE_SECTIONS
                        .iter()
                        .find(|(section, _)| *section == key)
                        .map(|(_, t)| *t);
                    match device_type {
                        Some(device_type) => self.process_section(
                            key,
                            device_type,
                            value,
                        )?,
                        None => {
                            return Err(NetplanError::new(
                                ErrorKind::InvalidConfig,
                                format!("unknown key '{key}'"),
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn set_global_renderer(
        &mut self,
        key: &str,
        value: &Value,
    ) -> Result<(), NetplanError> {
        let renderer = super::value::scalar_str(key, value)?;
        let backend = NetplanBackend::from_renderer(renderer.as_str())
            .ok_or_else(|| {
                NetplanError::new(
                    ErrorKind::InvalidConfig,
                    format!("unknown renderer '{renderer}'"),
                )
            })?;
        self.global_backend = backend;
        if let Some(basename) = self.current_basename() {
            self.global_renderer.insert(basename, backend);
        }
        Ok(())
    }

    fn process_section(
        &mut self,
        section: &str,
        device_type: DeviceType,
        value: &Value,
    ) -> Result<(), NetplanError> {
        if is_yaml_null(value) {
            return Ok(());
        }
        let mapping = as_mapping(section, value)?;
        for (id, body) in mapping {
            let id = entry_key(id)?;
            let path = ["network", section, id];
            if self.null_fields.contains(&join_path(&path)) {
                continue;
            }
            if self.skip_by_override(&path) {
                continue;
            }
            if let Err(e) =
                self.process_netdef(section, id, device_type, body)
            {
                let e = self.error_in_file(e);
                self.consume_error(e)?;
            }
        }
        Ok(())
    }

    /// Process a single netdef entry. On a recoverable failure under
    /// IGNORE_ERRORS the netdef's partial modifications are discarded.
    fn process_netdef(
        &mut self,
        section: &str,
        id: &str,
        device_type: DeviceType,
        body: &Value,
    ) -> Result<(), NetplanError> {
        let backup = self.defs.get(id).cloned();
        let result =
            self.process_netdef_inner(section, id, device_type, body);
        if result.is_err() {
            // Roll back to the pre-entry content so a consumed error
            // does not leave a half-built netdef behind.
            match backup {
                Some(def) => {
                    self.defs.insert(id.to_string(), def);
                }
                None => {
                    self.defs.remove(id);
                    self.ordered.retain(|existing| existing != id);
                }
            }
        }
        result
    }

    fn process_netdef_inner(
        &mut self,
        section: &str,
        id: &str,
        device_type: DeviceType,
        body: &Value,
    ) -> Result<(), NetplanError> {
        let mapping = as_mapping(id, body).map_err(|_| {
            NetplanError::new(
                ErrorKind::InvalidConfig,
                format!("{id}: expected mapping (check indentation)"),
            )
        })?;
        self.define_netdef(id, device_type)?;
        // The netdef is temporarily taken out of the container so the
        // handlers can borrow the parser (for cross references) and the
        // definition at the same time.
        let mut def = match self.defs.remove(id) {
            Some(def) => def,
            None => NetDefinition::new(id, device_type),
        };
        let result =
            self.process_netdef_body(&mut def, section, id, mapping);
        self.defs.insert(id.to_string(), def);
        result
    }

    fn process_netdef_body(
        &mut self,
        def: &mut NetDefinition,
        section: &str,
        id: &str,
        mapping: &serde_yaml::Mapping,
    ) -> Result<(), NetplanError> {
        let path = vec![
            "network".to_string(),
            section.to_string(),
            id.to_string(),
        ];
        for (key, value) in mapping {
            let key = entry_key(key)?;
            if self.is_null_field_owned(&path, key) {
                continue;
            }
            let handled = self.handle_common_key(def, key, value, &path)?
                || self.handle_type_key(def, key, value, &path)?;
            if !handled {
                return Err(NetplanError::new(
                    ErrorKind::InvalidConfig,
                    format!("{id}: unknown key '{key}'"),
                ));
            }
        }
        Ok(())
    }

    fn handle_type_key(
        &mut self,
        def: &mut NetDefinition,
        key: &str,
        value: &Value,
        path: &[String],
    ) -> Result<bool, NetplanError> {
        match def.device_type {
            DeviceType::Ethernet | DeviceType::SriovVf => {
                self.handle_ethernet_key(def, key, value, path)
            }
            DeviceType::Wifi => self.handle_wifi_key(def, key, value, path),
            DeviceType::Modem => self.handle_modem_key(def, key, value),
            DeviceType::Bridge => {
                self.handle_bridge_key(def, key, value, path)
            }
            DeviceType::Bond => self.handle_bond_key(def, key, value, path),
            DeviceType::Vlan => self.handle_vlan_key(def, key, value),
            DeviceType::Vrf => self.handle_vrf_key(def, key, value),
            DeviceType::Tunnel | DeviceType::Vxlan => {
                self.handle_tunnel_key(def, key, value, path)
            }
            DeviceType::Veth => self.handle_veth_key(def, key, value),
            DeviceType::Dummy
            | DeviceType::OvsPort
            | DeviceType::NmPassthrough
            | DeviceType::Placeholder => Ok(false),
        }
    }

    pub(crate) fn is_null_field(
        &self,
        path: &[&str],
        key: &str,
    ) -> bool {
        let mut full = join_path(path);
        full.push('\t');
        full.push_str(key);
        self.null_fields.contains(&full)
    }

    pub(crate) fn is_null_field_owned(
        &self,
        path: &[String],
        key: &str,
    ) -> bool {
        let components: Vec<&str> =
            path.iter().map(|c| c.as_str()).collect();
        self.is_null_field(&components, key)
    }

    fn skip_by_override(&self, path: &[&str]) -> bool {
        match self.null_overrides.get(&join_path(path)) {
            Some(hint) => {
                self.current_basename().as_deref() != Some(hint.as_str())
            }
            None => false,
        }
    }

    pub(crate) fn current_basename(&self) -> Option<String> {
        self.current_file.as_deref().map(|f| {
            Path::new(f)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| f.to_string())
        })
    }
}

/// Decorate a YAML syntax failure with the offending source line and a
/// caret below the reported column.
pub(crate) fn yaml_syntax_error(
    filename: &str,
    content: &str,
    e: serde_yaml::Error,
) -> NetplanError {
    let (line, column) = match e.location() {
        Some(location) => (location.line(), location.column()),
        None => (0, 0),
    };
    let mut ret = NetplanError::new(
        ErrorKind::InvalidYaml,
        refine_yaml_message(&e.to_string()),
    )
    .with_path(filename)
    .with_location(line, column);
    if line > 0 {
        if let Some(source_line) = content.lines().nth(line - 1) {
            ret = ret.with_source_line(source_line);
        }
    }
    ret
}

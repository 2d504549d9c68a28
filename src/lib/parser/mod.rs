// SPDX-License-Identifier: Apache-2.0

mod common;
mod device;
mod hierarchy;
mod nullable;
mod ovs;
mod tunnel;
mod value;
mod yaml;

use std::collections::{BTreeSet, HashMap, HashSet};

use log::warn;

use crate::netdef::{NetDefinition, OvsSettings};
use crate::types::{DeviceType, NetplanBackend};
use crate::{ErrorKind, NetplanError};

/// Parser behavior flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParserFlags(pub(crate) u32);

impl ParserFlags {
    /// Log and count recoverable parse/validation errors instead of
    /// failing, discarding the offending netdef and moving on.
    pub const IGNORE_ERRORS: u32 = 1 << 0;

    const VALID_MASK: u32 = Self::IGNORE_ERRORS;
}

/// What a pending cross-reference does to its target once the target's
/// definition is reached. Kinds without a payload only assert that the
/// referent exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkKind {
    /// Target becomes a port of `bridge`.
    BridgePort { bridge: String },
    /// Target becomes a member of `bond`.
    BondPort { bond: String },
    /// Target is named as `primary:` of `bond`.
    BondPrimary { bond: String },
    /// `path-cost:` entry of `bridge` naming the target.
    BridgePathCost { bridge: String, cost: u32 },
    /// `port-priority:` entry of `bridge` naming the target.
    BridgePortPriority { bridge: String, priority: u32 },
    /// Target becomes a member of `vrf`.
    VrfPort { vrf: String },
    /// Owner's `vlan_link` names the target.
    VlanLink,
    /// Owner's `vxlan_link` names the target (vxlan underlay).
    VxlanLink,
    /// Owner's `sriov_link` names the target as SR-IOV PF.
    SriovLink,
    /// Owner's veth `peer:` names the target.
    VethPeer,
}

#[derive(Debug, Clone)]
pub(crate) struct MissingNode {
    pub(crate) owner: String,
    pub(crate) link: LinkKind,
}

/// Transient builder accumulating unvalidated netdefs from YAML files
/// and NetworkManager keyfiles. Feed it into
/// [crate::State::import_parser_results] to obtain a validated state.
#[derive(Debug, Default)]
pub struct Parser {
    pub(crate) defs: HashMap<String, NetDefinition>,
    /// Ids in first-definition order; every id in `defs` appears here
    /// exactly once.
    pub(crate) ordered: Vec<String>,
    /// Forward references not yet resolved, keyed by the missing id.
    pub(crate) missing_ids: HashMap<String, Vec<MissingNode>>,
    pub(crate) missing_ids_found: usize,
    /// Tab-joined key paths marked as deleted by a nullable-fields
    /// document.
    pub(crate) null_fields: HashSet<String>,
    /// Netdef/global paths that are authoritative only in the recorded
    /// file basename.
    pub(crate) null_overrides: HashMap<String, String>,
    pub(crate) global_backend: NetplanBackend,
    pub(crate) global_ovs: OvsSettings,
    /// Renderer per file basename, for write-back decisions.
    pub(crate) global_renderer: HashMap<String, NetplanBackend>,
    pub(crate) sources: BTreeSet<String>,
    pub(crate) current_file: Option<String>,
    flags: ParserFlags,
    error_count: usize,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all parsed content and bookkeeping, keeping the flags.
    pub fn reset(&mut self) {
        let flags = self.flags;
        *self = Self {
            flags,
            ..Self::default()
        };
    }

    pub fn set_flags(&mut self, flags: u32) -> Result<(), NetplanError> {
        if flags & !ParserFlags::VALID_MASK != 0 {
            return Err(NetplanError::new(
                ErrorKind::InvalidFlag,
                format!("invalid parser flags 0x{flags:x}"),
            ));
        }
        self.flags = ParserFlags(flags);
        Ok(())
    }

    pub fn flags(&self) -> u32 {
        self.flags.0
    }

    /// Number of recoverable errors consumed under
    /// [ParserFlags::IGNORE_ERRORS].
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub(crate) fn ignores_errors(&self) -> bool {
        self.flags.0 & ParserFlags::IGNORE_ERRORS != 0
    }

    /// Consume a recoverable error under IGNORE_ERRORS, otherwise
    /// propagate it. Fatal kinds always propagate.
    pub(crate) fn consume_error(
        &mut self,
        e: NetplanError,
    ) -> Result<(), NetplanError> {
        if self.ignores_errors() && e.kind().is_recoverable() {
            warn!("ignoring error: {e}");
            self.error_count += 1;
            Ok(())
        } else {
            Err(e)
        }
    }

    pub(crate) fn error_in_file(&self, e: NetplanError) -> NetplanError {
        match self.current_file.as_deref() {
            Some(f) => e.with_path(f),
            None => e,
        }
    }

    /// Look up or create the netdef for `id`, enforcing the type-change
    /// rules: re-declaring with a different type is an error, except a
    /// placeholder is promoted on its first real definition.
    pub(crate) fn define_netdef(
        &mut self,
        id: &str,
        device_type: DeviceType,
    ) -> Result<(), NetplanError> {
        if let Some(existing) = self.defs.get_mut(id) {
            if existing.device_type == device_type {
                return Ok(());
            }
            if existing.device_type == DeviceType::Placeholder {
                existing.device_type = device_type;
                return Ok(());
            }
            // Tunnel ids are re-typed to vxlan once `mode: vxlan` shows
            // up, both live in the `tunnels:` section.
            if existing.device_type == DeviceType::Tunnel
                && device_type == DeviceType::Vxlan
            {
                existing.device_type = DeviceType::Vxlan;
                return Ok(());
            }
            return Err(NetplanError::new(
                ErrorKind::ConfigValidation,
                format!("updated definition '{id}' changes device type"),
            ));
        }
        let mut def = NetDefinition::new(id, device_type);
        def.filepath = self.current_file.clone();
        self.defs.insert(id.to_string(), def);
        self.ordered.push(id.to_string());
        self.resolve_missing(id)?;
        Ok(())
    }

    /// Record a reference to a netdef that may not be defined yet. When
    /// the referent already exists the effect is applied immediately.
    pub(crate) fn link_netdef(
        &mut self,
        owner: &str,
        target: &str,
        link: LinkKind,
    ) -> Result<(), NetplanError> {
        if self.defs.contains_key(target) {
            self.apply_link(owner, target, &link)
        } else {
            self.missing_ids
                .entry(target.to_string())
                .or_default()
                .push(MissingNode {
                    owner: owner.to_string(),
                    link,
                });
            Ok(())
        }
    }

    /// A definition for `id` arrived: resolve every reference that was
    /// waiting for it.
    fn resolve_missing(&mut self, id: &str) -> Result<(), NetplanError> {
        let nodes = match self.missing_ids.remove(id) {
            Some(nodes) => nodes,
            None => return Ok(()),
        };
        self.missing_ids_found += nodes.len();
        for node in nodes {
            let owner = node.owner.clone();
            self.apply_link(&owner, id, &node.link)?;
        }
        Ok(())
    }

    fn apply_link(
        &mut self,
        owner: &str,
        target: &str,
        link: &LinkKind,
    ) -> Result<(), NetplanError> {
        let def = match self.defs.get_mut(target) {
            Some(def) => def,
            None => return Ok(()),
        };
        match link {
            LinkKind::BridgePort { bridge } => {
                if let Some(other) = conflicting_parent(def, bridge) {
                    return Err(NetplanError::new(
                        ErrorKind::ConfigValidation,
                        format!(
                            "interface '{target}' is already assigned to \
                            '{other}' and cannot be a port of bridge \
                            '{bridge}'"
                        ),
                    ));
                }
                def.bridge_link = Some(bridge.clone());
            }
            LinkKind::BondPort { bond } => {
                if let Some(other) = conflicting_parent(def, bond) {
                    return Err(NetplanError::new(
                        ErrorKind::ConfigValidation,
                        format!(
                            "interface '{target}' is already assigned to \
                            '{other}' and cannot be a member of bond \
                            '{bond}'"
                        ),
                    ));
                }
                def.bond_link = Some(bond.clone());
            }
            LinkKind::VrfPort { vrf } => {
                def.vrf_link = Some(vrf.clone());
            }
            LinkKind::BridgePathCost { cost, .. } => {
                def.bridge_path_cost = Some(*cost);
            }
            LinkKind::BridgePortPriority { priority, .. } => {
                def.bridge_port_priority = Some(*priority);
            }
            // Existence-only references: the owner already stores the
            // target id in its link field.
            LinkKind::BondPrimary { .. }
            | LinkKind::VlanLink
            | LinkKind::VxlanLink
            | LinkKind::SriovLink
            | LinkKind::VethPeer => {
                let _ = owner;
            }
        }
        Ok(())
    }

    /// Called once no further input will arrive: every still-missing id
    /// is an error, except VLAN parents and veth peers of
    /// NetworkManager netdefs, which NM tolerates as dangling and we
    /// synthesize as placeholders.
    pub(crate) fn finalize_missing(&mut self) -> Result<(), NetplanError> {
        loop {
            let missing: Vec<String> =
                self.missing_ids.keys().cloned().collect();
            if missing.is_empty() {
                return Ok(());
            }
            let before = self.missing_ids_found;
            for id in missing {
                let nodes = match self.missing_ids.get(&id) {
                    Some(nodes) => nodes,
                    None => continue,
                };
                let synthesize = nodes.iter().all(|node| {
                    matches!(
                        node.link,
                        LinkKind::VlanLink | LinkKind::VethPeer
                    ) && self
                        .defs
                        .get(&node.owner)
                        .map(|def| {
                            self.effective_backend(def)
                                == NetplanBackend::NetworkManager
                        })
                        .unwrap_or(false)
                });
                if synthesize {
                    self.define_netdef(&id, DeviceType::Placeholder)?;
                    if let Some(def) = self.defs.get_mut(&id) {
                        def.backend = NetplanBackend::NetworkManager;
                        def.filepath = None;
                    }
                } else {
                    let owner = nodes[0].owner.clone();
                    let e = NetplanError::new(
                        ErrorKind::ConfigValidation,
                        format!(
                            "{owner}: interface '{id}' is not defined"
                        ),
                    );
                    self.missing_ids.remove(&id);
                    self.consume_error(e)?;
                }
            }
            // Fixed point: no progress and nothing left to synthesize.
            if self.missing_ids_found == before && !self.missing_ids.is_empty()
            {
                continue;
            }
            if self.missing_ids.is_empty() {
                return Ok(());
            }
        }
    }

    pub(crate) fn effective_backend(
        &self,
        def: &NetDefinition,
    ) -> NetplanBackend {
        if def.backend != NetplanBackend::None {
            return def.backend;
        }
        if self.global_backend != NetplanBackend::None {
            return self.global_backend;
        }
        NetplanBackend::Networkd
    }
}

/// A netdef may have exactly one parent among bridge and bond.
fn conflicting_parent<'a>(
    def: &'a NetDefinition,
    new_parent: &str,
) -> Option<&'a str> {
    for existing in [def.bridge_link.as_deref(), def.bond_link.as_deref()]
        .into_iter()
        .flatten()
    {
        if existing != new_parent {
            return Some(existing);
        }
    }
    None
}

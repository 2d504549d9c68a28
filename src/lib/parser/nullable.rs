// SPDX-License-Identifier: Apache-2.0

// Deletion and origin-override bookkeeping. A "diff" YAML document full
// of nulls marks which keys a later full parse must drop, an "origin
// hint" document pins netdefs and globals to one file basename.

use std::io::Read;

use serde_yaml::Value;

use super::value::entry_key;
use super::yaml::yaml_syntax_error;
use super::Parser;
use crate::NetplanError;

impl Parser {
    /// Record every null-valued key path of the given YAML document in
    /// the null-fields set. A subsequent [Parser::load_yaml] of the full
    /// configuration skips those paths, effectively deleting them.
    pub fn load_nullable_fields<R: Read>(
        &mut self,
        reader: R,
    ) -> Result<(), NetplanError> {
        let doc = read_document("<nullable-fields>", reader)?;
        if matches!(doc, Value::Null) {
            return Ok(());
        }
        let mut path = Vec::new();
        self.collect_null_fields(&doc, &mut path)?;
        Ok(())
    }

    fn collect_null_fields(
        &mut self,
        node: &Value,
        path: &mut Vec<String>,
    ) -> Result<(), NetplanError> {
        if let Value::Mapping(mapping) = node {
            for (key, value) in mapping {
                let key = entry_key(key)?;
                path.push(key.to_string());
                if matches!(value, Value::Null) {
                    self.null_fields.insert(join_owned(path));
                } else {
                    self.collect_null_fields(value, path)?;
                }
                path.pop();
            }
        }
        Ok(())
    }

    /// Record which netdefs and global values the given document
    /// defines, all mapped to `constraint` (a file basename). During a
    /// subsequent full parse those paths are only honored when read
    /// from a file of that basename.
    pub fn load_nullable_overrides<R: Read>(
        &mut self,
        reader: R,
        constraint: &str,
    ) -> Result<(), NetplanError> {
        let doc = read_document("<nullable-overrides>", reader)?;
        if matches!(doc, Value::Null) {
            return Ok(());
        }
        let root = match doc.as_mapping() {
            Some(root) => root,
            None => return Ok(()),
        };
        let network = match root
            .get(Value::String("network".to_string()))
            .and_then(|n| n.as_mapping())
        {
            Some(network) => network,
            None => return Ok(()),
        };
        for (key, value) in network {
            let key = entry_key(key)?;
            if key == "version" {
                continue;
            }
            let is_section = super::yaml::DEVICE_SECTIONS
                .iter()
                .any(|(section, _)| *section == key);
            if is_section {
                if let Some(ids) = value.as_mapping() {
                    for (id, _) in ids {
                        let id = entry_key(id)?;
                        self.null_overrides.insert(
                            join_owned(&[
                                "network".to_string(),
                                key.to_string(),
                                id.to_string(),
                            ]),
                            constraint.to_string(),
                        );
                    }
                }
            } else {
                // Globals like `renderer` are owned as a whole.
                self.null_overrides.insert(
                    join_owned(&[
                        "network".to_string(),
                        key.to_string(),
                    ]),
                    constraint.to_string(),
                );
            }
        }
        Ok(())
    }
}

fn read_document<R: Read>(
    name: &str,
    mut reader: R,
) -> Result<Value, NetplanError> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| NetplanError::from(e).with_path(name))?;
    serde_yaml::from_str(content.as_str())
        .map_err(|e| yaml_syntax_error(name, content.as_str(), e))
}

fn join_owned(components: &[String]) -> String {
    let mut ret = String::new();
    for c in components {
        ret.push('\t');
        ret.push_str(c);
    }
    ret
}

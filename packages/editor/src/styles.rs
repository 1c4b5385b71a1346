//! Style rule storage
//!
//! Node base declarations live on the nodes themselves. This module holds
//! everything else: class rules and device-scoped rules, keyed by device id
//! and then by node id or class name.

use crate::EditorError;
use indexmap::IndexMap;
use pagecraft_parser::{parse_declarations, Declarations};
use serde::{Deserialize, Serialize};

/// What a style write targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "camelCase")]
pub enum StyleTarget {
    Node(String),
    Class(String),
}

/// Rules scoped to one constrained device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopedRules {
    pub classes: IndexMap<String, Declarations>,
    pub nodes: IndexMap<String, Declarations>,
}

impl ScopedRules {
    fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleRules {
    /// Unscoped class rules
    pub classes: IndexMap<String, Declarations>,
    /// Device id → scoped rules
    pub scoped: IndexMap<String, ScopedRules>,
}

impl StyleRules {
    /// Declarations for a class, unscoped or scoped to `device`
    pub fn class_rule(&self, class: &str, device: Option<&str>) -> Option<&Declarations> {
        match device {
            None => self.classes.get(class),
            Some(device) => self.scoped.get(device)?.classes.get(class),
        }
    }

    pub fn node_rule(&self, node_id: &str, device: &str) -> Option<&Declarations> {
        self.scoped.get(device)?.nodes.get(node_id)
    }

    pub(crate) fn has_node_rules(&self, node_id: &str) -> bool {
        self.scoped.values().any(|s| s.nodes.contains_key(node_id))
    }

    /// Write one declaration. `device` must be a constrained device id or
    /// `None` for class base rules; node base writes go to the node.
    pub(crate) fn write(
        &mut self,
        target: &StyleTarget,
        device: Option<&str>,
        property: &str,
        value: &str,
    ) {
        match (target, device) {
            (StyleTarget::Class(class), None) => {
                write_into(&mut self.classes, class, property, value);
            }
            (StyleTarget::Class(class), Some(device)) => {
                let scoped = self.scoped.entry(device.to_string()).or_default();
                write_into(&mut scoped.classes, class, property, value);
                self.prune(device);
            }
            (StyleTarget::Node(node_id), Some(device)) => {
                let scoped = self.scoped.entry(device.to_string()).or_default();
                write_into(&mut scoped.nodes, node_id, property, value);
                self.prune(device);
            }
            (StyleTarget::Node(_), None) => {}
        }
    }

    /// Drop every scoped rule targeting `node_id`
    pub(crate) fn remove_node(&mut self, node_id: &str) {
        for scoped in self.scoped.values_mut() {
            scoped.nodes.shift_remove(node_id);
        }
        self.scoped.retain(|_, scoped| !scoped.is_empty());
    }

    pub(crate) fn rename_node(&mut self, old_id: &str, new_id: &str) {
        for scoped in self.scoped.values_mut() {
            if let Some(index) = scoped.nodes.get_index_of(old_id) {
                if let Some((_, decls)) = scoped.nodes.shift_remove_index(index) {
                    scoped.nodes.shift_insert(index, new_id.to_string(), decls);
                }
            }
        }
    }

    fn prune(&mut self, device: &str) {
        if self.scoped.get(device).map_or(false, ScopedRules::is_empty) {
            self.scoped.shift_remove(device);
        }
    }
}

/// Set or (for an empty value) remove a declaration in a rule map
fn write_into(
    rules: &mut IndexMap<String, Declarations>,
    key: &str,
    property: &str,
    value: &str,
) {
    if value.is_empty() {
        if let Some(decls) = rules.get_mut(key) {
            decls.shift_remove(property);
            if decls.is_empty() {
                rules.shift_remove(key);
            }
        }
    } else {
        rules
            .entry(key.to_string())
            .or_default()
            .insert(property.to_string(), value.to_string());
    }
}

/// Set or remove a declaration in a single declaration map
pub(crate) fn write_declaration(decls: &mut Declarations, property: &str, value: &str) {
    if value.is_empty() {
        decls.shift_remove(property);
    } else {
        decls.insert(property.to_string(), value.to_string());
    }
}

/// Validate and normalize a declaration.
///
/// The property must be a CSS identifier (custom properties allowed). The
/// value must survive a round trip through the declaration parser as a
/// single declaration, which rules out `;`, braces, comments and unbalanced
/// parentheses. `<` is rejected so a stylesheet can never close its
/// `<style>` element. Returns the lowercased property and the normalized value;
/// an empty value means "remove".
pub fn normalize_declaration(property: &str, value: &str) -> Result<(String, String), EditorError> {
    let property = property.trim().to_ascii_lowercase();
    if !is_css_identifier(&property) {
        return Err(EditorError::invalid_value(property, value));
    }

    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok((property, String::new()));
    }
    if trimmed.contains(['{', '}', ';', '<']) || trimmed.contains("/*") {
        return Err(EditorError::invalid_value(property, value));
    }

    let parsed = parse_declarations(&format!("{}:{}", property, trimmed))
        .map_err(|_| EditorError::invalid_value(&property, value))?;

    match parsed.get(&property) {
        Some(normalized) if parsed.len() == 1 => {
            let normalized = normalized.clone();
            Ok((property, normalized))
        }
        _ => Err(EditorError::invalid_value(property, value)),
    }
}

/// `-?-?[a-z_][a-z0-9_-]*`
pub fn is_css_identifier(name: &str) -> bool {
    let body = name
        .strip_prefix("--")
        .or_else(|| name.strip_prefix('-'))
        .unwrap_or(name);

    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Class names listed in a `class` attribute value
pub fn class_list(value: &str) -> impl Iterator<Item = &str> {
    value.split_ascii_whitespace()
}

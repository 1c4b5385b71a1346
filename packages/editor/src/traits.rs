//! Trait manager: per-tag editable attributes of the selected component

use crate::document::Document;
use crate::EditorError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TraitKind {
    Text,
    Select { options: Vec<String> },
    /// Boolean attribute: present when checked
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitDef {
    /// Attribute name
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: TraitKind,
}

impl TraitDef {
    pub fn text(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: TraitKind::Text,
        }
    }

    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: TraitKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        }
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind: TraitKind::Checkbox,
        }
    }
}

/// A trait together with the selected node's current value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitValue {
    pub def: TraitDef,
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TraitManager {
    /// Traits every element has
    common: Vec<TraitDef>,
    by_tag: IndexMap<String, Vec<TraitDef>>,
    selected: Option<String>,
}

impl Default for TraitManager {
    fn default() -> Self {
        let mut by_tag = IndexMap::new();
        by_tag.insert(
            "a".to_string(),
            vec![
                TraitDef::text("href", "Href"),
                TraitDef::select("target", "Target", &["", "_blank"]),
            ],
        );
        by_tag.insert(
            "input".to_string(),
            vec![
                TraitDef::text("name", "Name"),
                TraitDef::text("placeholder", "Placeholder"),
                TraitDef::select(
                    "type",
                    "Type",
                    &["text", "email", "password", "number", "tel", "checkbox", "submit"],
                ),
                TraitDef::checkbox("required", "Required"),
            ],
        );
        by_tag.insert(
            "textarea".to_string(),
            vec![
                TraitDef::text("name", "Name"),
                TraitDef::text("placeholder", "Placeholder"),
                TraitDef::checkbox("required", "Required"),
            ],
        );
        by_tag.insert(
            "button".to_string(),
            vec![TraitDef::select("type", "Type", &["button", "submit", "reset"])],
        );
        by_tag.insert(
            "img".to_string(),
            vec![TraitDef::text("src", "Source"), TraitDef::text("alt", "Alt text")],
        );
        by_tag.insert(
            "form".to_string(),
            vec![
                TraitDef::text("action", "Action"),
                TraitDef::select("method", "Method", &["get", "post"]),
            ],
        );
        by_tag.insert("label".to_string(), vec![TraitDef::text("for", "For")]);

        Self {
            common: vec![TraitDef::text("id", "Id"), TraitDef::text("title", "Title")],
            by_tag,
            selected: None,
        }
    }
}

impl TraitManager {
    /// Add or replace the traits of a tag
    pub fn define(&mut self, tag: &str, traits: Vec<TraitDef>) {
        self.by_tag.insert(tag.to_ascii_lowercase(), traits);
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn bind(&mut self, doc: &Document, node_id: &str) -> Result<(), EditorError> {
        if doc.node(node_id)?.is_text() {
            return Err(EditorError::invalid_operation(format!(
                "{} is a text node and has no traits",
                node_id
            )));
        }
        self.selected = Some(node_id.to_string());
        Ok(())
    }

    pub fn unbind(&mut self) {
        self.selected = None;
    }

    /// Trait definitions available for a tag
    pub fn definitions(&self, tag: &str) -> impl Iterator<Item = &TraitDef> {
        self.common
            .iter()
            .chain(self.by_tag.get(tag).into_iter().flatten())
    }

    /// Traits of the selected node with their current values
    pub fn traits(&self, doc: &Document) -> Result<Vec<TraitValue>, EditorError> {
        let node_id = self.selected.as_deref().ok_or(EditorError::NoSelection)?;
        let node = doc.node(node_id)?;
        let tag = node.tag().unwrap_or_default();

        Ok(self
            .definitions(tag)
            .map(|def| TraitValue {
                def: def.clone(),
                value: if def.name == "id" {
                    Some(node.id.clone())
                } else {
                    node.attributes.get(&def.name).cloned()
                },
            })
            .collect())
    }

    /// Write a trait of the selected node. Setting `id` renames the node and
    /// the selection follows it.
    pub fn set_trait(
        &mut self,
        doc: &mut Document,
        name: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        let node_id = self
            .selected
            .clone()
            .ok_or(EditorError::NoSelection)?;
        let tag = doc.node(&node_id)?.tag().unwrap_or_default().to_string();

        let def = self
            .definitions(&tag)
            .find(|d| d.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| EditorError::not_found("trait", format!("{}.{}", tag, name)))?;

        debug!(node = %node_id, name = %def.name, value, "Setting trait");

        match &def.kind {
            TraitKind::Text if def.name == "id" => {
                let new_id = value.trim().to_string();
                doc.set_attribute(&node_id, "id", &new_id)?;
                self.selected = Some(new_id);
                Ok(())
            }
            TraitKind::Text => set_or_clear(doc, &node_id, &def.name, value),
            TraitKind::Select { options } => {
                if !value.is_empty() && !options.iter().any(|o| o == value) {
                    return Err(EditorError::invalid_value(&def.name, value));
                }
                set_or_clear(doc, &node_id, &def.name, value)
            }
            TraitKind::Checkbox => match value {
                "true" | "on" | "1" => doc.set_attribute(&node_id, &def.name, ""),
                "false" | "off" | "0" | "" => set_or_clear(doc, &node_id, &def.name, ""),
                _ => Err(EditorError::invalid_value(&def.name, value)),
            },
        }
    }

    /// Follow the selection through an id change made elsewhere
    pub(crate) fn retarget(&mut self, old_id: &str, new_id: &str) {
        if self.selected.as_deref() == Some(old_id) {
            self.selected = Some(new_id.to_string());
        }
    }
}

fn set_or_clear(doc: &mut Document, node_id: &str, name: &str, value: &str) -> Result<(), EditorError> {
    if !value.is_empty() {
        return doc.set_attribute(node_id, name, value);
    }
    if doc.node(node_id)?.attributes.contains_key(name) {
        doc.remove_attribute(node_id, name)?;
    }
    Ok(())
}

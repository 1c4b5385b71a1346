//! # Document Mutations
//!
//! Every structural or style change is expressed as a [`Mutation`] value.
//!
//! ## Semantics
//!
//! - `validate` checks the mutation against the current document without
//!   touching it; [`crate::Document::apply`] only applies validated
//!   mutations, so errors never leave partial changes
//! - Insert never clamps its index; anything outside `0..=len` fails
//! - Move validates its index against the new parent's children *after*
//!   the moved node is detached, and fails with `CycleDetected` when the new
//!   parent is the node itself or one of its descendants
//! - Remove drops the whole subtree and every scoped rule targeting it
//! - An empty style value removes the declaration

use crate::document::{Document, Node, NodeKind, ROOT_ID};
use crate::observer::DocumentChange;
use crate::styles::{is_css_identifier, normalize_declaration, write_declaration, StyleTarget};
use crate::EditorError;
use indexmap::IndexMap;
use pagecraft_parser::text::collapse_whitespace;
use pagecraft_parser::{
    is_raw_text_element, is_void_element, parse_declarations, parse_fragment, ComponentTree,
    Declarations, IdGenerator, NodeSpec, ParseError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// Semantic document mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    /// Insert the roots of `tree` as consecutive children of `parent_id`
    InsertNodes {
        parent_id: String,
        index: usize,
        tree: ComponentTree,
    },

    RemoveNode {
        node_id: String,
    },

    MoveNode {
        node_id: String,
        new_parent_id: String,
        index: usize,
    },

    /// `device_id` of `None` or an unconstrained device targets base styles
    SetStyle {
        target: StyleTarget,
        device_id: Option<String>,
        property: String,
        value: String,
    },

    SetAttribute {
        node_id: String,
        name: String,
        value: String,
    },

    RemoveAttribute {
        node_id: String,
        name: String,
    },

    /// Atomic replacement of a text node's content
    UpdateText {
        node_id: String,
        content: String,
    },
}

/// Result of applying a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// New document version
    pub version: u64,
    pub change: DocumentChange,
}

/// Content accepted by insert: raw markup or an already parsed tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Markup(String),
    Tree(ComponentTree),
}

impl Template {
    /// Parse markup; trees pass through
    pub fn into_tree(self) -> Result<ComponentTree, EditorError> {
        match self {
            Template::Markup(markup) => Ok(parse_fragment(&markup)?),
            Template::Tree(tree) => Ok(tree),
        }
    }
}

impl From<&str> for Template {
    fn from(markup: &str) -> Self {
        Template::Markup(markup.to_string())
    }
}

impl From<String> for Template {
    fn from(markup: String) -> Self {
        Template::Markup(markup)
    }
}

impl From<ComponentTree> for Template {
    fn from(tree: ComponentTree) -> Self {
        Template::Tree(tree)
    }
}

impl From<NodeSpec> for Template {
    fn from(node: NodeSpec) -> Self {
        Template::Tree(ComponentTree::from(node))
    }
}

impl Mutation {
    /// Validate without applying
    pub fn validate(&self, doc: &Document) -> Result<(), EditorError> {
        match self {
            Mutation::InsertNodes {
                parent_id,
                index,
                tree,
            } => {
                let parent = doc.node(parent_id)?;
                ensure_container(parent)?;
                if *index > parent.children.len() {
                    return Err(EditorError::InvalidIndex {
                        index: *index,
                        len: parent.children.len(),
                    });
                }
                normalize_tree(tree)?;
                Ok(())
            }

            Mutation::RemoveNode { node_id } => {
                doc.node(node_id)?;
                if node_id == ROOT_ID {
                    return Err(EditorError::invalid_operation("The root cannot be removed"));
                }
                Ok(())
            }

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => {
                let node = doc.node(node_id)?;
                if node_id == ROOT_ID {
                    return Err(EditorError::invalid_operation("The root cannot be moved"));
                }

                let parent = doc.node(new_parent_id)?;
                if doc.is_ancestor_or_self(node_id, new_parent_id) {
                    return Err(EditorError::CycleDetected {
                        node_id: node_id.clone(),
                        parent_id: new_parent_id.clone(),
                    });
                }
                ensure_container(parent)?;

                let mut len = parent.children.len();
                if node.parent.as_deref() == Some(new_parent_id.as_str()) {
                    len -= 1;
                }
                if *index > len {
                    return Err(EditorError::InvalidIndex { index: *index, len });
                }
                Ok(())
            }

            Mutation::SetStyle {
                target,
                device_id,
                property,
                value,
            } => {
                match target {
                    StyleTarget::Node(node_id) => {
                        ensure_element(doc.node(node_id)?)?;
                    }
                    StyleTarget::Class(class) => {
                        if !is_css_identifier(class) {
                            return Err(EditorError::invalid_value("class", class));
                        }
                    }
                }
                doc.style_scope(device_id.as_deref())?;
                normalize_declaration(property, value)?;
                Ok(())
            }

            Mutation::SetAttribute {
                node_id,
                name,
                value,
            } => {
                let node = doc.node(node_id)?;
                ensure_element(node)?;
                let name = attribute_name(name)?;

                if name == "id" {
                    if node_id == ROOT_ID {
                        return Err(EditorError::invalid_operation("The root id is fixed"));
                    }
                    let new_id = value.trim();
                    if !is_valid_node_id(new_id) {
                        return Err(EditorError::invalid_value("id", value));
                    }
                    if new_id != node_id && doc.contains(new_id) {
                        return Err(EditorError::duplicate("node", new_id));
                    }
                }
                Ok(())
            }

            Mutation::RemoveAttribute { node_id, name } => {
                ensure_element(doc.node(node_id)?)?;
                if attribute_name(name)? == "id" {
                    return Err(EditorError::invalid_operation("Node ids cannot be removed"));
                }
                Ok(())
            }

            Mutation::UpdateText { node_id, content } => {
                if !doc.node(node_id)?.is_text() {
                    return Err(EditorError::invalid_operation(format!(
                        "{} is not a text node",
                        node_id
                    )));
                }

                let Some(parent) = doc.parent(node_id) else {
                    return Ok(());
                };
                let tag = doc.node(parent)?.tag().unwrap_or_default();
                if !is_raw_text_element(tag) {
                    return Ok(());
                }

                // Siblings are serialized back to back, so check the joined text
                let mut joined = String::new();
                for child in doc.children(parent)? {
                    if child == node_id {
                        joined.push_str(content);
                    } else if let Some(text) = doc.get(child).and_then(Node::text_content) {
                        joined.push_str(text);
                    }
                }
                ensure_raw_text(tag, &joined)
            }
        }
    }

    /// Apply a validated mutation
    pub(crate) fn apply(self, doc: &mut Document) -> Result<DocumentChange, EditorError> {
        match self {
            Mutation::InsertNodes {
                parent_id,
                index,
                tree,
            } => {
                let specs = normalize_tree(&tree)?;
                let mut builder = NodeBuilder::new(&doc.nodes, &mut doc.ids, &specs);
                let mut nodes = Vec::new();
                let node_ids: Vec<String> = specs
                    .into_iter()
                    .map(|spec| builder.build(spec, &parent_id, &mut nodes))
                    .collect();

                for node in nodes {
                    doc.nodes.insert(node.id.clone(), node);
                }
                let parent = node_mut(doc, &parent_id)?;
                parent
                    .children
                    .splice(index..index, node_ids.iter().cloned());

                Ok(DocumentChange::Inserted {
                    parent_id,
                    index,
                    node_ids,
                })
            }

            Mutation::RemoveNode { node_id } => {
                let parent_id = doc
                    .parent(&node_id)
                    .map(str::to_string)
                    .ok_or_else(|| EditorError::invalid_operation("Node has no parent"))?;
                node_mut(doc, &parent_id)?.children.retain(|c| *c != node_id);

                let removed = doc.subtree(&node_id);
                for id in &removed {
                    doc.nodes.swap_remove(id);
                    doc.rules.remove_node(id);
                }

                Ok(DocumentChange::Removed {
                    parent_id,
                    node_id,
                    removed,
                })
            }

            Mutation::MoveNode {
                node_id,
                new_parent_id,
                index,
            } => {
                let old_parent_id = doc
                    .parent(&node_id)
                    .map(str::to_string)
                    .ok_or_else(|| EditorError::invalid_operation("Node has no parent"))?;

                node_mut(doc, &old_parent_id)?
                    .children
                    .retain(|c| *c != node_id);
                node_mut(doc, &new_parent_id)?
                    .children
                    .insert(index, node_id.clone());
                node_mut(doc, &node_id)?.parent = Some(new_parent_id.clone());

                Ok(DocumentChange::Moved {
                    node_id,
                    old_parent_id,
                    new_parent_id,
                    index,
                })
            }

            Mutation::SetStyle {
                target,
                device_id,
                property,
                value,
            } => {
                let scope = doc.style_scope(device_id.as_deref())?;
                let (property, value) = normalize_declaration(&property, &value)?;

                match (&target, &scope) {
                    (StyleTarget::Node(node_id), None) => {
                        write_declaration(&mut node_mut(doc, node_id)?.styles, &property, &value);
                    }
                    _ => doc.rules.write(&target, scope.as_deref(), &property, &value),
                }

                Ok(DocumentChange::StyleChanged {
                    target,
                    device_id: scope,
                    property,
                })
            }

            Mutation::SetAttribute {
                node_id,
                name,
                value,
            } => {
                let name = attribute_name(&name)?;
                if name == "id" {
                    let new_id = value.trim().to_string();
                    rename_node(doc, &node_id, &new_id)?;
                    return Ok(DocumentChange::Renamed {
                        old_id: node_id,
                        new_id,
                    });
                }

                node_mut(doc, &node_id)?
                    .attributes
                    .insert(name.clone(), value);
                Ok(DocumentChange::AttributeChanged { node_id, name })
            }

            Mutation::RemoveAttribute { node_id, name } => {
                let name = attribute_name(&name)?;
                node_mut(doc, &node_id)?.attributes.shift_remove(&name);
                Ok(DocumentChange::AttributeChanged { node_id, name })
            }

            Mutation::UpdateText { node_id, content } => {
                let raw = doc
                    .parent(&node_id)
                    .and_then(|p| doc.get(p))
                    .and_then(Node::tag)
                    .map_or(false, is_raw_text_element);
                let content = if raw {
                    content
                } else {
                    collapse_whitespace(&content)
                };

                node_mut(doc, &node_id)?.kind = NodeKind::Text { content };
                Ok(DocumentChange::TextChanged { node_id })
            }
        }
    }
}

fn node_mut<'a>(doc: &'a mut Document, id: &str) -> Result<&'a mut Node, EditorError> {
    doc.nodes
        .get_mut(id)
        .ok_or_else(|| EditorError::not_found("node", id))
}

fn ensure_element(node: &Node) -> Result<(), EditorError> {
    if node.is_text() {
        return Err(EditorError::invalid_operation(format!(
            "{} is a text node",
            node.id
        )));
    }
    Ok(())
}

/// Elements that may receive children
fn ensure_container(node: &Node) -> Result<(), EditorError> {
    match node.tag() {
        None => Err(EditorError::invalid_operation(format!(
            "Text node {} cannot have children",
            node.id
        ))),
        Some(tag) if is_void_element(tag) => Err(EditorError::invalid_operation(format!(
            "<{}> cannot have children",
            tag
        ))),
        Some(_) => Ok(()),
    }
}

fn rename_node(doc: &mut Document, old_id: &str, new_id: &str) -> Result<(), EditorError> {
    let mut node = doc
        .nodes
        .swap_remove(old_id)
        .ok_or_else(|| EditorError::not_found("node", old_id))?;
    node.id = new_id.to_string();
    node.explicit_id = true;

    for child_id in &node.children {
        if let Some(child) = doc.nodes.get_mut(child_id) {
            child.parent = Some(new_id.to_string());
        }
    }
    if let Some(parent) = node.parent.as_deref().and_then(|p| doc.nodes.get_mut(p)) {
        for child_id in parent.children.iter_mut().filter(|c| *c == old_id) {
            *child_id = new_id.to_string();
        }
    }

    doc.rules.rename_node(old_id, new_id);
    doc.nodes.insert(new_id.to_string(), node);
    Ok(())
}

/// Ids usable as `#id` selectors: `[A-Za-z_][A-Za-z0-9_-]*`
pub fn is_valid_node_id(id: &str) -> bool {
    let mut chars = id.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn attribute_name(name: &str) -> Result<String, EditorError> {
    let name = name.trim().to_ascii_lowercase();
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '<' | '>' | '/' | '=' | '`'));

    if !valid {
        return Err(EditorError::invalid_value("attribute", name));
    }
    if name == "style" {
        return Err(EditorError::invalid_operation(
            "Inline styles are edited through style declarations",
        ));
    }
    Ok(name)
}

fn is_valid_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Bring a detached tree into the shape the parser would produce for its
/// serialized form: whitespace-only text dropped, text collapsed, names
/// lowercased, `id`/`style` attributes lifted out and declarations
/// validated. Fails if nothing is left to insert.
fn normalize_tree(tree: &ComponentTree) -> Result<Vec<NodeSpec>, EditorError> {
    let mut roots = Vec::new();
    for spec in &tree.roots {
        if let Some(spec) = normalize_spec(spec, false)? {
            roots.push(spec);
        }
    }

    if roots.is_empty() {
        return Err(ParseError::invalid_syntax(0, "Template contains no nodes").into());
    }
    Ok(roots)
}

fn normalize_spec(spec: &NodeSpec, raw_parent: bool) -> Result<Option<NodeSpec>, EditorError> {
    match spec {
        NodeSpec::Text { content } => {
            if raw_parent {
                return Ok((!content.trim().is_empty()).then(|| NodeSpec::Text {
                    content: content.clone(),
                }));
            }
            if content.trim_matches(|c: char| c.is_ascii_whitespace()).is_empty() {
                return Ok(None);
            }
            Ok(Some(NodeSpec::Text {
                content: collapse_whitespace(content),
            }))
        }

        NodeSpec::Element {
            tag,
            id,
            attributes,
            styles,
            children,
        } => {
            let tag = tag.trim().to_ascii_lowercase();
            if !is_valid_tag(&tag) {
                return Err(EditorError::invalid_value("tag", tag));
            }

            let mut id = id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string);
            let mut decls = Declarations::new();
            for (property, value) in styles {
                let (property, value) = normalize_declaration(property, value)?;
                if !value.is_empty() {
                    decls.insert(property, value);
                }
            }

            let mut attrs = IndexMap::new();
            for (name, value) in attributes {
                match name.trim().to_ascii_lowercase().as_str() {
                    "id" => {
                        let value = value.trim();
                        if id.is_none() && !value.is_empty() {
                            id = Some(value.to_string());
                        }
                    }
                    "style" => {
                        for (property, value) in parse_declarations(value)? {
                            decls.entry(property).or_insert(value);
                        }
                    }
                    other => {
                        let name = attribute_name(other)?;
                        attrs.entry(name).or_insert_with(|| value.clone());
                    }
                }
            }

            let raw = is_raw_text_element(&tag);
            let mut normalized_children = Vec::new();
            for child in children {
                if raw && !matches!(child, NodeSpec::Text { .. }) {
                    return Err(EditorError::invalid_operation(format!(
                        "<{}> may only contain text",
                        tag
                    )));
                }
                if let Some(child) = normalize_spec(child, raw)? {
                    normalized_children.push(child);
                }
            }
            if raw {
                let joined: String = normalized_children
                    .iter()
                    .filter_map(|child| match child {
                        NodeSpec::Text { content } => Some(content.as_str()),
                        NodeSpec::Element { .. } => None,
                    })
                    .collect();
                ensure_raw_text(&tag, &joined)?;
            }
            if is_void_element(&tag) && !normalized_children.is_empty() {
                return Err(EditorError::invalid_operation(format!(
                    "<{}> cannot have children",
                    tag
                )));
            }

            Ok(Some(NodeSpec::Element {
                tag,
                id,
                attributes: attrs,
                styles: decls,
                children: normalized_children,
            }))
        }
    }
}

/// Content of a `<script>` or `<style>` element is written verbatim, so it
/// must not contain that element's closing tag
fn ensure_raw_text(tag: &str, content: &str) -> Result<(), EditorError> {
    let closing = format!("</{}", tag);
    if content.to_ascii_lowercase().contains(&closing) {
        return Err(EditorError::invalid_value(tag, content));
    }
    Ok(())
}

/// Assigns ids while turning normalized specs into nodes.
///
/// Explicit ids are reserved up front so a generated id can never take an
/// explicit id that appears later in the same template. An explicit id that
/// is invalid, already in the document, or repeated in the template falls
/// back to a generated one.
struct NodeBuilder<'a> {
    existing: &'a IndexMap<String, Node>,
    ids: &'a mut IdGenerator,
    reserved: HashSet<String>,
    claimed: HashSet<String>,
}

impl<'a> NodeBuilder<'a> {
    fn new(
        existing: &'a IndexMap<String, Node>,
        ids: &'a mut IdGenerator,
        specs: &[NodeSpec],
    ) -> Self {
        let mut reserved = HashSet::new();
        let mut stack: Vec<&NodeSpec> = specs.iter().collect();
        while let Some(spec) = stack.pop() {
            if let NodeSpec::Element {
                id: Some(id),
                children,
                ..
            } = spec
            {
                if is_valid_node_id(id) && !existing.contains_key(id) {
                    reserved.insert(id.clone());
                } else {
                    warn!(id = %id, "Explicit id is invalid or taken; generating one");
                }
                stack.extend(children.iter());
            } else {
                stack.extend(spec.children().iter());
            }
        }

        Self {
            existing,
            ids,
            reserved,
            claimed: HashSet::new(),
        }
    }

    fn assign(&mut self, explicit: Option<String>) -> (String, bool) {
        if let Some(id) = explicit {
            if self.reserved.contains(&id) && self.claimed.insert(id.clone()) {
                return (id, true);
            }
        }

        let existing = self.existing;
        let reserved = &self.reserved;
        let id = self
            .ids
            .next_free(|id| existing.contains_key(id) || reserved.contains(id));
        (id, false)
    }

    fn build(&mut self, spec: NodeSpec, parent_id: &str, out: &mut Vec<Node>) -> String {
        match spec {
            NodeSpec::Text { content } => {
                let (id, _) = self.assign(None);
                let mut node = Node::text(id.clone(), content);
                node.parent = Some(parent_id.to_string());
                out.push(node);
                id
            }
            NodeSpec::Element {
                tag,
                id: explicit,
                attributes,
                styles,
                children,
            } => {
                let (id, explicit_id) = self.assign(explicit);
                let mut node = Node::element(id.clone(), tag);
                node.attributes = attributes;
                node.styles = styles;
                node.parent = Some(parent_id.to_string());
                node.explicit_id = explicit_id;
                node.children = children
                    .into_iter()
                    .map(|child| self.build(child, &id, out))
                    .collect();
                out.push(node);
                id
            }
        }
    }
}

//! # Document Model
//!
//! The live component tree of one editor session.
//!
//! Nodes live in a flat id → node registry, which is the single source of
//! truth. Child lists and parent back-references are the tree edges; the
//! parent reference is only used for traversal.
//!
//! The root is a `body` element with the fixed id [`ROOT_ID`]. Everything
//! that changes the tree or its styles goes through [`Document::apply`]
//! with a [`Mutation`]: the mutation is validated against the current state
//! first, so a failed call never leaves a partial change behind.

use crate::catalog::STARTER_MARKUP;
use crate::devices::{Device, DeviceManager};
use crate::mutations::{Mutation, MutationResult, Template};
use crate::observer::{DocumentChange, DocumentObserver, ObserverId, Observers};
use crate::serializer::{self, SerializedDocument};
use crate::styles::{class_list, StyleRules, StyleTarget};
use crate::EditorError;
use indexmap::IndexMap;
use pagecraft_parser::{Declarations, IdGenerator};
use std::collections::HashSet;
use tracing::debug;

/// Id of the root node
pub const ROOT_ID: &str = "wrapper";

/// Tag of the root node
pub const ROOT_TAG: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text { content: String },
}

/// One component in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub attributes: IndexMap<String, String>,
    /// Base (unscoped) declarations
    pub styles: Declarations,
    pub children: Vec<String>,
    pub parent: Option<String>,
    /// Id came from markup or a trait edit rather than the generator
    pub explicit_id: bool,
}

impl Node {
    pub(crate) fn element(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Element { tag: tag.into() },
            attributes: IndexMap::new(),
            styles: Declarations::new(),
            children: Vec::new(),
            parent: None,
            explicit_id: false,
        }
    }

    pub(crate) fn text(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Text {
                content: content.into(),
            },
            attributes: IndexMap::new(),
            styles: Declarations::new(),
            children: Vec::new(),
            parent: None,
            explicit_id: false,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag),
            NodeKind::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(|value| class_list(value))
            .into_iter()
            .flatten()
    }
}

/// One row of the layer tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub id: String,
    pub depth: usize,
    /// Tag name, or `#text`
    pub label: String,
    pub child_count: usize,
}

/// Editable page document
#[derive(Debug)]
pub struct Document {
    pub(crate) nodes: IndexMap<String, Node>,
    pub(crate) rules: StyleRules,
    pub(crate) devices: DeviceManager,
    pub(crate) ids: IdGenerator,
    pub(crate) version: u64,
    observers: Observers,
}

impl Document {
    /// Empty document: just the root
    pub fn new(devices: DeviceManager) -> Self {
        let mut nodes = IndexMap::new();
        let mut root = Node::element(ROOT_ID, ROOT_TAG);
        root.explicit_id = true;
        nodes.insert(ROOT_ID.to_string(), root);

        Self {
            nodes,
            rules: StyleRules::default(),
            devices,
            ids: IdGenerator::default(),
            version: 0,
            observers: Observers::default(),
        }
    }

    /// Built-in starter page: navbar, hero and footer under the root
    pub fn starter(devices: DeviceManager) -> Result<Self, EditorError> {
        let mut doc = Self::new(devices);
        doc.insert(ROOT_ID, 0, STARTER_MARKUP)?;
        doc.version = 0;
        Ok(doc)
    }

    // ---------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------

    pub fn root_id(&self) -> &str {
        ROOT_ID
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Like [`Document::get`], failing with `NotFound`
    pub fn node(&self, id: &str) -> Result<&Node, EditorError> {
        self.nodes
            .get(id)
            .ok_or_else(|| EditorError::not_found("node", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: &str) -> Result<&[String], EditorError> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.nodes.get(id)?.parent.as_deref()
    }

    /// Ids of the subtree rooted at `id`, depth-first pre-order
    pub fn subtree(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                out.push(current.to_string());
                stack.extend(node.children.iter().rev().map(String::as_str));
            }
        }

        out
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: &str, id: &str) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.parent(node_id);
        }
        false
    }

    /// Current version; increments on every successful mutation
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn devices(&self) -> &DeviceManager {
        &self.devices
    }

    pub fn active_device(&self) -> &Device {
        self.devices.active()
    }

    pub fn rules(&self) -> &StyleRules {
        &self.rules
    }

    // ---------------------------------------------------------------
    // Observers
    // ---------------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl DocumentObserver + 'static) -> ObserverId {
        self.observers.add(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id)
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Validate and apply a mutation, then notify observers
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        mutation.validate(self)?;
        let change = mutation.apply(self)?;

        self.version += 1;
        debug!(version = self.version, ?change, "Applied mutation");
        self.observers.notify(&change);

        Ok(MutationResult {
            version: self.version,
            change,
        })
    }

    /// Insert a node, tree or markup fragment under `parent_id` at `index`.
    ///
    /// Returns the id of the first inserted top-level node. Markup is parsed
    /// before anything is touched, so a parse failure leaves the document
    /// unchanged.
    pub fn insert(
        &mut self,
        parent_id: &str,
        index: usize,
        template: impl Into<Template>,
    ) -> Result<String, EditorError> {
        let tree = template.into().into_tree()?;
        let result = self.apply(Mutation::InsertNodes {
            parent_id: parent_id.to_string(),
            index,
            tree,
        })?;

        match result.change {
            DocumentChange::Inserted { mut node_ids, .. } if !node_ids.is_empty() => {
                Ok(node_ids.swap_remove(0))
            }
            other => Err(EditorError::invalid_operation(format!(
                "Insert produced unexpected change {:?}",
                other
            ))),
        }
    }

    pub fn remove(&mut self, node_id: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveNode {
            node_id: node_id.to_string(),
        })
        .map(drop)
    }

    /// `index` is a position in the new parent's children after `node_id`
    /// has been detached
    pub fn move_node(
        &mut self,
        node_id: &str,
        new_parent_id: &str,
        index: usize,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::MoveNode {
            node_id: node_id.to_string(),
            new_parent_id: new_parent_id.to_string(),
            index,
        })
        .map(drop)
    }

    /// Write a declaration for a node. `device` of `None` (or an
    /// unconstrained device) targets the base styles. An empty value
    /// removes the declaration.
    pub fn set_style(
        &mut self,
        node_id: &str,
        device: Option<&str>,
        property: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::SetStyle {
            target: StyleTarget::Node(node_id.to_string()),
            device_id: device.map(str::to_string),
            property: property.to_string(),
            value: value.to_string(),
        })
        .map(drop)
    }

    /// Write a declaration for every element carrying `class`
    pub fn set_class_style(
        &mut self,
        class: &str,
        device: Option<&str>,
        property: &str,
        value: &str,
    ) -> Result<(), EditorError> {
        self.apply(Mutation::SetStyle {
            target: StyleTarget::Class(class.to_string()),
            device_id: device.map(str::to_string),
            property: property.to_string(),
            value: value.to_string(),
        })
        .map(drop)
    }

    /// Set an attribute. Setting `id` renames the node.
    pub fn set_attribute(&mut self, node_id: &str, name: &str, value: &str) -> Result<(), EditorError> {
        self.apply(Mutation::SetAttribute {
            node_id: node_id.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        })
        .map(drop)
    }

    pub fn remove_attribute(&mut self, node_id: &str, name: &str) -> Result<(), EditorError> {
        self.apply(Mutation::RemoveAttribute {
            node_id: node_id.to_string(),
            name: name.to_string(),
        })
        .map(drop)
    }

    pub fn update_text(&mut self, node_id: &str, content: &str) -> Result<(), EditorError> {
        self.apply(Mutation::UpdateText {
            node_id: node_id.to_string(),
            content: content.to_string(),
        })
        .map(drop)
    }

    /// Switch the active device. Returns whether it changed; observers are
    /// only notified on change. This is not a structural mutation and does
    /// not bump the version.
    pub fn switch_device(&mut self, device_id: &str) -> Result<bool, EditorError> {
        let changed = self.devices.switch_to(device_id)?;
        if changed {
            debug!(device = device_id, "Switched device");
            self.observers.notify(&DocumentChange::DeviceSwitched {
                device_id: device_id.to_string(),
            });
        }
        Ok(changed)
    }

    /// Resolve a style write's device: `None` for base styles, or the id of
    /// a constrained device
    pub(crate) fn style_scope(&self, device: Option<&str>) -> Result<Option<String>, EditorError> {
        match device {
            None => Ok(None),
            Some(id) => {
                let device = self
                    .devices
                    .get(id)
                    .ok_or_else(|| EditorError::not_found("device", id))?;
                Ok(device.is_constrained().then(|| device.id.clone()))
            }
        }
    }

    // ---------------------------------------------------------------
    // Derived views
    // ---------------------------------------------------------------

    /// Declarations in effect for a node under the active device.
    ///
    /// Cascade: class base rules, the node's base styles, then for each
    /// applicable constrained device in registration order its class rules
    /// and its node rules. Later writes win.
    pub fn computed_style(&self, node_id: &str) -> Result<Declarations, EditorError> {
        let node = self.node(node_id)?;
        let classes: Vec<&str> = node.classes().collect();
        let mut computed = Declarations::new();

        for class in &classes {
            if let Some(decls) = self.rules.class_rule(class, None) {
                extend(&mut computed, decls);
            }
        }
        extend(&mut computed, &node.styles);

        for device in self.devices.constrained() {
            if !self.devices.applies(&device.id) {
                continue;
            }
            for class in &classes {
                if let Some(decls) = self.rules.class_rule(class, Some(&device.id)) {
                    extend(&mut computed, decls);
                }
            }
            if let Some(decls) = self.rules.node_rule(node_id, &device.id) {
                extend(&mut computed, decls);
            }
        }

        Ok(computed)
    }

    /// Layer tree below the root, depth-first
    pub fn outline(&self) -> Vec<OutlineEntry> {
        let mut entries = Vec::new();
        let mut stack: Vec<(&str, usize)> = self
            .nodes
            .get(ROOT_ID)
            .map(|root| root.children.iter().rev().map(|c| (c.as_str(), 0)).collect())
            .unwrap_or_default();

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            entries.push(OutlineEntry {
                id: node.id.clone(),
                depth,
                label: node.tag().unwrap_or("#text").to_string(),
                child_count: node.children.len(),
            });
            stack.extend(node.children.iter().rev().map(|c| (c.as_str(), depth + 1)));
        }

        entries
    }

    /// Check the tree invariants: one root, every node reachable exactly
    /// once, parent references consistent, text nodes childless
    pub fn validate_tree(&self) -> Result<(), EditorError> {
        let root = self
            .nodes
            .get(ROOT_ID)
            .ok_or_else(|| EditorError::CorruptState("Root node is missing".to_string()))?;
        if root.parent.is_some() {
            return Err(EditorError::CorruptState("Root node has a parent".to_string()));
        }

        let mut seen = HashSet::new();
        seen.insert(ROOT_ID);
        let mut stack = vec![root];

        while let Some(node) = stack.pop() {
            if node.is_text() && !node.children.is_empty() {
                return Err(EditorError::CorruptState(format!(
                    "Text node {} has children",
                    node.id
                )));
            }

            for child_id in &node.children {
                let child = self.nodes.get(child_id).ok_or_else(|| {
                    EditorError::CorruptState(format!("Dangling child id {}", child_id))
                })?;
                if child.parent.as_deref() != Some(node.id.as_str()) {
                    return Err(EditorError::CorruptState(format!(
                        "Node {} has a stale parent reference",
                        child_id
                    )));
                }
                if !seen.insert(child_id.as_str()) {
                    return Err(EditorError::CorruptState(format!(
                        "Node {} is reachable twice",
                        child_id
                    )));
                }
                stack.push(child);
            }
        }

        if seen.len() != self.nodes.len() {
            return Err(EditorError::CorruptState(format!(
                "{} nodes are detached from the root",
                self.nodes.len() - seen.len()
            )));
        }

        Ok(())
    }

    /// Compact markup of the root's children plus the stylesheet
    pub fn serialize_markup(&self) -> SerializedDocument {
        serializer::serialize(self)
    }
}

fn extend(target: &mut Declarations, source: &Declarations) {
    for (property, value) in source {
        target.insert(property.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_parser::NodeSpec;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn doc() -> Document {
        Document::new(DeviceManager::default())
    }

    #[test]
    fn test_new_document_has_root_only() {
        let doc = doc();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.root_id(), "wrapper");
        assert_eq!(doc.node(ROOT_ID).unwrap().tag(), Some("body"));
        assert_eq!(doc.version(), 0);
        doc.validate_tree().unwrap();
    }

    #[test]
    fn test_starter_document() {
        let doc = Document::starter(DeviceManager::default()).unwrap();
        let tags: Vec<_> = doc
            .children(ROOT_ID)
            .unwrap()
            .iter()
            .filter_map(|id| doc.node(id).unwrap().tag())
            .collect();

        assert_eq!(tags, vec!["nav", "section", "footer"]);
        assert!(doc.contains("home"));
        assert_eq!(doc.version(), 0);
        doc.validate_tree().unwrap();
    }

    #[test]
    fn test_insert_returns_first_id() {
        let mut doc = doc();
        let first = doc.insert(ROOT_ID, 0, "<header></header><main></main>").unwrap();

        assert_eq!(doc.node(&first).unwrap().tag(), Some("header"));
        assert_eq!(doc.children(ROOT_ID).unwrap().len(), 2);
        assert_eq!(doc.version(), 1);
    }

    #[test]
    fn test_insert_node_spec() {
        let mut doc = doc();
        let id = doc
            .insert(
                ROOT_ID,
                0,
                NodeSpec::element("p").with_child(NodeSpec::text("Hello")),
            )
            .unwrap();

        let text_id = &doc.children(&id).unwrap()[0];
        assert_eq!(doc.node(text_id).unwrap().text_content(), Some("Hello"));
        assert_eq!(doc.parent(text_id), Some(id.as_str()));
    }

    #[test]
    fn test_cascade_base_then_mobile() {
        let mut doc = doc();
        let id = doc.insert(ROOT_ID, 0, "<p>Hi</p>").unwrap();

        doc.set_style(&id, None, "color", "black").unwrap();
        doc.set_style(&id, Some("mobile"), "color", "red").unwrap();

        assert_eq!(doc.computed_style(&id).unwrap()["color"], "black");
        doc.switch_device("mobile").unwrap();
        assert_eq!(doc.computed_style(&id).unwrap()["color"], "red");
        doc.switch_device("desktop").unwrap();
        assert_eq!(doc.computed_style(&id).unwrap()["color"], "black");
    }

    #[test]
    fn test_cascade_overlapping_devices() {
        let mut doc = doc();
        let id = doc.insert(ROOT_ID, 0, "<p>Hi</p>").unwrap();

        doc.set_style(&id, Some("tablet"), "color", "green").unwrap();
        doc.set_style(&id, Some("mobile"), "color", "red").unwrap();

        doc.switch_device("tablet").unwrap();
        assert_eq!(doc.computed_style(&id).unwrap()["color"], "green");
        doc.switch_device("mobile").unwrap();
        assert_eq!(doc.computed_style(&id).unwrap()["color"], "red");
    }

    #[test]
    fn test_class_rules_lose_to_node_rules() {
        let mut doc = doc();
        let id = doc
            .insert(ROOT_ID, 0, r#"<div class="card" style="color:blue"></div>"#)
            .unwrap();

        doc.set_class_style("card", None, "color", "gray").unwrap();
        doc.set_class_style("card", None, "padding", "8px").unwrap();

        let computed = doc.computed_style(&id).unwrap();
        assert_eq!(computed["color"], "blue");
        assert_eq!(computed["padding"], "8px");
    }

    #[test]
    fn test_unconstrained_device_writes_base() {
        let mut doc = doc();
        let id = doc.insert(ROOT_ID, 0, "<p></p>").unwrap();

        doc.set_style(&id, Some("desktop"), "margin", "0").unwrap();
        assert_eq!(doc.node(&id).unwrap().styles["margin"], "0");
        assert!(doc.rules().scoped.is_empty());
    }

    #[test]
    fn test_device_switch_notifies_only_on_change() {
        let mut doc = doc();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        doc.subscribe(move |change: &DocumentChange| sink.borrow_mut().push(change.clone()));

        assert!(doc.switch_device("tablet").unwrap());
        assert!(!doc.switch_device("tablet").unwrap());

        assert_eq!(
            *seen.borrow(),
            vec![DocumentChange::DeviceSwitched {
                device_id: "tablet".to_string()
            }]
        );
        assert_eq!(doc.version(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let mut doc = doc();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let id = doc.subscribe(move |_: &DocumentChange| *sink.borrow_mut() += 1);

        doc.insert(ROOT_ID, 0, "<p></p>").unwrap();
        assert!(doc.unsubscribe(id));
        doc.insert(ROOT_ID, 0, "<p></p>").unwrap();

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_outline() {
        let mut doc = doc();
        doc.insert(ROOT_ID, 0, "<nav><a>Home</a></nav><footer></footer>").unwrap();

        let outline: Vec<_> = doc
            .outline()
            .into_iter()
            .map(|e| (e.label, e.depth))
            .collect();
        assert_eq!(
            outline,
            vec![
                ("nav".to_string(), 0),
                ("a".to_string(), 1),
                ("#text".to_string(), 2),
                ("footer".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_validate_tree_detects_stale_parent() {
        let mut doc = doc();
        let id = doc.insert(ROOT_ID, 0, "<p></p>").unwrap();
        if let Some(node) = doc.nodes.get_mut(&id) {
            node.parent = Some("elsewhere".to_string());
        }
        assert!(matches!(doc.validate_tree(), Err(EditorError::CorruptState(_))));
    }
}

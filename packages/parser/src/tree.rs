//! Parsed component trees
//!
//! A [`ComponentTree`] is the detached form of a document subtree: what the
//! parser produces and what blocks store. It carries no document ids except
//! explicit `id` attributes; ids are assigned when the tree is inserted into
//! a live document.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One node of a detached component tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeSpec {
    /// Element node
    Element {
        tag: String,
        /// Explicit id taken from the `id` attribute
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attributes: IndexMap<String, String>,
        /// Base style declarations (from the `style` attribute)
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        styles: IndexMap<String, String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<NodeSpec>,
    },

    /// Text node
    Text { content: String },
}

impl NodeSpec {
    pub fn element(tag: impl Into<String>) -> Self {
        NodeSpec::Element {
            tag: tag.into().to_ascii_lowercase(),
            id: None,
            attributes: IndexMap::new(),
            styles: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Text node with whitespace collapsed the way the parser collapses it
    pub fn text(content: impl AsRef<str>) -> Self {
        NodeSpec::Text {
            content: crate::text::collapse_whitespace(content.as_ref()),
        }
    }

    pub fn with_id(mut self, new_id: impl Into<String>) -> Self {
        if let NodeSpec::Element { ref mut id, .. } = self {
            *id = Some(new_id.into());
        }
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeSpec::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let NodeSpec::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: NodeSpec) -> Self {
        if let NodeSpec::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<NodeSpec>) -> Self {
        if let NodeSpec::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            NodeSpec::Element { tag, .. } => Some(tag),
            NodeSpec::Text { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeSpec] {
        match self {
            NodeSpec::Element { children, .. } => children,
            NodeSpec::Text { .. } => &[],
        }
    }

    /// Number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(NodeSpec::node_count).sum::<usize>()
    }

    /// Depth-first search for the first element with the given tag
    pub fn find_tag(&self, name: &str) -> Option<&NodeSpec> {
        if self.tag() == Some(name) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find_tag(name))
    }
}

/// Ordered list of top-level nodes produced from one markup fragment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentTree {
    pub roots: Vec<NodeSpec>,
}

impl ComponentTree {
    pub fn new(roots: Vec<NodeSpec>) -> Self {
        Self { roots }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes across all roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(NodeSpec::node_count).sum()
    }

    pub fn find_tag(&self, name: &str) -> Option<&NodeSpec> {
        self.roots.iter().find_map(|root| root.find_tag(name))
    }
}

impl From<NodeSpec> for ComponentTree {
    fn from(node: NodeSpec) -> Self {
        Self { roots: vec![node] }
    }
}

/// Elements that never have children or a closing tag
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "img"
            | "input"
            | "br"
            | "hr"
            | "meta"
            | "link"
            | "area"
            | "base"
            | "col"
            | "embed"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is raw text, not markup
pub fn is_raw_text_element(tag: &str) -> bool {
    matches!(tag, "style" | "script")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_counts() {
        let tree = ComponentTree::from(
            NodeSpec::element("SECTION")
                .with_id("about")
                .with_style("padding", "80px 20px")
                .with_child(NodeSpec::element("h2").with_child(NodeSpec::text("About  Us")))
                .with_child(NodeSpec::element("p")),
        );

        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.roots[0].tag(), Some("section"));
        assert_eq!(
            tree.find_tag("h2").map(|h2| h2.children().to_vec()),
            Some(vec![NodeSpec::Text {
                content: "About Us".to_string()
            }])
        );
    }

    #[test]
    fn test_json_shape() {
        let node = NodeSpec::element("a").with_attr("href", "#home");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "element");
        assert_eq!(json["attributes"]["href"], "#home");
        assert!(json.get("styles").is_none());
    }

    #[test]
    fn test_void_elements() {
        assert!(is_void_element("img"));
        assert!(is_void_element("br"));
        assert!(!is_void_element("div"));
        assert!(is_raw_text_element("style"));
    }
}

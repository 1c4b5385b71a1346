//! # Block Registry
//!
//! Catalog of insertable content fragments. Block content is either raw
//! markup, parsed on every instantiation, or a component tree.
//! Instantiation is atomic: markup that fails to parse never reaches the
//! document.

use crate::document::Document;
use crate::mutations::Template;
use crate::EditorError;
use indexmap::IndexMap;
use pagecraft_parser::ComponentTree;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum BlockContent {
    Markup(String),
    Tree(ComponentTree),
}

impl From<BlockContent> for Template {
    fn from(content: BlockContent) -> Self {
        match content {
            BlockContent::Markup(markup) => Template::Markup(markup),
            BlockContent::Tree(tree) => Template::Tree(tree),
        }
    }
}

/// A reusable content fragment offered for insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub label: String,
    pub category: String,
    pub content: BlockContent,
}

impl Block {
    pub fn markup(
        id: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: category.into(),
            content: BlockContent::Markup(markup.into()),
        }
    }

    pub fn tree(
        id: impl Into<String>,
        label: impl Into<String>,
        category: impl Into<String>,
        tree: ComponentTree,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            category: category.into(),
            content: BlockContent::Tree(tree),
        }
    }
}

/// What to do when a block id is already registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterPolicy {
    /// Fail with `DuplicateId`
    #[default]
    Reject,
    /// Replace the existing block, keeping its catalog position
    Overwrite,
}

#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: IndexMap<String, Block>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Result<Self, EditorError> {
        let mut registry = Self::new();
        for block in blocks {
            registry.register(block)?;
        }
        info!(blocks = registry.len(), "Block catalog loaded");
        Ok(registry)
    }

    /// Register a block; duplicates are rejected
    pub fn register(&mut self, block: Block) -> Result<(), EditorError> {
        self.register_with(block, RegisterPolicy::Reject)
    }

    pub fn register_with(&mut self, block: Block, policy: RegisterPolicy) -> Result<(), EditorError> {
        if self.blocks.contains_key(&block.id) && policy == RegisterPolicy::Reject {
            return Err(EditorError::duplicate("block", block.id));
        }
        debug!(block = %block.id, category = %block.category, "Registering block");
        self.blocks.insert(block.id.clone(), block);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Blocks in registration order
    pub fn list(&self) -> impl Iterator<Item = &Block> {
        self.blocks.values()
    }

    /// Blocks grouped by category, categories in first-seen order
    pub fn categories(&self) -> IndexMap<&str, Vec<&Block>> {
        let mut groups: IndexMap<&str, Vec<&Block>> = IndexMap::new();
        for block in self.blocks.values() {
            groups.entry(block.category.as_str()).or_default().push(block);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Insert a copy of a block under `parent_id` at `index`, returning the
    /// id of the first inserted node
    pub fn instantiate(
        &self,
        block_id: &str,
        doc: &mut Document,
        parent_id: &str,
        index: usize,
    ) -> Result<String, EditorError> {
        let block = self
            .get(block_id)
            .ok_or_else(|| EditorError::not_found("block", block_id))?;

        let node_id = doc.insert(parent_id, index, block.content.clone())?;
        debug!(block = block_id, node = %node_id, "Instantiated block");
        Ok(node_id)
    }
}
